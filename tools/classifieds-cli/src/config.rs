//! CLI configuration.

use anyhow::{Context, Result};
use classifieds_core::WizardConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Local backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Listing wizard limits.
    #[serde(default)]
    pub wizard: WizardConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Where the local backend keeps its data and who is signed in by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Directory holding `tables.json` and uploaded objects.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL for public object links. Without it, links are `file://`
    /// paths into `data_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    /// User id to act as when `--as` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,
}

fn default_data_dir() -> String {
    ".classifieds".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            public_base_url: None,
            default_user: None,
        }
    }
}

/// Generate a default classifieds.toml config file.
pub fn generate_default_config(user: &str) -> String {
    format!(
        r#"# Classifieds CLI configuration

[backend]
data_dir = ".classifieds"
# public_base_url = "http://localhost:54321"
default_user = "{user}"

[wizard]
max_images = 20
require_details = true
upload_concurrency = 4
image_bucket = "listing-images"
currency = "CAD"
"#,
        user = user
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("alice")).unwrap();
        assert_eq!(config.backend.data_dir, ".classifieds");
        assert_eq!(config.backend.default_user.as_deref(), Some("alice"));
        assert!(config.wizard.require_details);
        assert_eq!(config.wizard.title_max_chars, 70);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.data_dir, ".classifieds");
        assert!(config.backend.default_user.is_none());
        assert_eq!(config.wizard.max_images, 20);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("classifieds-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("classifieds.toml");
        std::fs::write(
            &path,
            "[backend]\ndefault_user = \"bob\"\n\n[wizard]\nupload_concurrency = 2\n",
        )
        .unwrap();

        let loaded = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.backend.default_user.as_deref(), Some("bob"));
        assert_eq!(loaded.wizard.upload_concurrency, 2);
        assert!(CliConfig::load(dir.join("missing.toml").to_str().unwrap()).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
