//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use classifieds_core::identity::{Identity, Session};

use crate::config::CliConfig;
use crate::output::Output;
use crate::store::LocalBackend;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// User to act as, from `--as` or the config.
    pub user: Option<String>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, user: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        let user = user.or_else(|| config.backend.default_user.clone());
        Ok(Self {
            config,
            output,
            cwd,
            user,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let config_names = ["classifieds.toml", ".classifieds.toml", "classifieds.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Open the local backend.
    pub async fn backend(&self) -> Result<Arc<LocalBackend>> {
        let root = self.resolve_path(&self.config.backend.data_dir);
        self.output.debug(&format!("Data directory: {}", root.display()));
        let backend =
            LocalBackend::open(root, self.config.backend.public_base_url.as_deref()).await?;
        Ok(Arc::new(backend))
    }

    /// Session for the configured user, or an anonymous one.
    pub fn session(&self) -> Arc<Session> {
        match &self.user {
            Some(user) => {
                self.output.debug(&format!("Acting as {}", user));
                Arc::new(Session::signed_in(Identity::new(
                    user.as_str(),
                    format!("{}@localhost", user),
                )))
            }
            None => Arc::new(Session::anonymous()),
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
