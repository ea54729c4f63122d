//! Wizard configuration.

use crate::money::Currency;
use crate::tables;
use serde::{Deserialize, Serialize};

/// Limits and backend names used by the listing wizard.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```toml
/// [wizard]
/// require_details = false
/// upload_concurrency = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WizardConfig {
    /// Largest image batch accepted at selection time.
    pub max_images: usize,
    /// Title input is truncated to this many characters.
    pub title_max_chars: usize,
    /// Description input is truncated to this many characters.
    pub description_max_chars: usize,
    /// Block the details step until title, description and brand are set.
    pub require_details: bool,
    /// Uploads in flight at once during submit.
    pub upload_concurrency: usize,
    /// Object storage bucket for listing photos.
    pub image_bucket: String,
    /// Table new listings are inserted into.
    pub listings_table: String,
    /// Currency prices are entered in.
    pub currency: Currency,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_images: 20,
            title_max_chars: 70,
            description_max_chars: 4096,
            require_details: true,
            upload_concurrency: 4,
            image_bucket: "listing-images".to_string(),
            listings_table: tables::LISTINGS.to_string(),
            currency: Currency::CAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: WizardConfig =
            serde_json::from_str(r#"{ "require_details": false, "upload_concurrency": 2 }"#).unwrap();
        assert!(!config.require_details);
        assert_eq!(config.upload_concurrency, 2);
        assert_eq!(config.max_images, 20);
        assert_eq!(config.image_bucket, "listing-images");
    }
}
