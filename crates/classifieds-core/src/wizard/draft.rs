//! In-progress listing state owned by one wizard.

use crate::catalog::{Category, CategoryGroup};
use crate::config::WizardConfig;
use crate::money::Money;
use crate::wizard::WizardError;
use std::fmt;

/// A photo picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name.
    pub name: String,
    /// File bytes.
    pub content: Vec<u8>,
    /// MIME type, when known.
    pub content_type: Option<String>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
            content_type: None,
        }
    }

    /// Set the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Guess the MIME type from the file extension.
    pub fn guess_content_type(name: &str) -> Option<&'static str> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "heic" => Some("image/heic"),
            _ => None,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("bytes", &self.content.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Everything the seller has entered so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftListing {
    pub group: Option<&'static CategoryGroup>,
    pub category: Option<&'static Category>,
    pub title: String,
    pub description: String,
    /// Price as typed.
    pub price: String,
    pub location: String,
    pub condition: String,
    pub brand: String,
    pub model: String,
    /// Year as typed.
    pub year: String,
    /// Selected photos, in upload order.
    pub images: Vec<ImageFile>,
}

/// Draft values that needed parsing, checked and ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub price: Money,
    pub year: Option<i32>,
}

impl DraftListing {
    /// Details fields still empty after trimming, by label.
    pub fn missing_details(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("brand", &self.brand),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Check everything a submit needs and parse the typed numbers.
    pub fn validate(&self, config: &WizardConfig) -> Result<ValidatedFields, WizardError> {
        if self.category.is_none() {
            return Err(WizardError::ValidationFailure("category is required".into()));
        }
        if config.require_details {
            let missing = self.missing_details();
            if !missing.is_empty() {
                return Err(WizardError::ValidationFailure(format!(
                    "missing {}",
                    missing.join(", ")
                )));
            }
        }
        let price = Money::parse(&self.price, config.currency)
            .map_err(|e| WizardError::ValidationFailure(e.to_string()))?;
        if self.location.trim().is_empty() {
            return Err(WizardError::ValidationFailure("location is required".into()));
        }
        let year = match self.year.trim() {
            "" => None,
            text => Some(text.parse::<i32>().map_err(|_| {
                WizardError::ValidationFailure(format!("year must be a whole number, got {:?}", text))
            })?),
        };
        Ok(ValidatedFields { price, year })
    }
}

/// Keep at most `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// `Some(trimmed)` for non-blank text.
pub(crate) fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_category;
    use crate::money::PriceError;

    fn complete_draft() -> DraftListing {
        let (group, category) = find_category("mobile-phones").unwrap();
        DraftListing {
            group: Some(group),
            category: Some(category),
            title: "iPhone 13".into(),
            description: "Barely used".into(),
            brand: "Apple".into(),
            price: "600".into(),
            location: "Toronto, ON".into(),
            ..DraftListing::default()
        }
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 70), "hi");
        assert_eq!(truncate_chars("\u{e9}t\u{e9}s", 2), "\u{e9}t");
        let emoji = "\u{1f4f1}".repeat(71);
        assert_eq!(truncate_chars(&emoji, 70).chars().count(), 70);
    }

    #[test]
    fn test_missing_details() {
        let mut draft = complete_draft();
        assert!(draft.missing_details().is_empty());
        draft.title = "   ".into();
        draft.brand.clear();
        assert_eq!(draft.missing_details(), vec!["title", "brand"]);
    }

    #[test]
    fn test_validate() {
        let config = WizardConfig::default();
        let fields = complete_draft().validate(&config).unwrap();
        assert_eq!(fields.price.to_decimal(), 600.0);
        assert_eq!(fields.year, None);

        let mut draft = complete_draft();
        draft.year = " 2021 ".into();
        assert_eq!(draft.validate(&config).unwrap().year, Some(2021));

        draft.year = "twenty".into();
        assert!(matches!(
            draft.validate(&config),
            Err(WizardError::ValidationFailure(_))
        ));

        let mut draft = complete_draft();
        draft.price = "free".into();
        assert_eq!(
            draft.validate(&config),
            Err(WizardError::ValidationFailure(PriceError::NotANumber.to_string()))
        );

        let mut draft = complete_draft();
        draft.location = " ".into();
        assert!(draft.validate(&config).is_err());
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(ImageFile::guess_content_type("a.JPG"), Some("image/jpeg"));
        assert_eq!(ImageFile::guess_content_type("noext"), None);
    }
}
