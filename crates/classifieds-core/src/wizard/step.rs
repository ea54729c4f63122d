//! Wizard steps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Editing steps of the listing wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Pick a top-level category group.
    CategoryGroup,
    /// Pick a subcategory of the chosen group.
    Category,
    /// Title, description and item attributes.
    Details,
    /// Photo selection.
    Photos,
    /// Price and location, then post.
    PriceLocation,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [WizardStep; 5] = [
        WizardStep::CategoryGroup,
        WizardStep::Category,
        WizardStep::Details,
        WizardStep::Photos,
        WizardStep::PriceLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::CategoryGroup => "category_group",
            WizardStep::Category => "category",
            WizardStep::Details => "details",
            WizardStep::Photos => "photos",
            WizardStep::PriceLocation => "price_location",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::CategoryGroup => 1,
            WizardStep::Category => 2,
            WizardStep::Details => 3,
            WizardStep::Photos => 4,
            WizardStep::PriceLocation => 5,
        }
    }

    /// The step after this one, if any.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CategoryGroup => Some(WizardStep::Category),
            WizardStep::Category => Some(WizardStep::Details),
            WizardStep::Details => Some(WizardStep::Photos),
            WizardStep::Photos => Some(WizardStep::PriceLocation),
            WizardStep::PriceLocation => None,
        }
    }

    /// The step before this one, if any.
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CategoryGroup => None,
            WizardStep::Category => Some(WizardStep::CategoryGroup),
            WizardStep::Details => Some(WizardStep::Category),
            WizardStep::Photos => Some(WizardStep::Details),
            WizardStep::PriceLocation => Some(WizardStep::Photos),
        }
    }

    /// Fixed heading for the step. The category step is headed by the
    /// chosen group's name instead.
    pub fn heading(&self) -> &'static str {
        match self {
            WizardStep::CategoryGroup => "Choose a category",
            WizardStep::Category => "Choose a subcategory",
            WizardStep::Details => "Include some details",
            WizardStep::Photos => "Upload Photos",
            WizardStep::PriceLocation => "Set your price",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        for pair in WizardStep::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
            assert_eq!(pair[0].number() + 1, pair[1].number());
        }
        assert_eq!(WizardStep::CategoryGroup.previous(), None);
        assert_eq!(WizardStep::PriceLocation.next(), None);
    }
}
