//! Listing wizard state machine.

use crate::catalog::{self, Category, CategoryGroup};
use crate::config::WizardConfig;
use crate::identity::IdentityProvider;
use crate::ids::ListingId;
use crate::listing::Listing;
use crate::wizard::draft::{truncate_chars, DraftListing, ImageFile};
use crate::wizard::error::{ErrorKind, Navigation};
use crate::wizard::{submit, WizardError, WizardStep};
use classifieds_store::Backend;
use std::sync::Arc;

/// Progress of the submission that runs beside the editing steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// Nothing posted yet.
    #[default]
    Idle,
    /// Uploads or the insert are running.
    Submitting,
    /// The last attempt failed; the draft is intact.
    Failed(ErrorKind),
    /// Posted. No further transitions are accepted.
    Done(ListingId),
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// The listing as stored.
    pub listing: Listing,
    /// Where to go next.
    pub navigation: Navigation,
}

/// Marks a submission as in flight until it settles.
///
/// If the submit future is dropped first, the state falls back to `Idle`
/// so the seller can post again.
struct InFlight<'a>(&'a mut SubmitState);

impl<'a> InFlight<'a> {
    fn start(state: &'a mut SubmitState) -> Self {
        *state = SubmitState::Submitting;
        Self(state)
    }

    fn settle(self, outcome: SubmitState) {
        *self.0 = outcome;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.0 == SubmitState::Submitting {
            tracing::warn!("submit dropped before it finished");
            *self.0 = SubmitState::Idle;
        }
    }
}

/// Guided five-step listing creation.
///
/// Every editing transition is synchronous and local. Only [`submit`]
/// touches the backend.
///
/// [`submit`]: ListingWizard::submit
pub struct ListingWizard {
    step: WizardStep,
    draft: DraftListing,
    submission: SubmitState,
    exited: bool,
    config: WizardConfig,
    backend: Arc<dyn Backend>,
    identity: Arc<dyn IdentityProvider>,
}

impl ListingWizard {
    /// Start a wizard with the default configuration.
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::with_config(backend, identity, WizardConfig::default())
    }

    /// Start a wizard with a custom configuration.
    pub fn with_config(
        backend: Arc<dyn Backend>,
        identity: Arc<dyn IdentityProvider>,
        config: WizardConfig,
    ) -> Self {
        Self {
            step: WizardStep::CategoryGroup,
            draft: DraftListing::default(),
            submission: SubmitState::Idle,
            exited: false,
            config,
            backend,
            identity,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &DraftListing {
        &self.draft
    }

    pub fn submission(&self) -> &SubmitState {
        &self.submission
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Check if the wizard still accepts input.
    pub fn is_open(&self) -> bool {
        !self.exited && !matches!(self.submission, SubmitState::Done(_))
    }

    /// Heading for the current step.
    pub fn heading(&self) -> &'static str {
        match (self.step, self.draft.group) {
            (WizardStep::Category, Some(group)) => group.name,
            (step, _) => step.heading(),
        }
    }

    /// Groups offered at the first step.
    pub fn available_groups(&self) -> &'static [CategoryGroup] {
        catalog::groups()
    }

    /// Subcategories of the chosen group.
    pub fn available_categories(&self) -> &'static [Category] {
        self.draft.group.map(|g| g.categories).unwrap_or(&[])
    }

    /// Pick a category group by name or slug and move to step 2.
    pub fn select_group(&mut self, key: &str) -> Result<&'static CategoryGroup, WizardError> {
        self.expect_step(WizardStep::CategoryGroup, "choose a category group")?;
        let group = catalog::find_group(key).ok_or_else(|| {
            tracing::debug!(key, "unknown category group");
            WizardError::UnknownCategory(key.to_string())
        })?;
        self.draft.group = Some(group);
        self.draft.category = None;
        self.move_to(WizardStep::Category);
        Ok(group)
    }

    /// Pick a subcategory of the chosen group and move to step 3.
    pub fn select_category(&mut self, key: &str) -> Result<&'static Category, WizardError> {
        self.expect_step(WizardStep::Category, "choose a subcategory")?;
        let category = self
            .draft
            .group
            .and_then(|g| g.find(key))
            .ok_or_else(|| WizardError::UnknownCategory(key.to_string()))?;
        self.draft.category = Some(category);
        self.move_to(WizardStep::Details);
        Ok(category)
    }

    /// Set the title, keeping at most `title_max_chars` characters.
    pub fn set_title(&mut self, title: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the title")?;
        self.draft.title = truncate_chars(title, self.config.title_max_chars);
        Ok(())
    }

    /// Set the description, keeping at most `description_max_chars` characters.
    pub fn set_description(&mut self, description: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the description")?;
        self.draft.description = truncate_chars(description, self.config.description_max_chars);
        Ok(())
    }

    pub fn set_condition(&mut self, condition: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the condition")?;
        self.draft.condition = condition.to_string();
        Ok(())
    }

    pub fn set_brand(&mut self, brand: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the brand")?;
        self.draft.brand = brand.to_string();
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the model")?;
        self.draft.model = model.to_string();
        Ok(())
    }

    /// Set the year as typed. It is parsed on submit.
    pub fn set_year(&mut self, year: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details, "edit the year")?;
        self.draft.year = year.to_string();
        Ok(())
    }

    /// Replace the photo selection.
    ///
    /// A batch over `max_images` is rejected whole and the current
    /// selection is kept.
    pub fn select_images(&mut self, images: Vec<ImageFile>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Photos, "select photos")?;
        self.check_image_count(images.len())?;
        tracing::debug!(count = images.len(), "images selected");
        self.draft.images = images;
        Ok(())
    }

    /// Check a batch size against `max_images` before any photo is loaded.
    pub fn check_image_count(&self, selected: usize) -> Result<(), WizardError> {
        let max = self.config.max_images;
        if selected > max {
            tracing::warn!(selected, max, "too many images selected");
            return Err(WizardError::TooManyImages { max, selected });
        }
        Ok(())
    }

    /// Drop one photo from the selection.
    pub fn remove_image(&mut self, index: usize) -> Result<ImageFile, WizardError> {
        self.expect_step(WizardStep::Photos, "remove a photo")?;
        if index >= self.draft.images.len() {
            return Err(WizardError::ValidationFailure(format!(
                "no photo at position {}",
                index + 1
            )));
        }
        Ok(self.draft.images.remove(index))
    }

    pub fn set_price(&mut self, price: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PriceLocation, "edit the price")?;
        self.draft.price = price.to_string();
        Ok(())
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PriceLocation, "edit the location")?;
        self.draft.location = location.to_string();
        Ok(())
    }

    /// Advance from details to photos, or photos to price.
    ///
    /// Steps 1 and 2 advance by selection; step 5 by [`submit`](Self::submit).
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open("continue")?;
        let next = match self.step {
            WizardStep::Details => {
                if self.config.require_details {
                    let missing = self.draft.missing_details();
                    if !missing.is_empty() {
                        return Err(WizardError::ValidationFailure(format!(
                            "missing {}",
                            missing.join(", ")
                        )));
                    }
                }
                WizardStep::Photos
            }
            WizardStep::Photos => WizardStep::PriceLocation,
            step => {
                return Err(WizardError::InvalidTransition {
                    step,
                    action: "continue",
                })
            }
        };
        self.move_to(next);
        Ok(next)
    }

    /// Go back one step.
    ///
    /// Leaving step 3 clears the subcategory and leaving step 2 clears the
    /// group. From step 1 the wizard closes, discards the draft, and returns
    /// [`Navigation::Exit`].
    pub fn back(&mut self) -> Result<Option<Navigation>, WizardError> {
        self.ensure_open("go back")?;
        match self.step {
            WizardStep::CategoryGroup => {
                self.draft = DraftListing::default();
                self.exited = true;
                tracing::debug!("wizard exited");
                return Ok(Some(Navigation::Exit));
            }
            WizardStep::Category => {
                self.draft.group = None;
                self.draft.category = None;
            }
            WizardStep::Details => {
                self.draft.category = None;
            }
            WizardStep::Photos | WizardStep::PriceLocation => {}
        }
        if let Some(previous) = self.step.previous() {
            self.move_to(previous);
        }
        Ok(None)
    }

    /// Post the listing.
    ///
    /// Checks identity first, then validates, then uploads every photo and
    /// inserts one row that references their URLs. On failure the wizard
    /// stays on step 5 with the draft intact. There is no idempotency key:
    /// retrying after an ambiguous insert failure can post twice, and photos
    /// uploaded before a failed insert are left in storage.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, WizardError> {
        if self.submission == SubmitState::Submitting {
            return Err(WizardError::SubmitInProgress);
        }
        self.expect_step(WizardStep::PriceLocation, "post")?;

        let Some(seller) = self.identity.current_identity() else {
            tracing::warn!("submit without identity");
            self.submission = SubmitState::Failed(ErrorKind::AuthenticationRequired);
            return Err(WizardError::AuthenticationRequired);
        };

        let fields = match self.draft.validate(&self.config) {
            Ok(fields) => fields,
            Err(e) => return Err(self.fail(e)),
        };

        let in_flight = InFlight::start(&mut self.submission);
        tracing::info!(
            seller = %seller.id,
            images = self.draft.images.len(),
            "submitting listing"
        );

        let posted =
            submit::post_listing(self.backend.as_ref(), &self.config, &self.draft, &fields, &seller)
                .await;
        match posted {
            Ok(stored) => {
                in_flight.settle(SubmitState::Done(stored.id.clone()));
                tracing::info!(listing = %stored.id, category = %stored.category_id, "listing created");
                self.draft = DraftListing::default();
                Ok(SubmitOutcome {
                    navigation: Navigation::ListingDetail(stored.id.clone()),
                    listing: stored,
                })
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), error = %e, "submit failed");
                in_flight.settle(SubmitState::Failed(e.kind()));
                Err(e)
            }
        }
    }

    fn fail(&mut self, err: WizardError) -> WizardError {
        tracing::warn!(kind = ?err.kind(), error = %err, "submit failed");
        self.submission = SubmitState::Failed(err.kind());
        err
    }

    fn move_to(&mut self, step: WizardStep) {
        tracing::debug!(from = %self.step, to = %step, "wizard step");
        self.step = step;
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), WizardError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            })
        }
    }

    fn expect_step(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        self.ensure_open(action)?;
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, Session};
    use classifieds_store::MemoryBackend;

    fn wizard() -> ListingWizard {
        ListingWizard::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(Session::signed_in(Identity::new("u1", "seller@example.com"))),
        )
    }

    fn at_details() -> ListingWizard {
        let mut w = wizard();
        w.select_group("Electronics & Appliances").unwrap();
        w.select_category("Mobile Phones").unwrap();
        w
    }

    #[test]
    fn test_selection_advances() {
        let mut w = wizard();
        assert_eq!(w.heading(), "Choose a category");
        let group = w.select_group("Vehicles").unwrap();
        assert_eq!(group.slug, "vehicles");
        assert_eq!(w.step(), WizardStep::Category);
        assert_eq!(w.heading(), "Vehicles");
        assert_eq!(w.available_categories().len(), 5);

        assert_eq!(
            w.select_category("Laptops"),
            Err(WizardError::UnknownCategory("Laptops".into()))
        );
        w.select_category("Cars").unwrap();
        assert_eq!(w.step(), WizardStep::Details);
        assert_eq!(w.draft().category.map(|c| c.slug), Some("cars"));
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        let mut w = wizard();
        assert!(matches!(w.select_group("Boats"), Err(WizardError::UnknownCategory(_))));
        assert_eq!(w.step(), WizardStep::CategoryGroup);
    }

    #[test]
    fn test_details_gate() {
        let mut w = at_details();
        w.set_title("iPhone 13").unwrap();
        assert_eq!(
            w.next(),
            Err(WizardError::ValidationFailure("missing description, brand".into()))
        );
        w.set_description("Barely used").unwrap();
        w.set_brand("Apple").unwrap();
        assert_eq!(w.next(), Ok(WizardStep::Photos));
    }

    #[test]
    fn test_details_gate_can_be_relaxed() {
        let mut w = ListingWizard::with_config(
            Arc::new(MemoryBackend::new()),
            Arc::new(Session::anonymous()),
            WizardConfig {
                require_details: false,
                ..WizardConfig::default()
            },
        );
        w.select_group("pets").unwrap();
        w.select_category("dogs").unwrap();
        assert_eq!(w.next(), Ok(WizardStep::Photos));
    }

    #[test]
    fn test_setters_are_step_bound() {
        let mut w = wizard();
        assert_eq!(
            w.set_price("10"),
            Err(WizardError::InvalidTransition {
                step: WizardStep::CategoryGroup,
                action: "edit the price",
            })
        );
        assert!(w.next().is_err());
    }

    #[test]
    fn test_back_clears_dependents() {
        let mut w = at_details();
        assert_eq!(w.back(), Ok(None));
        assert_eq!(w.step(), WizardStep::Category);
        assert!(w.draft().category.is_none());
        assert!(w.draft().group.is_some());

        assert_eq!(w.back(), Ok(None));
        assert_eq!(w.step(), WizardStep::CategoryGroup);
        assert!(w.draft().group.is_none());

        assert_eq!(w.back(), Ok(Some(Navigation::Exit)));
        assert!(!w.is_open());
        assert!(w.select_group("Pets").is_err());
    }

    #[test]
    fn test_back_from_later_steps_keeps_fields() {
        let mut w = at_details();
        w.set_title("t").unwrap();
        w.set_description("d").unwrap();
        w.set_brand("b").unwrap();
        w.next().unwrap();
        w.next().unwrap();
        w.set_price("5").unwrap();

        w.back().unwrap();
        assert_eq!(w.step(), WizardStep::Photos);
        w.back().unwrap();
        assert_eq!(w.step(), WizardStep::Details);
        assert_eq!(w.draft().price, "5");
        assert!(w.draft().category.is_some());
    }

    #[test]
    fn test_image_count_is_checked_up_front() {
        let w = wizard();
        assert_eq!(w.check_image_count(20), Ok(()));
        assert_eq!(
            w.check_image_count(21),
            Err(WizardError::TooManyImages { max: 20, selected: 21 })
        );
    }

    #[test]
    fn test_remove_image() {
        let mut w = at_details();
        w.set_title("t").unwrap();
        w.set_description("d").unwrap();
        w.set_brand("b").unwrap();
        w.next().unwrap();
        w.select_images(vec![
            ImageFile::new("a.jpg", vec![1]),
            ImageFile::new("b.jpg", vec![2]),
        ])
        .unwrap();

        assert_eq!(w.remove_image(0).unwrap().name, "a.jpg");
        assert_eq!(w.draft().images.len(), 1);
        assert!(w.remove_image(5).is_err());
    }
}
