//! User profiles and avatars.

use crate::error::{MarketError, MarketResult};
use crate::identity::{Identity, IdentityProvider};
use crate::ids::UserId;
use crate::tables;
use crate::wizard::ImageFile;
use chrono::{DateTime, Utc};
use classifieds_store::{Backend, Filter, Row, Select};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Object storage bucket for avatars.
pub const AVATAR_BUCKET: &str = "user-avatars";

/// Largest avatar accepted, in bytes.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const AVATAR_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Links to the user's social accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl SocialLinks {
    /// Overlay the links set in `other`, keeping the rest.
    pub fn merge(&mut self, other: &SocialLinks) {
        for (slot, value) in [
            (&mut self.facebook, &other.facebook),
            (&mut self.twitter, &other.twitter),
            (&mut self.instagram, &other.instagram),
            (&mut self.linkedin, &other.linkedin),
        ] {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
    }
}

/// Notification and display preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_emails: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// A row in the `profiles` table, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// The profile shown before the user has saved one.
    pub fn basic(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: Some(identity.email.clone()),
            full_name: None,
            username: None,
            avatar_url: None,
            phone_number: None,
            location: None,
            bio: None,
            website: None,
            social_links: None,
            preferences: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Merged into the stored links rather than replacing them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl ProfileUpdate {
    /// Check if nothing would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Read and edit the signed-in user's profile.
#[derive(Clone)]
pub struct ProfilesService {
    backend: Arc<dyn Backend>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProfilesService {
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { backend, identity }
    }

    /// The signed-in user's profile, or [`Profile::basic`] if none is stored.
    pub async fn get(&self) -> MarketResult<Profile> {
        let who = self.require_identity()?;
        match self.stored(&who.id).await? {
            Some(profile) => Ok(profile),
            None => {
                tracing::debug!(user = %who.id, "no stored profile");
                Ok(Profile::basic(&who))
            }
        }
    }

    /// Apply `changes`, creating the profile on first save.
    pub async fn update(&self, changes: &ProfileUpdate) -> MarketResult<Profile> {
        let who = self.require_identity()?;
        let existing = self.stored(&who.id).await?;

        let mut patch = Row::from_serialize(changes)?;
        if let Some(links) = &changes.social_links {
            let mut merged = existing
                .as_ref()
                .and_then(|p| p.social_links.clone())
                .unwrap_or_default();
            merged.merge(links);
            let merged = serde_json::to_value(&merged)
                .map_err(|e| MarketError::Validation(e.to_string()))?;
            patch.set("social_links", merged);
        }
        patch.set("email", who.email.as_str());

        let row = if existing.is_some() {
            tracing::debug!(user = %who.id, "updating profile");
            self.backend
                .update_rows(tables::PROFILES, &[Filter::eq("id", &who.id)], patch)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| MarketError::Backend("profile update returned no rows".into()))?
        } else {
            tracing::debug!(user = %who.id, "creating profile");
            patch.set("id", &who.id);
            self.backend.insert_row(tables::PROFILES, patch).await?
        };
        Ok(row.deserialize()?)
    }

    /// Upload a new avatar and point the profile at it.
    ///
    /// Returns the avatar URL. The upload counts even if recording the URL
    /// on the profile fails afterwards.
    pub async fn upload_avatar(&self, file: &ImageFile) -> MarketResult<String> {
        let who = self.require_identity()?;
        let extension = avatar_extension(&file.name).ok_or_else(|| {
            MarketError::Validation(format!(
                "Invalid file type. Please upload an image file ({})",
                AVATAR_EXTENSIONS.join(", ")
            ))
        })?;
        if file.size() > MAX_AVATAR_BYTES {
            return Err(MarketError::Validation(
                "File too large. Maximum size is 5MB".into(),
            ));
        }

        let stamp = Utc::now().timestamp_millis();
        let path = format!("avatars/{}-{}.{}", who.id, stamp, extension);
        let content_type = file
            .content_type
            .as_deref()
            .or_else(|| ImageFile::guess_content_type(&file.name));
        let stored = self
            .backend
            .upload_file(AVATAR_BUCKET, &path, &file.content, content_type)
            .await?;
        let url = format!("{}?t={}", self.backend.public_url(AVATAR_BUCKET, &stored), stamp);
        tracing::info!(user = %who.id, path = %stored, "avatar uploaded");

        let changes = ProfileUpdate {
            avatar_url: Some(url.clone()),
            ..ProfileUpdate::default()
        };
        if let Err(e) = self.update(&changes).await {
            tracing::warn!(user = %who.id, error = %e, "avatar uploaded but profile not updated");
        }
        Ok(url)
    }

    /// Every stored profile, newest first.
    pub async fn all(&self) -> MarketResult<Vec<Profile>> {
        self.backend
            .select_rows(tables::PROFILES, &Select::all().order_by("created_at", false))
            .await?
            .iter()
            .map(|row| row.deserialize().map_err(MarketError::from))
            .collect()
    }

    async fn stored(&self, id: &UserId) -> MarketResult<Option<Profile>> {
        let row = self
            .backend
            .select_one(tables::PROFILES, &Select::all().filter(Filter::eq("id", id)))
            .await?;
        Ok(row.map(|r| r.deserialize()).transpose()?)
    }

    fn require_identity(&self) -> MarketResult<Identity> {
        self.identity
            .current_identity()
            .ok_or(MarketError::AuthenticationRequired)
    }
}

fn avatar_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    AVATAR_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Session;
    use classifieds_store::MemoryBackend;

    fn service() -> (Arc<MemoryBackend>, ProfilesService) {
        let backend = Arc::new(tables::memory_backend());
        let session = Arc::new(Session::signed_in(Identity::new("u1", "u1@example.com")));
        (backend.clone(), ProfilesService::new(backend, session))
    }

    #[tokio::test]
    async fn test_get_falls_back_to_identity() {
        let (_, profiles) = service();
        let profile = profiles.get().await.unwrap();
        assert_eq!(profile.id.as_str(), "u1");
        assert_eq!(profile.email.as_deref(), Some("u1@example.com"));
        assert!(profile.full_name.is_none());
    }

    #[tokio::test]
    async fn test_update_creates_then_merges() {
        let (backend, profiles) = service();
        let created = profiles
            .update(&ProfileUpdate {
                full_name: Some("Ada".into()),
                social_links: Some(SocialLinks {
                    twitter: Some("@ada".into()),
                    ..SocialLinks::default()
                }),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "u1");
        assert!(created.created_at.is_some());
        assert_eq!(backend.rows(tables::PROFILES).await.len(), 1);

        let updated = profiles
            .update(&ProfileUpdate {
                bio: Some("Sells bikes".into()),
                social_links: Some(SocialLinks {
                    instagram: Some("ada.rides".into()),
                    ..SocialLinks::default()
                }),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Ada"));
        assert_eq!(updated.bio.as_deref(), Some("Sells bikes"));
        let links = updated.social_links.unwrap();
        assert_eq!(links.twitter.as_deref(), Some("@ada"));
        assert_eq!(links.instagram.as_deref(), Some("ada.rides"));
        assert_eq!(backend.rows(tables::PROFILES).await.len(), 1);
        assert_eq!(profiles.get().await.unwrap().bio.as_deref(), Some("Sells bikes"));
    }

    #[tokio::test]
    async fn test_avatar_upload() {
        let (backend, profiles) = service();
        let url = profiles
            .upload_avatar(&ImageFile::new("me.PNG", vec![1, 2, 3]))
            .await
            .unwrap();
        assert!(url.contains("/user-avatars/avatars/u1-"));
        assert!(url.contains(".png?t="));
        assert_eq!(backend.object_count().await, 1);
        assert_eq!(profiles.get().await.unwrap().avatar_url, Some(url));
    }

    #[tokio::test]
    async fn test_avatar_rejects_bad_files() {
        let (backend, profiles) = service();
        assert!(matches!(
            profiles.upload_avatar(&ImageFile::new("notes.txt", vec![1])).await,
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            profiles.upload_avatar(&ImageFile::new("noext", vec![1])).await,
            Err(MarketError::Validation(_))
        ));
        let big = ImageFile::new("big.jpg", vec![0; MAX_AVATAR_BYTES + 1]);
        assert_eq!(
            profiles.upload_avatar(&big).await,
            Err(MarketError::Validation("File too large. Maximum size is 5MB".into()))
        );
        assert_eq!(backend.calls().uploads, 0);
    }

    #[tokio::test]
    async fn test_anonymous_is_rejected() {
        let profiles = ProfilesService::new(
            Arc::new(tables::memory_backend()),
            Arc::new(Session::anonymous()),
        );
        assert_eq!(profiles.get().await, Err(MarketError::AuthenticationRequired));
        assert_eq!(
            profiles.update(&ProfileUpdate::default()).await,
            Err(MarketError::AuthenticationRequired)
        );
    }
}
