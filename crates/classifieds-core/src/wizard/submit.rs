//! Uploading photos and inserting the listing row.

use crate::config::WizardConfig;
use crate::identity::Identity;
use crate::listing::{Listing, ListingStatus, Location, NewListing};
use crate::wizard::draft::{non_blank, DraftListing, ImageFile, ValidatedFields};
use crate::wizard::WizardError;
use chrono::Utc;
use classifieds_store::{Backend, Row};
use futures::{StreamExt, TryStreamExt};

/// Object name for the image at `index` of a batch stamped `stamp_ms`.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, so names are safe as
/// storage paths and never collide within one batch.
pub fn object_name(stamp_ms: i64, index: usize, file_name: &str) -> String {
    let base = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file_name);
    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('.').is_empty() {
        sanitized = "image".to_string();
    }
    format!("{}-{}-{}", stamp_ms, index, sanitized)
}

/// Upload every image and return their public URLs in selection order.
///
/// Up to `config.upload_concurrency` uploads run at once. The first failure
/// aborts the batch; uploads still in flight are dropped.
pub async fn upload_images(
    backend: &dyn Backend,
    config: &WizardConfig,
    stamp_ms: i64,
    images: &[ImageFile],
) -> Result<Vec<String>, WizardError> {
    let bucket = config.image_bucket.as_str();
    futures::stream::iter(images.iter().enumerate())
        .map(|(index, image)| async move {
            let name = object_name(stamp_ms, index, &image.name);
            let path = backend
                .upload_file(bucket, &name, &image.content, image.content_type.as_deref())
                .await
                .map_err(|e| {
                    tracing::warn!(file = %image.name, index, error = %e, "image upload failed");
                    WizardError::upload(&image.name, e)
                })?;
            tracing::debug!(file = %image.name, index, path = %path, "image uploaded");
            Ok::<_, WizardError>(backend.public_url(bucket, &path))
        })
        .buffered(config.upload_concurrency.max(1))
        .try_collect()
        .await
}

/// Upload the draft's photos, then insert the listing that references them.
pub async fn post_listing(
    backend: &dyn Backend,
    config: &WizardConfig,
    draft: &DraftListing,
    fields: &ValidatedFields,
    seller: &Identity,
) -> Result<Listing, WizardError> {
    let stamp = Utc::now().timestamp_millis();
    let urls = upload_images(backend, config, stamp, &draft.images).await?;
    let listing = build_listing(draft, fields, seller, urls)?;
    insert_listing(backend, config, &listing).await
}

/// Build the listing row for a validated draft.
pub fn build_listing(
    draft: &DraftListing,
    fields: &ValidatedFields,
    seller: &Identity,
    images: Vec<String>,
) -> Result<NewListing, WizardError> {
    let category = draft
        .category
        .ok_or_else(|| WizardError::ValidationFailure("category is required".into()))?;
    Ok(NewListing {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        price: fields.price.to_decimal(),
        seller_id: seller.id.clone(),
        category_id: category.id(),
        location: Location::address(draft.location.trim()),
        images,
        status: ListingStatus::Active,
        negotiable: false,
        condition: non_blank(&draft.condition),
        brand: non_blank(&draft.brand),
        model: non_blank(&draft.model),
        year: fields.year,
    })
}

/// Insert the listing row and decode what the backend stored.
pub async fn insert_listing(
    backend: &dyn Backend,
    config: &WizardConfig,
    listing: &NewListing,
) -> Result<Listing, WizardError> {
    let row = Row::from_serialize(listing)?;
    let stored = backend
        .insert_row(&config.listings_table, row)
        .await
        .map_err(|e| {
            tracing::warn!(table = %config.listings_table, error = %e, "listing insert failed");
            WizardError::from(e)
        })?;
    Ok(stored.deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifieds_store::MemoryBackend;
    use std::time::Duration;

    #[test]
    fn test_object_name() {
        assert_eq!(object_name(1700, 0, "photo.jpg"), "1700-0-photo.jpg");
        assert_eq!(object_name(1700, 3, "my pic (1).PNG"), "1700-3-my_pic__1_.PNG");
        assert_eq!(object_name(1700, 1, "../../etc/passwd"), "1700-1-passwd");
        assert_eq!(object_name(1700, 2, ".."), "1700-2-image");
        assert_eq!(object_name(1700, 0, "caf\u{e9}.jpg"), "1700-0-caf_.jpg");
    }

    #[tokio::test]
    async fn test_uploads_keep_selection_order() {
        let backend = MemoryBackend::new();
        backend.delay_uploads_matching("-0-", Duration::from_millis(50)).await;
        let images = vec![
            ImageFile::new("slow.jpg", vec![1]),
            ImageFile::new("fast.jpg", vec![2]),
            ImageFile::new("fast.jpg", vec![3]),
        ];

        let urls = upload_images(&backend, &WizardConfig::default(), 42, &images)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                backend.public_url("listing-images", "42-0-slow.jpg"),
                backend.public_url("listing-images", "42-1-fast.jpg"),
                backend.public_url("listing-images", "42-2-fast.jpg"),
            ]
        );
        let stored = backend.object("listing-images", "42-2-fast.jpg").await.unwrap();
        assert_eq!(stored.content, vec![3]);
    }

    #[tokio::test]
    async fn test_upload_failure_names_the_file() {
        let backend = MemoryBackend::new();
        backend.fail_uploads_matching("broken").await;
        let images = vec![
            ImageFile::new("ok.jpg", vec![1]),
            ImageFile::new("broken.jpg", vec![2]),
        ];

        let err = upload_images(&backend, &WizardConfig::default(), 7, &images)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::UploadFailure { ref file, .. } if file == "broken.jpg"));
    }
}
