//! Photo set management for listings.
//!
//! Staging validates a whole batch up front (type, size, quota); commit
//! uploads to object storage, deletes dropped objects, then replaces the
//! photo records in one gateway call with index 0 as primary. Storage and
//! records are two resources with no transactional coupling: the record
//! write is strict, the storage side is best-effort. When the record write
//! fails after upload, the manager tries to remove the objects it just
//! uploaded and logs whatever it could not clean up; there is no background
//! reconciliation sweep (documented limitation).

use chrono::Utc;

use crate::common::{AuthContext, CoreError, CoreResult, ListingId, PhotoId};
use crate::domains::ordering::{self, collections::PhotoCollection};
use crate::kernel::BaseObjectStorage;
use crate::store::BaseMarketStore;

use super::models::{NewPhoto, Photo};

/// Per-file ceiling: 5 MB.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// A candidate file as received from the presentation layer.
#[derive(Debug, Clone)]
pub struct PhotoCandidate {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A validated candidate, ready for commit.
#[derive(Debug, Clone)]
pub struct StagedPhoto {
    pub file_name: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

pub struct PhotoSetManager<'a> {
    store: &'a dyn BaseMarketStore,
    storage: &'a dyn BaseObjectStorage,
    bucket: &'a str,
    /// Maximum photos per listing in this context (1 for a service image,
    /// 5 for a new property submission, 10 for post-approval management).
    max_photos: usize,
}

impl<'a> PhotoSetManager<'a> {
    pub fn new(
        store: &'a dyn BaseMarketStore,
        storage: &'a dyn BaseObjectStorage,
        bucket: &'a str,
        max_photos: usize,
    ) -> Self {
        Self {
            store,
            storage,
            bucket,
            max_photos,
        }
    }

    // =========================================================================
    // Staging
    // =========================================================================

    /// Validate a batch of candidates against type, size and quota rules.
    /// All-or-nothing: one bad file rejects the whole batch.
    pub fn stage(
        &self,
        candidates: Vec<PhotoCandidate>,
        existing_count: usize,
    ) -> CoreResult<Vec<StagedPhoto>> {
        if existing_count + candidates.len() > self.max_photos {
            return Err(CoreError::validation(format!(
                "maximum photos reached ({} allowed)",
                self.max_photos
            )));
        }

        candidates
            .into_iter()
            .map(|candidate| {
                let extension = ALLOWED_TYPES
                    .iter()
                    .find(|(mime, _)| *mime == candidate.content_type)
                    .map(|(_, ext)| *ext)
                    .ok_or_else(|| {
                        CoreError::validation(format!(
                            "unsupported format: {} ({})",
                            candidate.file_name, candidate.content_type
                        ))
                    })?;
                if candidate.bytes.len() > MAX_PHOTO_BYTES {
                    return Err(CoreError::validation(format!(
                        "file too large: {} exceeds 5MB",
                        candidate.file_name
                    )));
                }
                Ok(StagedPhoto {
                    file_name: candidate.file_name,
                    extension,
                    bytes: candidate.bytes,
                })
            })
            .collect()
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Upload staged files, drop existing photos not in `keep_existing_urls`,
    /// and persist the final ordered set (kept urls first, then new uploads;
    /// index 0 primary). Atomic from the caller's point of view at the record
    /// layer: on failure the listing's photo records are unchanged.
    pub async fn commit(
        &self,
        auth: &AuthContext,
        listing_id: ListingId,
        staged: Vec<StagedPhoto>,
        keep_existing_urls: Vec<String>,
    ) -> CoreResult<Vec<Photo>> {
        let listing = self
            .store
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("listing", listing_id))?;
        auth.require_owner(listing.owner, "managing photos of this listing")?;

        let existing = self.store.list_photos(listing_id).await?;
        for url in &keep_existing_urls {
            if !existing.iter().any(|p| &p.url == url) {
                return Err(CoreError::validation(format!(
                    "kept photo is not part of this listing: {url}"
                )));
            }
        }
        if keep_existing_urls.len() + staged.len() > self.max_photos {
            return Err(CoreError::validation(format!(
                "maximum photos reached ({} allowed)",
                self.max_photos
            )));
        }

        // Upload under collision-resistant names derived from owner,
        // timestamp and batch index.
        let total_steps = staged.len() + 1;
        let stamp = Utc::now().timestamp_millis();
        let mut uploaded: Vec<(String, String)> = Vec::with_capacity(staged.len());
        for (index, photo) in staged.iter().enumerate() {
            let key = format!(
                "{}/{}/{stamp}-{index}.{}",
                listing.owner, listing_id, photo.extension
            );
            match self.storage.upload(self.bucket, &key, photo.bytes.clone()).await {
                Ok(url) => uploaded.push((key, url)),
                Err(err) => {
                    let keys: Vec<String> = uploaded.into_iter().map(|(key, _)| key).collect();
                    self.cleanup_keys(&keys).await;
                    return Err(CoreError::Upstream(format!(
                        "upload failed for {}: {err}",
                        photo.file_name
                    )));
                }
            }
        }

        // Dropped objects are deleted before the record write so the two
        // steps land in a known order within this session.
        let dropped_keys: Vec<String> = existing
            .iter()
            .filter(|p| !keep_existing_urls.contains(&p.url))
            .filter_map(|p| key_from_url(&p.url, self.bucket))
            .collect();
        if !dropped_keys.is_empty() {
            if let Err(err) = self.storage.remove(self.bucket, &dropped_keys).await {
                let keys: Vec<String> = uploaded.into_iter().map(|(key, _)| key).collect();
                self.cleanup_keys(&keys).await;
                return Err(CoreError::Upstream(format!(
                    "failed to delete replaced photos: {err}"
                )));
            }
        }

        let final_set: Vec<NewPhoto> = keep_existing_urls
            .into_iter()
            .chain(uploaded.iter().map(|(_, url)| url.clone()))
            .map(|url| NewPhoto { url })
            .collect();

        match self.store.replace_photos(listing_id, &final_set).await {
            Ok(photos) => Ok(photos),
            Err(err) => {
                tracing::warn!(
                    listing_id = %listing_id,
                    error = %err,
                    "Photo record write failed after upload; cleaning up storage"
                );
                let keys: Vec<String> = uploaded.into_iter().map(|(key, _)| key).collect();
                self.cleanup_keys(&keys).await;
                Err(CoreError::Partial {
                    operation: "photo commit",
                    applied: total_steps - 1,
                    total: total_steps,
                })
            }
        }
    }

    async fn cleanup_keys(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(err) = self.storage.remove(self.bucket, keys).await {
            tracing::warn!(
                keys = ?keys,
                error = %err,
                "Orphaned storage objects could not be cleaned up"
            );
        }
    }

    // =========================================================================
    // Ordering delegation
    // =========================================================================

    /// Reorder the listing's photo set; `ids` must be a permutation of it.
    pub async fn reorder_photos(
        &self,
        auth: &AuthContext,
        listing_id: ListingId,
        ids: &[PhotoId],
    ) -> CoreResult<()> {
        self.authorize(auth, listing_id).await?;
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        ordering::reorder(
            &PhotoCollection {
                store: self.store,
                listing: listing_id,
            },
            &raw,
        )
        .await
    }

    /// Make `photo_id` the primary photo: moved to index 0, all others
    /// demoted.
    pub async fn set_primary(
        &self,
        auth: &AuthContext,
        listing_id: ListingId,
        photo_id: PhotoId,
    ) -> CoreResult<()> {
        self.authorize(auth, listing_id).await?;
        ordering::move_to_front(
            &PhotoCollection {
                store: self.store,
                listing: listing_id,
            },
            photo_id.as_i64(),
        )
        .await
    }

    /// Remove one photo: delete the record, compact positions, and
    /// best-effort delete the storage object.
    pub async fn remove_photo(
        &self,
        auth: &AuthContext,
        listing_id: ListingId,
        photo_id: PhotoId,
    ) -> CoreResult<()> {
        self.authorize(auth, listing_id).await?;
        let photos = self.store.list_photos(listing_id).await?;
        let photo = photos
            .iter()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| CoreError::not_found("photo", photo_id))?;
        let key = key_from_url(&photo.url, self.bucket);

        self.store.delete_photo(listing_id, photo_id).await?;
        ordering::compact(&PhotoCollection {
            store: self.store,
            listing: listing_id,
        })
        .await?;

        if let Some(key) = key {
            self.cleanup_keys(&[key]).await;
        }
        Ok(())
    }

    async fn authorize(&self, auth: &AuthContext, listing_id: ListingId) -> CoreResult<()> {
        let listing = self
            .store
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("listing", listing_id))?;
        auth.require_owner(listing.owner, "managing photos of this listing")
    }
}

/// Recover the storage key from a photo URL. URLs are opaque, but both the
/// live and demo storage layers embed `/{bucket}/` before the key.
fn key_from_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{bucket}/");
    url.find(&marker)
        .map(|at| url[at + marker.len()..].to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockObjectStorage;
    use crate::store::FixtureMarketStore;

    fn candidate(name: &str, content_type: &str, len: usize) -> PhotoCandidate {
        PhotoCandidate {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    fn manager<'a>(
        store: &'a FixtureMarketStore,
        storage: &'a MockObjectStorage,
        max: usize,
    ) -> PhotoSetManager<'a> {
        PhotoSetManager::new(store, storage, "listing-photos", max)
    }

    #[test]
    fn stage_rejects_oversized_file() {
        let store = FixtureMarketStore::empty();
        let storage = MockObjectStorage::new();
        let mgr = manager(&store, &storage, 5);

        let batch = vec![
            candidate("ok.jpg", "image/jpeg", 1024),
            candidate("huge.png", "image/png", MAX_PHOTO_BYTES + 1),
        ];
        let err = mgr.stage(batch, 0).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().contains("file too large"));
    }

    #[test]
    fn stage_rejects_unsupported_format() {
        let store = FixtureMarketStore::empty();
        let storage = MockObjectStorage::new();
        let mgr = manager(&store, &storage, 5);

        let err = mgr
            .stage(vec![candidate("doc.gif", "image/gif", 10)], 0)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported format"));
    }

    #[test]
    fn stage_enforces_quota_boundary() {
        let store = FixtureMarketStore::empty();
        let storage = MockObjectStorage::new();
        let mgr = manager(&store, &storage, 5);

        let exactly_max: Vec<_> = (0..5)
            .map(|i| candidate(&format!("{i}.jpg"), "image/jpeg", 10))
            .collect();
        assert_eq!(mgr.stage(exactly_max, 0).unwrap().len(), 5);

        let over: Vec<_> = (0..6)
            .map(|i| candidate(&format!("{i}.jpg"), "image/jpeg", 10))
            .collect();
        let err = mgr.stage(over, 0).unwrap_err();
        assert!(err.to_string().contains("maximum photos reached"));

        // Existing photos count against the quota.
        let one = vec![candidate("a.webp", "image/webp", 10)];
        assert!(mgr.stage(one, 5).is_err());
    }

    #[test]
    fn key_recovery_from_urls() {
        assert_eq!(
            key_from_url(
                "https://cdn.example/storage/v1/listing-photos/owner/3/17-0.jpg",
                "listing-photos"
            )
            .as_deref(),
            Some("owner/3/17-0.jpg")
        );
        assert_eq!(key_from_url("mock://other-bucket/a.jpg", "listing-photos"), None);
    }
}
