//! Integration tests for the photo set lifecycle: stage + commit against the
//! fixture store with mock object storage, including the upload-failure
//! cleanup path and the ordering operations (primary selection, removal
//! compaction).

mod common;

use market_core::common::AuthContext;
use market_core::domains::listings::moderation;
use market_core::domains::listings::{PhotoCandidate, PhotoSetManager};
use market_core::kernel::test_dependencies::MockObjectStorage;
use market_core::store::{BaseMarketStore, FixtureMarketStore};

use crate::common::{new_property, new_service, resident};

const BUCKET: &str = "listing-photos";

fn jpeg(name: &str) -> PhotoCandidate {
    PhotoCandidate {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0u8; 2048],
    }
}

async fn owned_listing(
    store: &FixtureMarketStore,
    owner: &AuthContext,
) -> market_core::domains::listings::Listing {
    moderation::submit_listing(
        store,
        owner,
        new_property("Apartamento 2 quartos", market_core::domains::listings::Deal::Venda),
    )
    .await
    .unwrap()
}

// =============================================================================
// Commit
// =============================================================================

#[tokio::test]
async fn commit_persists_ordered_set_with_first_as_primary() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;

    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);
    let staged = mgr
        .stage(vec![jpeg("frente.jpg"), jpeg("sala.jpg"), jpeg("cozinha.jpg")], 0)
        .unwrap();
    let photos = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    assert_eq!(photos.len(), 3);
    assert_eq!(
        photos.iter().map(|p| p.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(photos[0].is_primary);
    assert!(!photos[1].is_primary && !photos[2].is_primary);
    assert_eq!(storage.uploads().len(), 3);
    // Keys are namespaced under owner and listing.
    let prefix = format!("{}/{}/", owner.profile_id, listing.id);
    assert!(storage.uploads().iter().all(|c| c.key.starts_with(&prefix)));
}

#[tokio::test]
async fn commit_with_kept_urls_removes_only_dropped_objects() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("a.jpg"), jpeg("b.jpg")], 0).unwrap();
    let initial = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();
    let kept = initial[0].url.clone();
    let dropped = initial[1].url.clone();

    let staged = mgr.stage(vec![jpeg("c.jpg")], 1).unwrap();
    let replaced = mgr
        .commit(&owner, listing.id, staged, vec![kept.clone()])
        .await
        .unwrap();

    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[0].url, kept);
    assert!(replaced[0].is_primary);

    // Only the dropped object reached storage removal.
    let removed = storage.removed_keys();
    assert_eq!(removed.len(), 1);
    assert!(dropped.ends_with(&removed[0]));
}

#[tokio::test]
async fn commit_rejects_kept_url_from_another_listing() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let err = mgr
        .commit(
            &owner,
            listing.id,
            Vec::new(),
            vec!["mock://listing-photos/elsewhere/1/1-0.jpg".to_string()],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(storage.uploads().is_empty());
}

#[tokio::test]
async fn commit_is_owner_gated() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("a.jpg")], 0).unwrap();
    let err = mgr
        .commit(&resident(), listing.id, staged, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unauthorized");
    assert!(storage.uploads().is_empty());
}

#[tokio::test]
async fn mid_batch_upload_failure_cleans_up_and_leaves_records_untouched() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new().with_upload_failures_after(1);
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("a.jpg"), jpeg("b.jpg")], 0).unwrap();
    let err = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "upstream");
    assert!(err.to_string().contains("b.jpg"));

    // The one successful upload was rolled back, and no records landed.
    let uploads = storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(storage.removed_keys(), vec![uploads[0].key.clone()]);
    assert!(store.list_photos(listing.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn record_write_failure_after_upload_is_partial_and_cleans_up_storage() {
    let store = FixtureMarketStore::empty().with_failing_photo_writes();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("frente.jpg")], 0).unwrap();
    let err = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "partial");

    // The upload went through, then the orphaned object was handed back to
    // storage removal; no photo records landed.
    let uploads = storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(storage.removed_keys(), vec![uploads[0].key.clone()]);
    assert!(store.list_photos(listing.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn commit_enforces_quota_against_kept_set() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    // Service images are capped at one.
    let listing = moderation::submit_listing(&store, &owner, new_service("Faxina", None))
        .await
        .unwrap();
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 1);

    let staged = mgr.stage(vec![jpeg("antes.jpg")], 0).unwrap();
    let first = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    let staged = mgr.stage(vec![jpeg("depois.jpg")], 0).unwrap();
    let err = mgr
        .commit(&owner, listing.id, staged, vec![first[0].url.clone()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("maximum photos reached"));
}

// =============================================================================
// Ordering operations
// =============================================================================

#[tokio::test]
async fn set_primary_moves_photo_to_front() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr
        .stage(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")], 0)
        .unwrap();
    let photos = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    mgr.set_primary(&owner, listing.id, photos[2].id).await.unwrap();

    let after = store.list_photos(listing.id).await.unwrap();
    assert_eq!(after[0].id, photos[2].id);
    assert!(after[0].is_primary);
    // The former primary keeps its relative order behind the new one.
    assert_eq!(after[1].id, photos[0].id);
    assert!(!after[1].is_primary);
    assert_eq!(
        after.iter().map(|p| p.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn remove_photo_compacts_and_promotes_new_front() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr
        .stage(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")], 0)
        .unwrap();
    let photos = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    mgr.remove_photo(&owner, listing.id, photos[0].id).await.unwrap();

    let after = store.list_photos(listing.id).await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(
        after.iter().map(|p| p.position).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!(after[0].is_primary);
    // The deleted object was handed to storage removal.
    assert!(!storage.removed_keys().is_empty());
}

#[tokio::test]
async fn remove_photo_tolerates_storage_refusal() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new().with_failing_removals();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("a.jpg"), jpeg("b.jpg")], 0).unwrap();
    let photos = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    // Storage cleanup is best-effort; the record deletion still sticks.
    mgr.remove_photo(&owner, listing.id, photos[1].id).await.unwrap();
    assert_eq!(store.list_photos(listing.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reorder_photos_rejects_foreign_ids() {
    let store = FixtureMarketStore::empty();
    let storage = MockObjectStorage::new();
    let owner = resident();
    let listing = owned_listing(&store, &owner).await;
    let mgr = PhotoSetManager::new(&store, &storage, BUCKET, 5);

    let staged = mgr.stage(vec![jpeg("a.jpg"), jpeg("b.jpg")], 0).unwrap();
    let photos = mgr
        .commit(&owner, listing.id, staged, Vec::new())
        .await
        .unwrap();

    let err = mgr
        .reorder_photos(
            &owner,
            listing.id,
            &[photos[0].id, market_core::common::PhotoId::new(999)],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");
}
