//! Integration tests for the read-only catalog views over the seeded demo
//! dataset: storefront filtering, owner dashboards, the review queue, the
//! featured carousel, and denormalization of owners, categories and photos.

mod common;

use market_core::common::ProfileId;
use market_core::domains::catalog::{Catalog, Page};
use market_core::domains::listings::models::{ListingKind, ListingStatus};
use market_core::domains::listings::moderation;
use market_core::store::{BaseMarketStore, FixtureMarketStore, ListingFilter};

use crate::common::admin;

async fn owner_of(store: &FixtureMarketStore, title: &str) -> ProfileId {
    store
        .list_listings(ListingFilter::default())
        .await
        .unwrap()
        .into_iter()
        .find(|l| l.title == title)
        .expect("seeded listing present")
        .owner
}

// =============================================================================
// Storefront views
// =============================================================================

#[tokio::test]
async fn approved_view_returns_only_approved_newest_first() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let views = catalog.approved(None, Page::default()).await.unwrap();
    let titles: Vec<&str> = views.iter().map(|v| v.listing.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Kitnet mobiliada",
            "Apartamento 2 quartos, andar alto",
            "Faxina completa",
        ]
    );
    assert!(views
        .iter()
        .all(|v| v.listing.status == ListingStatus::Approved));
}

#[tokio::test]
async fn approved_view_narrows_by_kind() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let services = catalog
        .approved(Some(ListingKind::Service), Page::default())
        .await
        .unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].listing.title, "Faxina completa");

    let properties = catalog
        .approved(Some(ListingKind::Property), Page::default())
        .await
        .unwrap();
    assert_eq!(properties.len(), 2);
    assert!(properties.iter().all(|v| v.listing.property.is_some()));
}

#[tokio::test]
async fn approved_view_honors_paging() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let first = catalog
        .approved(None, Page { limit: 2, offset: 0 })
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let rest = catalog
        .approved(None, Page { limit: 2, offset: 2 })
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].listing.title, "Faxina completa");
}

#[tokio::test]
async fn category_view_excludes_pending_listings() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);
    let limpeza = store.list_categories().await.unwrap()[0].id;

    // "Passadoria semanal" sits in the same category but is still pending.
    let views = catalog
        .approved_in_category(limpeza, Page::default())
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].listing.title, "Faxina completa");
    assert_eq!(views[0].category_name.as_deref(), Some("Limpeza"));
}

// =============================================================================
// Denormalization
// =============================================================================

#[tokio::test]
async fn views_resolve_owner_profiles_and_photos() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let views = catalog.approved(None, Page::default()).await.unwrap();
    let venda = views
        .iter()
        .find(|v| v.listing.title.starts_with("Apartamento"))
        .unwrap();

    let owner = venda.owner.as_ref().expect("seeded owner resolved");
    assert_eq!(owner.display_name, "Carlos");
    assert_eq!(owner.unit_label, "Bloco C, Apto 104");

    assert_eq!(venda.photos.len(), 3);
    let primary = venda.primary_photo().unwrap();
    assert!(primary.is_primary);
    assert_eq!(primary.position, 0);
    // Properties carry no category.
    assert!(venda.category_name.is_none());
}

// =============================================================================
// Owner dashboard and review queue
// =============================================================================

#[tokio::test]
async fn owner_dashboard_shows_every_status_with_rejection_reason() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);
    let carlos = owner_of(&store, "Vaga de garagem").await;

    let views = catalog.owned_by(carlos).await.unwrap();
    let titles: Vec<&str> = views.iter().map(|v| v.listing.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Vaga de garagem",
            "Passadoria semanal",
            "Apartamento 2 quartos, andar alto",
        ]
    );

    let rejected = &views[0].listing;
    assert_eq!(rejected.status, ListingStatus::Rejected);
    assert!(rejected
        .rejection_reason
        .as_deref()
        .unwrap()
        .contains("sem fotos"));
}

#[tokio::test]
async fn review_queue_contains_only_pending_listings() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let queue = catalog.pending_review(Page::default()).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].listing.title, "Passadoria semanal");
}

// =============================================================================
// Featured carousel
// =============================================================================

#[tokio::test]
async fn carousel_preserves_curation_order() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);

    let carousel = catalog.featured_carousel().await.unwrap();
    let titles: Vec<&str> = carousel.iter().map(|v| v.listing.title.as_str()).collect();
    // Insertion order, not newest-first.
    assert_eq!(
        titles,
        vec!["Apartamento 2 quartos, andar alto", "Kitnet mobiliada"]
    );
}

#[tokio::test]
async fn carousel_drops_listings_that_leave_approved() {
    let store = FixtureMarketStore::seeded();
    let catalog = Catalog::new(&store);
    let venda_id = store
        .list_listings(ListingFilter::default())
        .await
        .unwrap()
        .into_iter()
        .find(|l| l.title.starts_with("Apartamento"))
        .unwrap()
        .id;

    moderation::unpublish(&store, &admin(), venda_id).await.unwrap();

    let carousel = catalog.featured_carousel().await.unwrap();
    assert_eq!(carousel.len(), 1);
    assert_eq!(carousel[0].listing.title, "Kitnet mobiliada");
}

#[tokio::test]
async fn carousel_is_empty_without_featured_listings() {
    let store = FixtureMarketStore::empty();
    let catalog = Catalog::new(&store);
    assert!(catalog.featured_carousel().await.unwrap().is_empty());
}
