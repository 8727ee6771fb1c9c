// Listing catalog facade: read-only composed views.
//
// Queries the active data source (live or demo, behind the same trait) and
// denormalizes owner and category references into each returned record.
// Filtering logic lives here once, so demo-mode and live-mode views are
// behaviorally indistinguishable to callers. Never mutates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::{CategoryId, CoreResult, ListingId, ProfileId};
use crate::domains::listings::models::{Listing, ListingKind, ListingStatus, Photo};
use crate::store::{BaseMarketStore, ListingFilter, Profile};

/// Limit/offset page. Defaults to the first 20 records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// A listing denormalized for presentation: photos in canonical order,
/// owner summary and category name resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingView {
    pub listing: Listing,
    pub photos: Vec<Photo>,
    pub owner: Option<Profile>,
    pub category_name: Option<String>,
}

impl ListingView {
    /// The representative image, when the listing has any photo.
    pub fn primary_photo(&self) -> Option<&Photo> {
        self.photos.first()
    }
}

pub struct Catalog<'a> {
    store: &'a dyn BaseMarketStore,
}

impl<'a> Catalog<'a> {
    pub fn new(store: &'a dyn BaseMarketStore) -> Self {
        Self { store }
    }

    /// Approved listings, optionally narrowed to one kind. The public
    /// storefront view.
    pub async fn approved(&self, kind: Option<ListingKind>, page: Page) -> CoreResult<Vec<ListingView>> {
        let mut filter = ListingFilter::default()
            .status(ListingStatus::Approved)
            .page(page.limit, page.offset);
        filter.kind = kind;
        self.hydrate(self.store.list_listings(filter).await?).await
    }

    /// Approved service listings in one category.
    pub async fn approved_in_category(
        &self,
        category: CategoryId,
        page: Page,
    ) -> CoreResult<Vec<ListingView>> {
        let filter = ListingFilter::default()
            .status(ListingStatus::Approved)
            .kind(ListingKind::Service)
            .category(category)
            .page(page.limit, page.offset);
        self.hydrate(self.store.list_listings(filter).await?).await
    }

    /// Everything a resident owns, regardless of status; rejected listings
    /// come back with their rejection reason for the owner to read.
    pub async fn owned_by(&self, owner: ProfileId) -> CoreResult<Vec<ListingView>> {
        let filter = ListingFilter::default().owner(owner);
        self.hydrate(self.store.list_listings(filter).await?).await
    }

    /// The admin review queue: pending listings, newest first like every
    /// other list.
    pub async fn pending_review(&self, page: Page) -> CoreResult<Vec<ListingView>> {
        let filter = ListingFilter::default()
            .status(ListingStatus::Pending)
            .page(page.limit, page.offset);
        self.hydrate(self.store.list_listings(filter).await?).await
    }

    /// Homepage carousel: featured listings in insertion order, filtered to
    /// those still approved.
    pub async fn featured_carousel(&self) -> CoreResult<Vec<ListingView>> {
        let ids = self.store.featured_ids().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = ListingFilter::default()
            .status(ListingStatus::Approved)
            .ids(ids.clone());
        let listings = self.store.list_listings(filter).await?;

        // Preserve curation (insertion) order, not list order.
        let by_id: HashMap<ListingId, Listing> =
            listings.into_iter().map(|l| (l.id, l)).collect();
        let ordered: Vec<Listing> = ids.into_iter().filter_map(|id| by_id.get(&id).cloned()).collect();
        self.hydrate(ordered).await
    }

    async fn hydrate(&self, listings: Vec<Listing>) -> CoreResult<Vec<ListingView>> {
        let mut owner_ids: Vec<ProfileId> = listings.iter().map(|l| l.owner).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners: HashMap<ProfileId, Profile> = self
            .store
            .get_profiles(&owner_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let categories: HashMap<CategoryId, String> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut views = Vec::with_capacity(listings.len());
        for listing in listings {
            let photos = self.store.list_photos(listing.id).await?;
            let owner = owners.get(&listing.owner).cloned();
            let category_name = listing
                .category
                .and_then(|id| categories.get(&id).cloned());
            views.push(ListingView {
                listing,
                photos,
                owner,
                category_name,
            });
        }
        Ok(views)
    }
}
