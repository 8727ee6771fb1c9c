// Persistence gateway: the dual-source data layer.
//
// `BaseMarketStore` is the single read/write contract served by both
// implementations: `PgMarketStore` against the live Postgres store and
// `FixtureMarketStore`, an in-memory demo dataset. Business components only
// ever see the trait, which is what makes demo mode and live mode
// behaviorally indistinguishable to callers.

pub mod fixture;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{CategoryId, CoreResult, ListingId, MenuItemId, PhotoId, ProfileId};
use crate::domains::listings::models::{
    Listing, ListingPatch, ListingStatus, NewListing, NewPhoto, Photo,
};
use crate::domains::listings::ListingKind;
use crate::domains::navigation::{
    Category, CategoryPatch, MenuItem, MenuItemPatch, NewCategory, NewMenuItem,
};

pub use fixture::{FixtureMarketStore, FixtureObjectStorage};
pub use postgres::PgMarketStore;

/// A resident profile, read for denormalization only: the auth collaborator
/// owns this data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// Condominium unit ("Bloco B, Apto 72").
    pub unit_label: String,
    pub display_name: String,
}

/// Read filter for listing queries. All criteria are conjunctive; both
/// stores apply exactly the same semantics.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub kind: Option<ListingKind>,
    pub category: Option<CategoryId>,
    pub owner: Option<ProfileId>,
    pub ids: Option<Vec<ListingId>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListingFilter {
    pub fn status(mut self, status: ListingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: ListingKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn owner(mut self, owner: ProfileId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn ids(mut self, ids: Vec<ListingId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// The persistence gateway contract.
///
/// Every method returns a categorized error; no business component assumes
/// success. Mutations advance `updated_at` on the touched record. Sequence
/// persistence methods write the given `(id, display_order)` assignments;
/// the live store applies them per row and reports a partial failure when a
/// mid-batch write fails.
#[async_trait]
pub trait BaseMarketStore: Send + Sync {
    // -- Categories ---------------------------------------------------------

    /// All categories, ordered by `display_order`.
    async fn list_categories(&self) -> CoreResult<Vec<Category>>;
    async fn get_category(&self, id: CategoryId) -> CoreResult<Option<Category>>;
    async fn create_category(&self, new: NewCategory, display_order: i32) -> CoreResult<Category>;
    async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> CoreResult<Category>;
    async fn delete_category(&self, id: CategoryId) -> CoreResult<()>;
    async fn persist_category_order(&self, plan: &[(CategoryId, i32)]) -> CoreResult<()>;

    // -- Menu items ---------------------------------------------------------

    /// All menu entries (visible or not), ordered by `display_order`.
    async fn list_menu_items(&self) -> CoreResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: MenuItemId) -> CoreResult<Option<MenuItem>>;
    async fn create_menu_item(&self, new: NewMenuItem, display_order: i32)
        -> CoreResult<MenuItem>;
    async fn update_menu_item(&self, id: MenuItemId, patch: MenuItemPatch)
        -> CoreResult<MenuItem>;
    async fn delete_menu_item(&self, id: MenuItemId) -> CoreResult<()>;
    async fn persist_menu_order(&self, plan: &[(MenuItemId, i32)]) -> CoreResult<()>;

    // -- Listings -----------------------------------------------------------

    /// Listings matching the filter, newest first.
    async fn list_listings(&self, filter: ListingFilter) -> CoreResult<Vec<Listing>>;
    async fn get_listing(&self, id: ListingId) -> CoreResult<Option<Listing>>;
    async fn create_listing(&self, new: NewListing) -> CoreResult<Listing>;
    async fn update_listing_content(
        &self,
        id: ListingId,
        patch: ListingPatch,
    ) -> CoreResult<Listing>;
    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
        rejection_reason: Option<String>,
    ) -> CoreResult<Listing>;
    /// Deletes the listing and cascades to its photo records.
    async fn delete_listing(&self, id: ListingId) -> CoreResult<()>;
    /// Null out the category reference on every listing pointing at
    /// `category`; returns how many were detached.
    async fn clear_category_refs(&self, category: CategoryId) -> CoreResult<u64>;

    // -- Photos -------------------------------------------------------------

    /// A listing's photos, ordered by position.
    async fn list_photos(&self, listing: ListingId) -> CoreResult<Vec<Photo>>;
    /// Replace the listing's photo set with `photos`, in order; index 0 is
    /// recorded as primary.
    async fn replace_photos(
        &self,
        listing: ListingId,
        photos: &[NewPhoto],
    ) -> CoreResult<Vec<Photo>>;
    async fn delete_photo(&self, listing: ListingId, id: PhotoId) -> CoreResult<()>;
    /// `(photo id, position, is_primary)` assignments.
    async fn persist_photo_order(
        &self,
        listing: ListingId,
        plan: &[(PhotoId, i32, bool)],
    ) -> CoreResult<()>;

    // -- Featured selection -------------------------------------------------

    /// Featured listing ids in insertion order.
    async fn featured_ids(&self) -> CoreResult<Vec<ListingId>>;
    async fn add_featured(&self, id: ListingId) -> CoreResult<()>;
    /// Idempotent; removing an absent id is not an error.
    async fn remove_featured(&self, id: ListingId) -> CoreResult<()>;

    // -- Profiles -----------------------------------------------------------

    async fn get_profiles(&self, ids: &[ProfileId]) -> CoreResult<Vec<Profile>>;
}
