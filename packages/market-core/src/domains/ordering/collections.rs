//! Adapters binding the generic ordering engine to the persistence gateway.

use async_trait::async_trait;

use crate::common::{CategoryId, CoreResult, ListingId, MenuItemId, PhotoId};
use crate::domains::listings::models::Photo;
use crate::domains::navigation::{Category, MenuItem};
use crate::store::BaseMarketStore;

use super::{OrderAssignment, Orderable, OrderedCollection};

impl Orderable for Category {
    fn sequence_id(&self) -> i64 {
        self.id.as_i64()
    }
    fn sequence_order(&self) -> i32 {
        self.display_order
    }
}

impl Orderable for MenuItem {
    fn sequence_id(&self) -> i64 {
        self.id.as_i64()
    }
    fn sequence_order(&self) -> i32 {
        self.display_order
    }
}

impl Orderable for Photo {
    fn sequence_id(&self) -> i64 {
        self.id.as_i64()
    }
    fn sequence_order(&self) -> i32 {
        self.position
    }
}

pub struct CategoryCollection<'a> {
    pub store: &'a dyn BaseMarketStore,
}

#[async_trait]
impl OrderedCollection for CategoryCollection<'_> {
    type Item = Category;

    fn label(&self) -> &'static str {
        "category reorder"
    }

    async fn fetch(&self) -> CoreResult<Vec<Category>> {
        self.store.list_categories().await
    }

    async fn persist(&self, plan: &[OrderAssignment]) -> CoreResult<()> {
        let rows: Vec<(CategoryId, i32)> = plan
            .iter()
            .map(|a| (CategoryId::new(a.id), a.display_order))
            .collect();
        self.store.persist_category_order(&rows).await
    }
}

pub struct MenuCollection<'a> {
    pub store: &'a dyn BaseMarketStore,
}

#[async_trait]
impl OrderedCollection for MenuCollection<'_> {
    type Item = MenuItem;

    fn label(&self) -> &'static str {
        "menu reorder"
    }

    async fn fetch(&self) -> CoreResult<Vec<MenuItem>> {
        self.store.list_menu_items().await
    }

    async fn persist(&self, plan: &[OrderAssignment]) -> CoreResult<()> {
        let rows: Vec<(MenuItemId, i32)> = plan
            .iter()
            .map(|a| (MenuItemId::new(a.id), a.display_order))
            .collect();
        self.store.persist_menu_order(&rows).await
    }
}

/// A single listing's photo set. Slot 0 carries the primary flag.
pub struct PhotoCollection<'a> {
    pub store: &'a dyn BaseMarketStore,
    pub listing: ListingId,
}

#[async_trait]
impl OrderedCollection for PhotoCollection<'_> {
    type Item = Photo;

    fn label(&self) -> &'static str {
        "photo reorder"
    }

    async fn fetch(&self) -> CoreResult<Vec<Photo>> {
        self.store.list_photos(self.listing).await
    }

    async fn persist(&self, plan: &[OrderAssignment]) -> CoreResult<()> {
        let rows: Vec<(PhotoId, i32, bool)> = plan
            .iter()
            .map(|a| (PhotoId::new(a.id), a.display_order, a.display_order == 0))
            .collect();
        self.store.persist_photo_order(self.listing, &rows).await
    }
}
