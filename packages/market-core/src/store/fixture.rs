//! Demo fixture provider: the in-memory data source.
//!
//! Holds a fixed, pre-seeded snapshot of representative condominium data for
//! the lifetime of the session. Serves exactly the same contract and filter
//! semantics as the live store; `create`/`update`/`delete` mutate only the
//! in-memory copy and never reach the remote store. Selection between this
//! and Postgres happens once at startup ([`crate::kernel::CoreDeps`]).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;

use crate::common::{
    CategoryId, CoreError, CoreResult, ListingId, MenuItemId, PhotoId, ProfileId,
};
use crate::domains::listings::models::{
    Deal, Listing, ListingKind, ListingPatch, ListingStatus, NewListing, NewPhoto, Photo,
    PropertyDetails,
};
use crate::domains::navigation::{
    Category, CategoryPatch, MenuItem, MenuItemPatch, NewCategory, NewMenuItem,
};
use crate::kernel::BaseObjectStorage;

use super::{BaseMarketStore, ListingFilter, Profile};

#[derive(Default)]
struct FixtureData {
    next_id: i64,
    categories: Vec<Category>,
    menu_items: Vec<MenuItem>,
    listings: Vec<Listing>,
    photos: Vec<Photo>,
    featured: Vec<ListingId>,
    profiles: Vec<Profile>,
}

impl FixtureData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct FixtureMarketStore {
    data: RwLock<FixtureData>,
    fail_photo_writes: Mutex<bool>,
    fail_content_writes: Mutex<bool>,
}

impl FixtureMarketStore {
    /// An empty in-memory store. Used by tests that build their own state
    /// through the domain operations.
    pub fn empty() -> Self {
        Self {
            data: RwLock::new(FixtureData {
                next_id: 0,
                ..Default::default()
            }),
            fail_photo_writes: Mutex::new(false),
            fail_content_writes: Mutex::new(false),
        }
    }

    /// Make `replace_photos` refuse every write, for exercising commit
    /// failure handling.
    pub fn with_failing_photo_writes(self) -> Self {
        *self.fail_photo_writes.lock().unwrap() = true;
        self
    }

    /// Make `update_listing_content` refuse every write.
    pub fn with_failing_content_writes(self) -> Self {
        *self.fail_content_writes.lock().unwrap() = true;
        self
    }

    /// The demo dataset: categories, a navigation menu, a handful of
    /// service and property listings in every moderation state, and a
    /// featured carousel.
    pub fn seeded() -> Self {
        let store = Self::empty();
        {
            let mut data = store.data.try_write().expect("new store is uncontended");
            seed(&mut data);
        }
        store
    }

    /// Register a resident profile (demo seeding and tests).
    pub async fn add_profile(&self, profile: Profile) {
        self.data.write().await.profiles.push(profile);
    }
}

#[async_trait]
impl BaseMarketStore for FixtureMarketStore {
    // -- Categories ---------------------------------------------------------

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let data = self.data.read().await;
        let mut out = data.categories.clone();
        out.sort_by_key(|c| c.display_order);
        Ok(out)
    }

    async fn get_category(&self, id: CategoryId) -> CoreResult<Option<Category>> {
        let data = self.data.read().await;
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, new: NewCategory, display_order: i32) -> CoreResult<Category> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(data.next_id()),
            name: new.name,
            icon: new.icon,
            display_order,
            created_at: now,
            updated_at: now,
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> CoreResult<Category> {
        let mut data = self.data.write().await;
        let category = data
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("category", id))?;
        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.categories.len();
        data.categories.retain(|c| c.id != id);
        if data.categories.len() == before {
            return Err(CoreError::not_found("category", id));
        }
        Ok(())
    }

    async fn persist_category_order(&self, plan: &[(CategoryId, i32)]) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        for (id, order) in plan {
            let category = data
                .categories
                .iter_mut()
                .find(|c| c.id == *id)
                .ok_or_else(|| CoreError::not_found("category", *id))?;
            category.display_order = *order;
            category.updated_at = now;
        }
        Ok(())
    }

    // -- Menu items ---------------------------------------------------------

    async fn list_menu_items(&self) -> CoreResult<Vec<MenuItem>> {
        let data = self.data.read().await;
        let mut out = data.menu_items.clone();
        out.sort_by_key(|m| m.display_order);
        Ok(out)
    }

    async fn get_menu_item(&self, id: MenuItemId) -> CoreResult<Option<MenuItem>> {
        let data = self.data.read().await;
        Ok(data.menu_items.iter().find(|m| m.id == id).cloned())
    }

    async fn create_menu_item(
        &self,
        new: NewMenuItem,
        display_order: i32,
    ) -> CoreResult<MenuItem> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let item = MenuItem {
            id: MenuItemId::new(data.next_id()),
            label: new.label,
            path: new.path,
            visible: new.visible,
            display_order,
            created_at: now,
            updated_at: now,
        };
        data.menu_items.push(item.clone());
        Ok(item)
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> CoreResult<MenuItem> {
        let mut data = self.data.write().await;
        let item = data
            .menu_items
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::not_found("menu item", id))?;
        if let Some(label) = patch.label {
            item.label = label;
        }
        if let Some(path) = patch.path {
            item.path = path;
        }
        if let Some(visible) = patch.visible {
            item.visible = visible;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.menu_items.len();
        data.menu_items.retain(|m| m.id != id);
        if data.menu_items.len() == before {
            return Err(CoreError::not_found("menu item", id));
        }
        Ok(())
    }

    async fn persist_menu_order(&self, plan: &[(MenuItemId, i32)]) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        for (id, order) in plan {
            let item = data
                .menu_items
                .iter_mut()
                .find(|m| m.id == *id)
                .ok_or_else(|| CoreError::not_found("menu item", *id))?;
            item.display_order = *order;
            item.updated_at = now;
        }
        Ok(())
    }

    // -- Listings -----------------------------------------------------------

    async fn list_listings(&self, filter: ListingFilter) -> CoreResult<Vec<Listing>> {
        let data = self.data.read().await;
        let mut out: Vec<Listing> = data
            .listings
            .iter()
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .filter(|l| filter.kind.map_or(true, |k| l.kind == k))
            .filter(|l| filter.category.map_or(true, |c| l.category == Some(c)))
            .filter(|l| filter.owner.map_or(true, |o| l.owner == o))
            .filter(|l| {
                filter
                    .ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&l.id))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let out: Vec<Listing> = out.into_iter().skip(offset).collect();
        Ok(match filter.limit {
            Some(limit) => out.into_iter().take(limit.max(0) as usize).collect(),
            None => out,
        })
    }

    async fn get_listing(&self, id: ListingId) -> CoreResult<Option<Listing>> {
        let data = self.data.read().await;
        Ok(data.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn create_listing(&self, new: NewListing) -> CoreResult<Listing> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let listing = Listing {
            id: ListingId::new(data.next_id()),
            owner: new.owner,
            kind: new.kind,
            category: new.category,
            title: new.title,
            description: new.description,
            whatsapp: new.whatsapp,
            status: ListingStatus::Pending,
            rejection_reason: None,
            property: new.property,
            created_at: now,
            updated_at: now,
        };
        data.listings.push(listing.clone());
        Ok(listing)
    }

    async fn update_listing_content(
        &self,
        id: ListingId,
        patch: ListingPatch,
    ) -> CoreResult<Listing> {
        if *self.fail_content_writes.lock().unwrap() {
            return Err(CoreError::Upstream(
                "listing content write refused".to_string(),
            ));
        }
        let mut data = self.data.write().await;
        let listing = data
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::not_found("listing", id))?;
        if let Some(title) = patch.title {
            listing.title = title;
        }
        if let Some(description) = patch.description {
            listing.description = description;
        }
        if let Some(whatsapp) = patch.whatsapp {
            listing.whatsapp = whatsapp;
        }
        if let Some(category) = patch.category {
            listing.category = category;
        }
        if let Some(property) = patch.property {
            listing.property = Some(property);
        }
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
        rejection_reason: Option<String>,
    ) -> CoreResult<Listing> {
        let mut data = self.data.write().await;
        let listing = data
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::not_found("listing", id))?;
        listing.status = status;
        listing.rejection_reason = rejection_reason;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: ListingId) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.listings.len();
        data.listings.retain(|l| l.id != id);
        if data.listings.len() == before {
            return Err(CoreError::not_found("listing", id));
        }
        // Cascade to the photo records and the featured set.
        data.photos.retain(|p| p.listing_id != id);
        data.featured.retain(|f| *f != id);
        Ok(())
    }

    async fn clear_category_refs(&self, category: CategoryId) -> CoreResult<u64> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let mut detached = 0;
        for listing in data
            .listings
            .iter_mut()
            .filter(|l| l.category == Some(category))
        {
            listing.category = None;
            listing.updated_at = now;
            detached += 1;
        }
        Ok(detached)
    }

    // -- Photos -------------------------------------------------------------

    async fn list_photos(&self, listing: ListingId) -> CoreResult<Vec<Photo>> {
        let data = self.data.read().await;
        let mut out: Vec<Photo> = data
            .photos
            .iter()
            .filter(|p| p.listing_id == listing)
            .cloned()
            .collect();
        out.sort_by_key(|p| p.position);
        Ok(out)
    }

    async fn replace_photos(
        &self,
        listing: ListingId,
        photos: &[NewPhoto],
    ) -> CoreResult<Vec<Photo>> {
        if *self.fail_photo_writes.lock().unwrap() {
            return Err(CoreError::Upstream("photo record write refused".to_string()));
        }
        let mut data = self.data.write().await;
        if !data.listings.iter().any(|l| l.id == listing) {
            return Err(CoreError::not_found("listing", listing));
        }

        data.photos.retain(|p| p.listing_id != listing);
        let now = Utc::now();
        let mut created = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            let record = Photo {
                id: PhotoId::new(data.next_id()),
                listing_id: listing,
                url: photo.url.clone(),
                is_primary: index == 0,
                position: index as i32,
                created_at: now,
            };
            data.photos.push(record.clone());
            created.push(record);
        }
        if let Some(owner) = data.listings.iter_mut().find(|l| l.id == listing) {
            owner.updated_at = now;
        }
        Ok(created)
    }

    async fn delete_photo(&self, listing: ListingId, id: PhotoId) -> CoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.photos.len();
        data.photos.retain(|p| !(p.listing_id == listing && p.id == id));
        if data.photos.len() == before {
            return Err(CoreError::not_found("photo", id));
        }
        Ok(())
    }

    async fn persist_photo_order(
        &self,
        listing: ListingId,
        plan: &[(PhotoId, i32, bool)],
    ) -> CoreResult<()> {
        let mut data = self.data.write().await;
        for (id, position, is_primary) in plan {
            let photo = data
                .photos
                .iter_mut()
                .find(|p| p.listing_id == listing && p.id == *id)
                .ok_or_else(|| CoreError::not_found("photo", *id))?;
            photo.position = *position;
            photo.is_primary = *is_primary;
        }
        Ok(())
    }

    // -- Featured selection -------------------------------------------------

    async fn featured_ids(&self) -> CoreResult<Vec<ListingId>> {
        Ok(self.data.read().await.featured.clone())
    }

    async fn add_featured(&self, id: ListingId) -> CoreResult<()> {
        let mut data = self.data.write().await;
        if !data.featured.contains(&id) {
            data.featured.push(id);
        }
        Ok(())
    }

    async fn remove_featured(&self, id: ListingId) -> CoreResult<()> {
        self.data.write().await.featured.retain(|f| *f != id);
        Ok(())
    }

    // -- Profiles -----------------------------------------------------------

    async fn get_profiles(&self, ids: &[ProfileId]) -> CoreResult<Vec<Profile>> {
        let data = self.data.read().await;
        Ok(data
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Demo object storage
// =============================================================================

/// In-memory object storage for demo mode: uploads never leave the process
/// and produce `demo://` URLs.
#[derive(Default)]
pub struct FixtureObjectStorage {
    objects: Mutex<HashMap<String, usize>>,
}

impl FixtureObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseObjectStorage for FixtureObjectStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> CoreResult<String> {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), bytes.len());
        Ok(format!("demo://{bucket}/{key}"))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> CoreResult<()> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&format!("{bucket}/{key}"));
        }
        Ok(())
    }
}

// =============================================================================
// Seed data
// =============================================================================

fn seed(data: &mut FixtureData) {
    let now = Utc::now();
    let ana = ProfileId::random();
    let carlos = ProfileId::random();
    data.profiles = vec![
        Profile {
            id: ana,
            unit_label: "Bloco A, Apto 31".to_string(),
            display_name: "Ana".to_string(),
        },
        Profile {
            id: carlos,
            unit_label: "Bloco C, Apto 104".to_string(),
            display_name: "Carlos".to_string(),
        },
    ];

    for (order, (name, icon)) in [("Limpeza", "🧹"), ("Reparos", "🔧"), ("Aulas", "📚")]
        .into_iter()
        .enumerate()
    {
        let id = CategoryId::new(data.next_id());
        data.categories.push(Category {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
            display_order: order as i32,
            created_at: now,
            updated_at: now,
        });
    }
    let limpeza = data.categories[0].id;

    for (order, (label, path, visible)) in [
        ("Início", "/", true),
        ("Serviços", "/servicos", true),
        ("Imóveis", "/imoveis", true),
        ("Contato", "/contato", false),
    ]
    .into_iter()
    .enumerate()
    {
        let id = MenuItemId::new(data.next_id());
        data.menu_items.push(MenuItem {
            id,
            label: label.to_string(),
            path: path.to_string(),
            visible,
            display_order: order as i32,
            created_at: now,
            updated_at: now,
        });
    }

    // Listings across all moderation states, staggered creation times so
    // newest-first ordering is observable.
    let add_listing = |data: &mut FixtureData,
                       owner: ProfileId,
                       kind: ListingKind,
                       category: Option<CategoryId>,
                       title: &str,
                       status: ListingStatus,
                       reason: Option<&str>,
                       property: Option<PropertyDetails>,
                       age_hours: i64| {
        let id = ListingId::new(data.next_id());
        let created = now - Duration::hours(age_hours);
        data.listings.push(Listing {
            id,
            owner,
            kind,
            category,
            title: title.to_string(),
            description: format!("{title} — anúncio de demonstração."),
            whatsapp: "5511987654321".to_string(),
            status,
            rejection_reason: reason.map(str::to_string),
            property,
            created_at: created,
            updated_at: created,
        });
        id
    };

    let faxina = add_listing(
        data,
        ana,
        ListingKind::Service,
        Some(limpeza),
        "Faxina completa",
        ListingStatus::Approved,
        None,
        None,
        72,
    );
    add_listing(
        data,
        carlos,
        ListingKind::Service,
        Some(limpeza),
        "Passadoria semanal",
        ListingStatus::Pending,
        None,
        None,
        10,
    );
    let venda = add_listing(
        data,
        carlos,
        ListingKind::Property,
        None,
        "Apartamento 2 quartos, andar alto",
        ListingStatus::Approved,
        None,
        Some(PropertyDetails {
            deal: Deal::Venda,
            price: "R$ 450.000".to_string(),
            bedrooms: 2,
            garage_covered: true,
            is_renovated: true,
        }),
        48,
    );
    let aluguel = add_listing(
        data,
        ana,
        ListingKind::Property,
        None,
        "Kitnet mobiliada",
        ListingStatus::Approved,
        None,
        Some(PropertyDetails {
            deal: Deal::Aluguel,
            price: "R$ 1.800/mês".to_string(),
            bedrooms: 1,
            garage_covered: false,
            is_renovated: false,
        }),
        24,
    );
    add_listing(
        data,
        carlos,
        ListingKind::Property,
        None,
        "Vaga de garagem",
        ListingStatus::Rejected,
        Some("Anúncio sem fotos nem descrição da vaga"),
        Some(PropertyDetails {
            deal: Deal::Aluguel,
            price: "a combinar".to_string(),
            bedrooms: 0,
            garage_covered: true,
            is_renovated: false,
        }),
        5,
    );

    for (listing, count) in [(faxina, 1), (venda, 3), (aluguel, 2)] {
        for index in 0..count {
            let id = PhotoId::new(data.next_id());
            data.photos.push(Photo {
                id,
                listing_id: listing,
                url: format!("demo://listing-photos/seed/{listing}/{index}.jpg"),
                is_primary: index == 0,
                position: index,
                created_at: now,
            });
        }
    }

    data.featured = vec![venda, aluguel];
}
