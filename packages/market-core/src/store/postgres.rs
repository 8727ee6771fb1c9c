//! Live persistence gateway against the remote Postgres store.
//!
//! All SQL lives here, next to the wire-shaped `*Row` structs it produces.
//! Each entity has exactly one normalization function from its row to the
//! domain type, so no business component ever branches on raw field shapes.
//!
//! Order persistence is deliberately per-row: a mid-batch failure surfaces
//! as a partial-failure error carrying applied/total counts, which the
//! ordering engine turns into a canonical re-fetch. Photo set replacement, by
//! contrast, runs in a transaction: the record layer is strict even though
//! object storage is not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

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

use super::{BaseMarketStore, ListingFilter, Profile};

pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Wire rows and normalization
// =============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    icon: String,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn category_from_row(row: CategoryRow) -> Category {
    Category {
        id: CategoryId::new(row.id),
        name: row.name,
        icon: row.icon,
        display_order: row.display_order,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    label: String,
    path: String,
    visible: bool,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn menu_item_from_row(row: MenuItemRow) -> MenuItem {
    MenuItem {
        id: MenuItemId::new(row.id),
        label: row.label,
        path: row.path,
        visible: row.visible,
        display_order: row.display_order,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    owner_id: Uuid,
    kind: String,
    category_id: Option<i64>,
    title: String,
    description: String,
    whatsapp: String,
    status: String,
    rejection_reason: Option<String>,
    deal: Option<String>,
    price: Option<String>,
    bedrooms: Option<i32>,
    garage_covered: Option<bool>,
    is_renovated: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn listing_from_row(row: ListingRow) -> CoreResult<Listing> {
    let kind = ListingKind::from_str(&row.kind)
        .map_err(|e| CoreError::Upstream(format!("malformed listing record: {e}")))?;
    let status = ListingStatus::from_str(&row.status)
        .map_err(|e| CoreError::Upstream(format!("malformed listing record: {e}")))?;
    let property = match row.deal {
        Some(deal) => Some(PropertyDetails {
            deal: Deal::from_str(&deal)
                .map_err(|e| CoreError::Upstream(format!("malformed listing record: {e}")))?,
            price: row.price.unwrap_or_default(),
            bedrooms: row.bedrooms.unwrap_or(0),
            garage_covered: row.garage_covered.unwrap_or(false),
            is_renovated: row.is_renovated.unwrap_or(false),
        }),
        None => None,
    };

    Ok(Listing {
        id: ListingId::new(row.id),
        owner: ProfileId::from(row.owner_id),
        kind,
        category: row.category_id.map(CategoryId::new),
        title: row.title,
        description: row.description,
        whatsapp: row.whatsapp,
        status,
        rejection_reason: row.rejection_reason,
        property,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(sqlx::FromRow)]
struct PhotoRow {
    id: i64,
    listing_id: i64,
    photo_url: String,
    is_primary: bool,
    position: i32,
    created_at: DateTime<Utc>,
}

fn photo_from_row(row: PhotoRow) -> Photo {
    Photo {
        id: PhotoId::new(row.id),
        listing_id: ListingId::new(row.listing_id),
        url: row.photo_url,
        is_primary: row.is_primary,
        position: row.position,
        created_at: row.created_at,
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    unit_label: String,
    display_name: String,
}

fn profile_from_row(row: ProfileRow) -> Profile {
    Profile {
        id: ProfileId::from(row.id),
        unit_label: row.unit_label,
        display_name: row.display_name,
    }
}

// =============================================================================
// Gateway implementation
// =============================================================================

#[async_trait]
impl BaseMarketStore for PgMarketStore {
    // -- Categories ---------------------------------------------------------

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT * FROM categories ORDER BY display_order",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(category_from_row).collect())
    }

    async fn get_category(&self, id: CategoryId) -> CoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(category_from_row))
    }

    async fn create_category(&self, new: NewCategory, display_order: i32) -> CoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, icon, display_order)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(new.name)
        .bind(new.icon)
        .bind(display_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(category_from_row(row))
    }

    async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> CoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(patch.name)
        .bind(patch.icon)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("category", id))?;
        Ok(category_from_row(row))
    }

    async fn delete_category(&self, id: CategoryId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("category", id));
        }
        Ok(())
    }

    async fn persist_category_order(&self, plan: &[(CategoryId, i32)]) -> CoreResult<()> {
        for (applied, (id, order)) in plan.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE categories SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id.as_i64())
            .bind(order)
            .execute(&self.pool)
            .await;
            if result.is_err() || matches!(result, Ok(ref r) if r.rows_affected() == 0) {
                return Err(CoreError::Partial {
                    operation: "category reorder",
                    applied,
                    total: plan.len(),
                });
            }
        }
        Ok(())
    }

    // -- Menu items ---------------------------------------------------------

    async fn list_menu_items(&self) -> CoreResult<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItemRow>(
            "SELECT * FROM menu_items ORDER BY display_order",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(menu_item_from_row).collect())
    }

    async fn get_menu_item(&self, id: MenuItemId) -> CoreResult<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuItemRow>("SELECT * FROM menu_items WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(menu_item_from_row))
    }

    async fn create_menu_item(
        &self,
        new: NewMenuItem,
        display_order: i32,
    ) -> CoreResult<MenuItem> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r#"
            INSERT INTO menu_items (label, path, visible, display_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.label)
        .bind(new.path)
        .bind(new.visible)
        .bind(display_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(menu_item_from_row(row))
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> CoreResult<MenuItem> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r#"
            UPDATE menu_items
            SET label = COALESCE($2, label),
                path = COALESCE($3, path),
                visible = COALESCE($4, visible),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(patch.label)
        .bind(patch.path)
        .bind(patch.visible)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("menu item", id))?;
        Ok(menu_item_from_row(row))
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("menu item", id));
        }
        Ok(())
    }

    async fn persist_menu_order(&self, plan: &[(MenuItemId, i32)]) -> CoreResult<()> {
        for (applied, (id, order)) in plan.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE menu_items SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id.as_i64())
            .bind(order)
            .execute(&self.pool)
            .await;
            if result.is_err() || matches!(result, Ok(ref r) if r.rows_affected() == 0) {
                return Err(CoreError::Partial {
                    operation: "menu reorder",
                    applied,
                    total: plan.len(),
                });
            }
        }
        Ok(())
    }

    // -- Listings -----------------------------------------------------------

    async fn list_listings(&self, filter: ListingFilter) -> CoreResult<Vec<Listing>> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM listings WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind.to_string());
        }
        if let Some(category) = filter.category {
            qb.push(" AND category_id = ").push_bind(category.as_i64());
        }
        if let Some(owner) = filter.owner {
            qb.push(" AND owner_id = ").push_bind(*owner.as_uuid());
        }
        if let Some(ref ids) = filter.ids {
            let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
            qb.push(" AND id = ANY(").push_bind(raw).push(")");
        }
        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(offset);
        }

        let rows: Vec<ListingRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(listing_from_row).collect()
    }

    async fn get_listing(&self, id: ListingId) -> CoreResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM listings WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.map(listing_from_row).transpose()
    }

    async fn create_listing(&self, new: NewListing) -> CoreResult<Listing> {
        let property = new.property;
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            INSERT INTO listings (
                owner_id, kind, category_id, title, description, whatsapp,
                status, deal, price, bedrooms, garage_covered, is_renovated
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(*new.owner.as_uuid())
        .bind(new.kind.to_string())
        .bind(new.category.map(|c| c.as_i64()))
        .bind(new.title)
        .bind(new.description)
        .bind(new.whatsapp)
        .bind(property.as_ref().map(|p| p.deal.to_string()))
        .bind(property.as_ref().map(|p| p.price.clone()))
        .bind(property.as_ref().map(|p| p.bedrooms))
        .bind(property.as_ref().map(|p| p.garage_covered))
        .bind(property.as_ref().map(|p| p.is_renovated))
        .fetch_one(&self.pool)
        .await?;
        listing_from_row(row)
    }

    async fn update_listing_content(
        &self,
        id: ListingId,
        patch: ListingPatch,
    ) -> CoreResult<Listing> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE listings SET updated_at = NOW()");
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(whatsapp) = patch.whatsapp {
            qb.push(", whatsapp = ").push_bind(whatsapp);
        }
        if let Some(category) = patch.category {
            qb.push(", category_id = ")
                .push_bind(category.map(|c| c.as_i64()));
        }
        if let Some(property) = patch.property {
            qb.push(", deal = ").push_bind(property.deal.to_string());
            qb.push(", price = ").push_bind(property.price);
            qb.push(", bedrooms = ").push_bind(property.bedrooms);
            qb.push(", garage_covered = ").push_bind(property.garage_covered);
            qb.push(", is_renovated = ").push_bind(property.is_renovated);
        }
        qb.push(" WHERE id = ").push_bind(id.as_i64());
        qb.push(" RETURNING *");

        let row: Option<ListingRow> = qb.build_query_as().fetch_optional(&self.pool).await?;
        listing_from_row(row.ok_or_else(|| CoreError::not_found("listing", id))?)
    }

    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
        rejection_reason: Option<String>,
    ) -> CoreResult<Listing> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            UPDATE listings
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(status.to_string())
        .bind(rejection_reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("listing", id))?;
        listing_from_row(row)
    }

    async fn delete_listing(&self, id: ListingId) -> CoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM listing_photos WHERE listing_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM featured_listings WHERE listing_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("listing", id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_category_refs(&self, category: CategoryId) -> CoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET category_id = NULL, updated_at = NOW()
            WHERE category_id = $1
            "#,
        )
        .bind(category.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // -- Photos -------------------------------------------------------------

    async fn list_photos(&self, listing: ListingId) -> CoreResult<Vec<Photo>> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            "SELECT * FROM listing_photos WHERE listing_id = $1 ORDER BY position",
        )
        .bind(listing.as_i64())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(photo_from_row).collect())
    }

    async fn replace_photos(
        &self,
        listing: ListingId,
        photos: &[NewPhoto],
    ) -> CoreResult<Vec<Photo>> {
        // Strict at the record layer: the whole replacement commits or none
        // of it does.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM listing_photos WHERE listing_id = $1")
            .bind(listing.as_i64())
            .execute(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            let row = sqlx::query_as::<_, PhotoRow>(
                r#"
                INSERT INTO listing_photos (listing_id, photo_url, is_primary, position)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(listing.as_i64())
            .bind(&photo.url)
            .bind(index == 0)
            .bind(index as i32)
            .fetch_one(&mut *tx)
            .await?;
            created.push(photo_from_row(row));
        }

        let touched = sqlx::query("UPDATE listings SET updated_at = NOW() WHERE id = $1")
            .bind(listing.as_i64())
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(CoreError::not_found("listing", listing));
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn delete_photo(&self, listing: ListingId, id: PhotoId) -> CoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM listing_photos WHERE listing_id = $1 AND id = $2",
        )
        .bind(listing.as_i64())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("photo", id));
        }
        Ok(())
    }

    async fn persist_photo_order(
        &self,
        listing: ListingId,
        plan: &[(PhotoId, i32, bool)],
    ) -> CoreResult<()> {
        for (applied, (id, position, is_primary)) in plan.iter().enumerate() {
            let result = sqlx::query(
                r#"
                UPDATE listing_photos
                SET position = $3, is_primary = $4
                WHERE listing_id = $1 AND id = $2
                "#,
            )
            .bind(listing.as_i64())
            .bind(id.as_i64())
            .bind(position)
            .bind(is_primary)
            .execute(&self.pool)
            .await;
            if result.is_err() || matches!(result, Ok(ref r) if r.rows_affected() == 0) {
                return Err(CoreError::Partial {
                    operation: "photo reorder",
                    applied,
                    total: plan.len(),
                });
            }
        }
        Ok(())
    }

    // -- Featured selection -------------------------------------------------

    async fn featured_ids(&self) -> CoreResult<Vec<ListingId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT listing_id FROM featured_listings ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(ListingId::new).collect())
    }

    async fn add_featured(&self, id: ListingId) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO featured_listings (listing_id) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_featured(&self, id: ListingId) -> CoreResult<()> {
        sqlx::query("DELETE FROM featured_listings WHERE listing_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // -- Profiles -----------------------------------------------------------

    async fn get_profiles(&self, ids: &[ProfileId]) -> CoreResult<Vec<Profile>> {
        let raw: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, unit_label, display_name FROM profiles WHERE id = ANY($1)",
        )
        .bind(raw)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(profile_from_row).collect())
    }
}
