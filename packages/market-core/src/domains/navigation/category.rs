//! Service categories: admin-curated, densely ordered.
//!
//! Deleting a category is an explicit cascade: dependent listings get their
//! category reference nulled out first, then the row is deleted and the
//! remaining sequence compacted. Nothing is left to incidental foreign-key
//! behavior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AuthContext, CategoryId, CoreError, CoreResult};
use crate::domains::ordering::{self, collections::CategoryCollection};
use crate::store::BaseMarketStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Emoji or symbolic icon key shown next to the name.
    pub icon: String,
    /// Dense zero-based presentation index, unique within the collection.
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
}

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("category name must not be empty"));
    }
    Ok(())
}

// =============================================================================
// Admin operations
// =============================================================================

/// Create a category, appending it at the tail of the sequence (or at `at`,
/// shifting later entries right).
pub async fn create_category(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    new: NewCategory,
    at: Option<usize>,
) -> CoreResult<Category> {
    auth.require_admin("creating a category")?;
    validate_name(&new.name)?;

    let slot = ordering::insert_slot(&CategoryCollection { store }, at).await?;
    let category = store.create_category(new, slot).await?;
    tracing::info!(category_id = %category.id, order = slot, "Category created");
    Ok(category)
}

pub async fn update_category(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: CategoryId,
    patch: CategoryPatch,
) -> CoreResult<Category> {
    auth.require_admin("updating a category")?;
    if let Some(ref name) = patch.name {
        validate_name(name)?;
    }
    store
        .get_category(id)
        .await?
        .ok_or_else(|| CoreError::not_found("category", id))?;
    store.update_category(id, patch).await
}

/// Reorder the whole category sequence. `ids` must be a permutation of the
/// current collection.
pub async fn reorder_categories(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    ids: &[CategoryId],
) -> CoreResult<()> {
    auth.require_admin("reordering categories")?;
    let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
    ordering::reorder(&CategoryCollection { store }, &raw).await
}

/// Delete a category with its explicit cascade: null dependent listing
/// references, delete the row, compact the remaining sequence.
pub async fn delete_category(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: CategoryId,
) -> CoreResult<()> {
    auth.require_admin("deleting a category")?;
    store
        .get_category(id)
        .await?
        .ok_or_else(|| CoreError::not_found("category", id))?;

    let detached = store.clear_category_refs(id).await?;
    if detached > 0 {
        tracing::info!(category_id = %id, listings = detached, "Detached listings from deleted category");
    }
    store.delete_category(id).await?;
    ordering::compact(&CategoryCollection { store }).await
}
