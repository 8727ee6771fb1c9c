//! Navigation menu entries.
//!
//! Label and path must be unique case-insensitively, enforced at write time
//! against the current collection rather than by convention or a database
//! constraint alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AuthContext, CoreError, CoreResult, MenuItemId};
use crate::domains::ordering::{self, collections::MenuCollection};
use crate::store::BaseMarketStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub label: String,
    /// Route path, always starting with "/".
    pub path: String,
    pub visible: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub label: String,
    pub path: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    pub label: Option<String>,
    pub path: Option<String>,
    pub visible: Option<bool>,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_label(label: &str) -> CoreResult<()> {
    if label.trim().is_empty() {
        return Err(CoreError::validation("menu label must not be empty"));
    }
    Ok(())
}

fn validate_path(path: &str) -> CoreResult<()> {
    if !path.starts_with('/') {
        return Err(CoreError::validation(format!(
            "menu path \"{path}\" must start with \"/\""
        )));
    }
    Ok(())
}

/// Case-insensitive uniqueness of label and path against the current
/// collection, excluding the item being updated.
fn check_uniqueness(
    existing: &[MenuItem],
    label: Option<&str>,
    path: Option<&str>,
    exclude: Option<MenuItemId>,
) -> CoreResult<()> {
    for item in existing.iter().filter(|i| Some(i.id) != exclude) {
        if let Some(label) = label {
            if item.label.eq_ignore_ascii_case(label) {
                return Err(CoreError::conflict(format!(
                    "a menu item labeled \"{label}\" already exists"
                )));
            }
        }
        if let Some(path) = path {
            if item.path.eq_ignore_ascii_case(path) {
                return Err(CoreError::conflict(format!(
                    "a menu item with path \"{path}\" already exists"
                )));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Admin operations
// =============================================================================

pub async fn create_menu_item(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    new: NewMenuItem,
    at: Option<usize>,
) -> CoreResult<MenuItem> {
    auth.require_admin("creating a menu item")?;
    validate_label(&new.label)?;
    validate_path(&new.path)?;

    let existing = store.list_menu_items().await?;
    check_uniqueness(&existing, Some(&new.label), Some(&new.path), None)?;

    let slot = ordering::insert_slot(&MenuCollection { store }, at).await?;
    let item = store.create_menu_item(new, slot).await?;
    tracing::info!(menu_item_id = %item.id, path = %item.path, "Menu item created");
    Ok(item)
}

pub async fn update_menu_item(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: MenuItemId,
    patch: MenuItemPatch,
) -> CoreResult<MenuItem> {
    auth.require_admin("updating a menu item")?;
    if let Some(ref label) = patch.label {
        validate_label(label)?;
    }
    if let Some(ref path) = patch.path {
        validate_path(path)?;
    }

    let existing = store.list_menu_items().await?;
    if !existing.iter().any(|i| i.id == id) {
        return Err(CoreError::not_found("menu item", id));
    }
    check_uniqueness(
        &existing,
        patch.label.as_deref(),
        patch.path.as_deref(),
        Some(id),
    )?;

    store.update_menu_item(id, patch).await
}

pub async fn reorder_menu_items(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    ids: &[MenuItemId],
) -> CoreResult<()> {
    auth.require_admin("reordering the menu")?;
    let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
    ordering::reorder(&MenuCollection { store }, &raw).await
}

pub async fn delete_menu_item(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: MenuItemId,
) -> CoreResult<()> {
    auth.require_admin("deleting a menu item")?;
    store
        .get_menu_item(id)
        .await?
        .ok_or_else(|| CoreError::not_found("menu item", id))?;
    store.delete_menu_item(id).await?;
    ordering::compact(&MenuCollection { store }).await
}
