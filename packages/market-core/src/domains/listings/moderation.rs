//! Moderation state machine for listings.
//!
//! States: pending (initial), approved, rejected. This is an admin override
//! model, not a strict pipeline: all three states are mutually reachable.
//! Guards (role, existence) run before any write, and the in-memory view is
//! never flipped ahead of the store's acknowledgement; the returned listing
//! is whatever the gateway persisted.
//!
//! Whenever a listing leaves `Approved` (unpublish, reject, or a forced
//! re-review after an owner edit) it is synchronously evicted from the
//! featured selection in the same operation.

use crate::common::{normalize_whatsapp, AuthContext, CoreError, CoreResult, ListingId};
use crate::store::BaseMarketStore;

use super::models::{Listing, ListingKind, ListingPatch, ListingStatus, NewListing};

// =============================================================================
// Owner operations
// =============================================================================

/// Submit a new listing. Always starts `Pending`; the owner is the calling
/// principal regardless of what the payload claims.
pub async fn submit_listing(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    mut new: NewListing,
) -> CoreResult<Listing> {
    if new.title.trim().is_empty() {
        return Err(CoreError::validation("title must not be empty"));
    }
    if new.description.trim().is_empty() {
        return Err(CoreError::validation("description must not be empty"));
    }
    if new.kind == ListingKind::Property && new.property.is_none() {
        return Err(CoreError::validation(
            "property listings require property details",
        ));
    }
    if new.kind == ListingKind::Service && new.property.is_some() {
        return Err(CoreError::validation(
            "service listings carry no property details",
        ));
    }

    new.whatsapp = normalize_whatsapp(&new.whatsapp)?;
    new.owner = auth.profile_id;

    if let Some(category) = new.category {
        store
            .get_category(category)
            .await?
            .ok_or_else(|| CoreError::not_found("category", category))?;
    }

    let listing = store.create_listing(new).await?;
    tracing::info!(listing_id = %listing.id, kind = %listing.kind, "Listing submitted for review");
    Ok(listing)
}

/// Edit a listing's content fields. Gated on ownership (admins may edit on
/// the owner's behalf). Status is never part of a patch, but an edit to an
/// `Approved` listing forces it back to `Pending` for re-review, so approved
/// content never changes silently.
pub async fn edit_listing(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
    mut patch: ListingPatch,
) -> CoreResult<Listing> {
    let current = store
        .get_listing(id)
        .await?
        .ok_or_else(|| CoreError::not_found("listing", id))?;
    auth.require_owner(current.owner, "editing this listing")?;

    if patch.is_empty() {
        return Ok(current);
    }
    if let Some(ref title) = patch.title {
        if title.trim().is_empty() {
            return Err(CoreError::validation("title must not be empty"));
        }
    }
    if let Some(ref whatsapp) = patch.whatsapp {
        patch.whatsapp = Some(normalize_whatsapp(whatsapp)?);
    }
    if let Some(Some(category)) = patch.category {
        store
            .get_category(category)
            .await?
            .ok_or_else(|| CoreError::not_found("category", category))?;
    }

    // Unpublish before touching content, so a failure partway through
    // leaves the listing back in review rather than live with edited text.
    if current.status == ListingStatus::Approved {
        store.remove_featured(id).await?;
        store
            .set_listing_status(id, ListingStatus::Pending, None)
            .await?;
        tracing::info!(listing_id = %id, "Approved listing edited; returned to review queue");
    }

    store.update_listing_content(id, patch).await
}

// =============================================================================
// Admin transitions
// =============================================================================

/// `* -> Approved`. Clears any prior rejection reason. Idempotent: approving
/// an approved listing succeeds and simply advances `updated_at`.
pub async fn approve(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
) -> CoreResult<Listing> {
    transition(store, auth, id, ListingStatus::Approved, None, "approve").await
}

/// `* -> Rejected`, with an optional free-text reason shown to the owner.
pub async fn reject(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
    reason: Option<String>,
) -> CoreResult<Listing> {
    transition(store, auth, id, ListingStatus::Rejected, reason, "reject").await
}

/// `Rejected -> Pending`: reopen for review, clearing the rejection reason.
pub async fn reopen(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
) -> CoreResult<Listing> {
    transition(store, auth, id, ListingStatus::Pending, None, "reopen").await
}

/// `Approved -> Pending`: unpublish for review. Calling this on a listing
/// that is not approved is a conflict, to keep an accidental call from
/// silently rewriting state.
pub async fn unpublish(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
) -> CoreResult<Listing> {
    auth.require_admin("unpublish")?;
    let current = store
        .get_listing(id)
        .await?
        .ok_or_else(|| CoreError::not_found("listing", id))?;
    if current.status != ListingStatus::Approved {
        return Err(CoreError::conflict(format!(
            "cannot unpublish a {} listing",
            current.status
        )));
    }
    apply_transition(store, current, ListingStatus::Pending, None, "unpublish").await
}

async fn transition(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
    target: ListingStatus,
    reason: Option<String>,
    action: &'static str,
) -> CoreResult<Listing> {
    auth.require_admin(action)?;
    let current = store
        .get_listing(id)
        .await?
        .ok_or_else(|| CoreError::not_found("listing", id))?;
    apply_transition(store, current, target, reason, action).await
}

async fn apply_transition(
    store: &dyn BaseMarketStore,
    current: Listing,
    target: ListingStatus,
    reason: Option<String>,
    action: &'static str,
) -> CoreResult<Listing> {
    // Leaving Approved means leaving the homepage carousel too.
    if current.status == ListingStatus::Approved && target != ListingStatus::Approved {
        store.remove_featured(current.id).await?;
    }

    let reason = match target {
        ListingStatus::Rejected => reason,
        _ => None,
    };

    let updated = store.set_listing_status(current.id, target, reason).await?;
    tracing::info!(
        listing_id = %updated.id,
        from = %current.status,
        to = %updated.status,
        action,
        "Listing status transition"
    );
    Ok(updated)
}
