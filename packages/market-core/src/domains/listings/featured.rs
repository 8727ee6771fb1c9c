//! Featured selection: the admin-curated subset of approved listings shown
//! in the homepage carousel. Membership only; display follows insertion
//! order.

use crate::common::{AuthContext, CoreError, CoreResult, ListingId};
use crate::store::BaseMarketStore;

use super::models::ListingStatus;

/// Add a listing to the featured selection. Only approved listings qualify;
/// already-featured ids are accepted without effect.
pub async fn feature(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
) -> CoreResult<()> {
    auth.require_admin("featuring a listing")?;
    let listing = store
        .get_listing(id)
        .await?
        .ok_or_else(|| CoreError::not_found("listing", id))?;
    if listing.status != ListingStatus::Approved {
        return Err(CoreError::conflict(format!(
            "only approved listings can be featured (listing {id} is {})",
            listing.status
        )));
    }

    if store.featured_ids().await?.contains(&id) {
        return Ok(());
    }
    store.add_featured(id).await?;
    tracing::info!(listing_id = %id, "Listing featured");
    Ok(())
}

/// Remove a listing from the featured selection. Idempotent.
pub async fn unfeature(
    store: &dyn BaseMarketStore,
    auth: &AuthContext,
    id: ListingId,
) -> CoreResult<()> {
    auth.require_admin("unfeaturing a listing")?;
    store.remove_featured(id).await
}
