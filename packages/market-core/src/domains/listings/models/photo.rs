use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ListingId, PhotoId};

/// A photo record in a listing's ordered photo set.
///
/// Position is the dense zero-based index within the owning listing's
/// collection; the photo at position 0 is always the primary one when the
/// set is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub listing_id: ListingId,
    pub url: String,
    pub is_primary: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Payload for replacing a listing's photo set. Position is the index in
/// the submitted slice; `is_primary` is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
    pub url: String,
}
