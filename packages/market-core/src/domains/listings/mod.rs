// Listings domain: the moderated heart of the marketplace.
//
// models/      - Listing, Photo and their payload shapes
// moderation   - the pending/approved/rejected state machine
// featured     - admin-curated homepage selection
// photos       - photo set staging, commit and ordering

pub mod featured;
pub mod models;
pub mod moderation;
pub mod photos;

pub use models::listing::{
    Deal, Listing, ListingKind, ListingPatch, ListingStatus, NewListing, PropertyDetails,
};
pub use models::photo::{NewPhoto, Photo};
pub use photos::{PhotoCandidate, PhotoSetManager, StagedPhoto};
