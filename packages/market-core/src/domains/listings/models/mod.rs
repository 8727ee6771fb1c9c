pub mod listing;
pub mod photo;

pub use listing::{Deal, Listing, ListingKind, ListingPatch, ListingStatus, NewListing, PropertyDetails};
pub use photo::{NewPhoto, Photo};
