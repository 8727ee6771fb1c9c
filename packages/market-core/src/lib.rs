// Condominium Marketplace - Moderation & Ordering Core
//
// This crate is the engine behind a condominium-scoped marketplace: residents
// publish service offers and property listings, an administrator moderates
// them, and admin-curated ordered collections (categories, navigation menu,
// listing photo sets) drive presentation. The crate is a library invoked by
// UI code; it has no HTTP or CLI surface of its own.
//
// Architecture follows domain modules over a swappable persistence gateway:
// the same contract is served by a live Postgres store or an in-memory demo
// fixture, selected once at startup.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod store;

pub use config::*;
