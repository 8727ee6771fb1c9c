// Navigation domain: admin-curated ordered collections.
//
// category  - service categories (name + icon, dense display order)
// menu_item - navigation menu entries (label/path uniqueness, visibility)

pub mod category;
pub mod menu_item;

pub use category::{Category, CategoryPatch, NewCategory};
pub use menu_item::{MenuItem, MenuItemPatch, NewMenuItem};
