// Domain modules: business logic over the persistence gateway.

pub mod catalog;
pub mod listings;
pub mod navigation;
pub mod ordering;
