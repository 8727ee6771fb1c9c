//! Kernel module - infrastructure traits and dependency wiring.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::CoreDeps;
pub use traits::BaseObjectStorage;
