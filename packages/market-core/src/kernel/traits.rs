// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The embedding
// application supplies the concrete transport (its object storage SDK); the
// core only needs success/failure and a resulting URL.
//
// Naming convention: Base* for trait names.

use async_trait::async_trait;

use crate::common::CoreResult;

// =============================================================================
// Object Storage Trait (Infrastructure - listing photo files)
// =============================================================================

#[async_trait]
pub trait BaseObjectStorage: Send + Sync {
    /// Upload `bytes` under `key` inside `bucket`; returns the public URL of
    /// the stored object.
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> CoreResult<String>;

    /// Remove the given keys from `bucket`. Missing keys are not an error.
    async fn remove(&self, bucket: &str, keys: &[String]) -> CoreResult<()>;
}
