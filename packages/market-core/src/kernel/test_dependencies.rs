// MockObjectStorage - mock infrastructure for testing
//
// Records every upload/remove call and supports failure injection, so tests
// can drive the photo manager's partial-failure and cleanup paths without a
// real storage backend.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::common::{CoreError, CoreResult};

use super::traits::BaseObjectStorage;

/// Arguments captured from an upload call.
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub bucket: String,
    pub key: String,
    pub byte_len: usize,
}

pub struct MockObjectStorage {
    uploads: Arc<Mutex<Vec<UploadCall>>>,
    removals: Arc<Mutex<Vec<String>>>,
    /// Uploads succeed until this many calls have been made.
    fail_uploads_after: Arc<Mutex<Option<usize>>>,
    fail_removals: Arc<Mutex<bool>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            removals: Arc::new(Mutex::new(Vec::new())),
            fail_uploads_after: Arc::new(Mutex::new(None)),
            fail_removals: Arc::new(Mutex::new(false)),
        }
    }

    /// Let `n` uploads succeed, then fail the rest.
    pub fn with_upload_failures_after(self, n: usize) -> Self {
        *self.fail_uploads_after.lock().unwrap() = Some(n);
        self
    }

    pub fn with_failing_removals(self) -> Self {
        *self.fail_removals.lock().unwrap() = true;
        self
    }

    /// All upload calls made so far.
    pub fn uploads(&self) -> Vec<UploadCall> {
        self.uploads.lock().unwrap().clone()
    }

    /// All keys removal was requested for.
    pub fn removed_keys(&self) -> Vec<String> {
        self.removals.lock().unwrap().clone()
    }

    pub fn was_uploaded(&self, key: &str) -> bool {
        self.uploads.lock().unwrap().iter().any(|c| c.key == key)
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseObjectStorage for MockObjectStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> CoreResult<String> {
        let call_count = self.uploads.lock().unwrap().len();
        if let Some(limit) = *self.fail_uploads_after.lock().unwrap() {
            if call_count >= limit {
                return Err(CoreError::Upstream(format!(
                    "mock storage refused upload of {key}"
                )));
            }
        }

        self.uploads.lock().unwrap().push(UploadCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            byte_len: bytes.len(),
        });
        Ok(format!("mock://{bucket}/{key}"))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> CoreResult<()> {
        if *self.fail_removals.lock().unwrap() {
            return Err(CoreError::Upstream(
                "mock storage refused removal".to_string(),
            ));
        }
        let _ = bucket;
        self.removals.lock().unwrap().extend(keys.iter().cloned());
        Ok(())
    }
}
