//! Object storage seam (S3-compatible).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Presigned GET URL for `key`, valid for `validity`.
    async fn presign_get(&self, key: &str, validity: Duration) -> Result<String>;

    /// Object keys under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}
