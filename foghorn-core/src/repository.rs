//! Artifact table seam.
//!
//! Backed by Postgres in the full deployment; the federation core only
//! depends on this trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ArtifactHash, ArtifactKind, ArtifactRecord, TenantId};

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Look up an artifact by `(hash, tenant)`. Rows marked deleted are
    /// never returned.
    async fn find(&self, hash: &ArtifactHash, tenant_id: &TenantId)
        -> Result<Option<ArtifactRecord>>;

    /// All of a tenant's artifacts, optionally filtered by kind.
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<ArtifactRecord>>;

    /// Insert or update an artifact metadata row (cross-cluster migration).
    async fn upsert(&self, record: ArtifactRecord) -> Result<()>;

    /// Kick off an asynchronous upload of a local artifact to object
    /// storage.
    async fn trigger_freeze(&self, hash: &ArtifactHash) -> Result<()>;
}
