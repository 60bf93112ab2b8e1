//! Peer discovery seam (Quartermaster).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ClusterId, TenantId};

/// Object storage coordinates a peer shares for the same-bucket
/// direct-access optimization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
}

/// One peer cluster as reported by the discovery service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredPeer {
    pub cluster_id: ClusterId,
    /// Short deployment slug used when synthesizing the federation address
    pub slug: String,
    /// DNS base the cluster's services hang off of
    pub base_url: String,
    /// Tenants shared with this cluster; empty means all
    pub tenant_ids: Vec<TenantId>,
    /// Preferred/official peers get an always-on channel
    pub preferred: bool,
    pub s3: Option<S3Config>,
}

#[async_trait]
pub trait PeerDiscovery: Send + Sync {
    async fn list_peers(&self) -> Result<Vec<DiscoveredPeer>>;
}
