//! Seams toward the cluster-local control plane.
//!
//! The federation core never owns node or stream state; it observes the
//! authoritative local state manager and asks the local balancer to rank
//! nodes. Both are injected so tests can substitute them.

use async_trait::async_trait;

use crate::models::{EdgeNode, GeoPoint, NodeId, StreamInfo, TenantId};

/// Authoritative view of this cluster's nodes and streams
#[async_trait]
pub trait StateManager: Send + Sync {
    /// All streams currently live in this cluster
    async fn live_streams(&self) -> Vec<StreamInfo>;

    /// Look up one stream by internal name
    async fn stream(&self, internal_name: &str) -> Option<StreamInfo>;

    /// All known edge nodes
    async fn nodes(&self) -> Vec<EdgeNode>;

    /// Look up one node
    async fn node(&self, node_id: &NodeId) -> Option<EdgeNode>;

    /// Whether `internal_name` is confirmed live on `node_id`
    async fn is_stream_live_on_node(&self, internal_name: &str, node_id: &NodeId) -> bool;

    /// Internal pull URL another edge would use to ingest `internal_name`
    /// from `node_id`. `None` when the URL cannot be built.
    async fn dtsc_url(&self, node_id: &NodeId, internal_name: &str) -> Option<String>;
}

/// A node ranked by the local balancer
#[derive(Debug, Clone)]
pub struct ScoredNode {
    pub node_id: NodeId,
    pub score: f64,
}

/// Local load balancer: ranks this cluster's nodes for a stream
#[async_trait]
pub trait EdgeBalancer: Send + Sync {
    /// Score up to `limit` nodes for serving `internal_name`, scoped by
    /// tenant and optionally biased toward the viewer's location.
    async fn score_nodes(
        &self,
        internal_name: &str,
        tenant_id: &TenantId,
        viewer_location: Option<GeoPoint>,
        limit: usize,
    ) -> Vec<ScoredNode>;

    /// Best node to pull `internal_name` from; only nodes with active
    /// inputs for the stream qualify.
    async fn best_source_node(&self, internal_name: &str) -> Option<NodeId>;
}
