//! Cache entity records.
//!
//! Every record is serialized to self-describing JSON and written with the
//! TTL of its entity. Any entry may be absent on read; callers treat a miss
//! as "unknown", never "false".

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use foghorn_core::models::{
    ArtifactHash, ArtifactKind, BufferState, ClusterId, GeoPoint, NodeId, PlaybackId, TenantId,
};

/// Mirrored peer address map
pub const PEER_ADDRESSES_TTL: Duration = Duration::from_secs(30);
/// Leader lease; holders renew at least once per quarter TTL
pub const LEADER_LEASE_TTL: Duration = Duration::from_secs(20);
pub const REMOTE_EDGE_TTL: Duration = Duration::from_secs(30);
pub const REMOTE_REPLICATION_TTL: Duration = Duration::from_secs(300);
pub const ACTIVE_REPLICATION_TTL: Duration = Duration::from_secs(300);
pub const EDGE_SUMMARY_TTL: Duration = Duration::from_secs(60);
pub const REMOTE_STREAM_TTL: Duration = Duration::from_secs(30);
pub const STREAM_AD_TTL: Duration = Duration::from_secs(15);
pub const PLAYBACK_INDEX_TTL: Duration = Duration::from_secs(30);
pub const REMOTE_ARTIFACT_TTL: Duration = Duration::from_secs(90);
pub const PEER_HEARTBEAT_TTL: Duration = Duration::from_secs(30);
pub const STREAM_PEERS_TTL: Duration = Duration::from_secs(3600);

/// Telemetry for one edge node of a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEdge {
    pub cluster_id: ClusterId,
    pub node_id: NodeId,
    pub base_url: String,
    pub bandwidth_available: u64,
    pub viewer_count: u32,
    pub cpu: f64,
    pub ram_used: u64,
    pub ram_max: u64,
    pub location: Option<GeoPoint>,
    pub updated_at: DateTime<Utc>,
}

/// One stream replicated from (or to) a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteReplication {
    pub stream_name: String,
    pub cluster_id: ClusterId,
    pub node_id: NodeId,
    pub base_url: String,
    pub dtsc_url: String,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

/// Bridge record between an accepted origin-pull and the destination node
/// reporting the stream live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveReplication {
    pub stream_name: String,
    pub source_cluster: ClusterId,
    pub source_node: NodeId,
    pub dest_cluster: ClusterId,
    pub dest_node: NodeId,
    pub dtsc_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub node_id: NodeId,
    pub base_url: String,
    pub bandwidth_available: u64,
    pub cpu: f64,
}

/// Moving-averaged per-node snapshot of a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSummary {
    pub cluster_id: ClusterId,
    pub edges: Vec<EdgeSnapshot>,
    pub updated_at: DateTime<Utc>,
}

/// A stream known live in a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLiveStream {
    pub internal_name: String,
    pub cluster_id: ClusterId,
    pub tenant_id: TenantId,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamAdEdge {
    pub node_id: NodeId,
    pub base_url: String,
    pub dtsc_url: String,
    pub is_origin: bool,
    pub bandwidth_available: u64,
    pub cpu: f64,
    pub viewer_count: u32,
    pub location: Option<GeoPoint>,
    pub buffer_state: BufferState,
}

/// Full stream advertisement from a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamAd {
    pub cluster_id: ClusterId,
    pub internal_name: String,
    pub tenant_id: TenantId,
    pub playback_id: Option<PlaybackId>,
    pub origin_cluster_id: ClusterId,
    pub is_live: bool,
    pub edges: Vec<StreamAdEdge>,
    pub updated_at: DateTime<Utc>,
}

/// An artifact available in a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteArtifact {
    pub cluster_id: ClusterId,
    pub hash: ArtifactHash,
    pub kind: Option<ArtifactKind>,
    pub node_id: NodeId,
    pub base_url: String,
    pub size_bytes: u64,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
    pub location: Option<GeoPoint>,
    pub updated_at: DateTime<Utc>,
}

/// Liveness report from a peer cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerHeartbeatRecord {
    pub cluster_id: ClusterId,
    pub protocol_version: u32,
    pub stream_count: u32,
    pub edge_count: u32,
    pub total_bandwidth_available: u64,
    pub uptime_seconds: u64,
    pub capabilities: Vec<String>,
    pub received_at: DateTime<Utc>,
}
