use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactKind;
use super::id::{ArtifactHash, NodeId};

/// Geographic coordinates of an edge node or a viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A frequently accessed artifact currently held on an edge node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotArtifact {
    pub hash: ArtifactHash,
    pub kind: ArtifactKind,
    pub size_bytes: u64,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
}

/// Snapshot of a local edge node as reported by the state manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeNode {
    pub node_id: NodeId,
    /// Public base URL viewers are directed to (e.g. `https://edge-1.ams.example.com`)
    pub base_url: String,
    pub bandwidth_available: u64,
    pub bandwidth_max: u64,
    /// CPU load, 0.0 - 100.0
    pub cpu: f64,
    pub ram_used: u64,
    pub ram_max: u64,
    pub viewer_count: u32,
    pub location: Option<GeoPoint>,
    /// Whether the node currently accepts traffic
    pub active: bool,
    pub hot_artifacts: Vec<HotArtifact>,
}

impl EdgeNode {
    /// Minimal node with sane defaults, used by fixtures and tests
    #[must_use]
    pub fn new(node_id: NodeId, base_url: String) -> Self {
        Self {
            node_id,
            base_url,
            bandwidth_available: 0,
            bandwidth_max: 0,
            cpu: 0.0,
            ram_used: 0,
            ram_max: 0,
            viewer_count: 0,
            location: None,
            active: true,
            hot_artifacts: Vec::new(),
        }
    }
}
