use serde::{Deserialize, Serialize};

use super::id::{NodeId, PlaybackId, TenantId};

/// Media buffer health of a stream on one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BufferState {
    #[default]
    Full,
    Dry,
    Empty,
    Recovering,
}

impl BufferState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Dry => "dry",
            Self::Empty => "empty",
            Self::Recovering => "recovering",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "dry" => Self::Dry,
            "empty" => Self::Empty,
            "recovering" => Self::Recovering,
            _ => Self::Full,
        }
    }
}

/// Per-node serving entry for a locally live stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEdgeState {
    pub node_id: NodeId,
    pub buffer_state: BufferState,
    pub viewer_count: u32,
}

/// A locally known stream as reported by the state manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Cluster-local canonical name, `tenant+name` wildcard convention
    pub internal_name: String,
    pub tenant_id: TenantId,
    pub playback_id: Option<PlaybackId>,
    /// Node currently ingesting the stream, if any
    pub origin_node: Option<NodeId>,
    /// Whether the origin is receiving active inputs
    pub has_active_inputs: bool,
    /// Nodes currently serving the stream
    pub edges: Vec<StreamEdgeState>,
}

impl StreamInfo {
    /// Whether `node_id` is the ingesting origin with active inputs
    #[must_use]
    pub fn is_origin(&self, node_id: &NodeId) -> bool {
        self.has_active_inputs && self.origin_node.as_ref() == Some(node_id)
    }
}
