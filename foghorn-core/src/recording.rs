//! Clip/DVR creation and artifact command seams.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ArtifactHash, NodeId, TenantId};

/// Parameters for cutting a clip from a live stream
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub internal_name: String,
    pub tenant_id: TenantId,
    pub start_unix: Option<i64>,
    pub end_unix: Option<i64>,
    pub title: Option<String>,
}

/// Parameters for starting a DVR recording of a live stream
#[derive(Debug, Clone)]
pub struct DvrRequest {
    pub internal_name: String,
    pub tenant_id: TenantId,
    pub retention_hours: Option<u32>,
}

/// Result of a clip or DVR creation
#[derive(Debug, Clone)]
pub struct RecordingCreated {
    pub hash: ArtifactHash,
    /// Node elected to hold the recording while it is local
    pub storage_node_id: Option<NodeId>,
}

/// Local clip/DVR creator
#[async_trait]
pub trait RecordingService: Send + Sync {
    async fn create_clip(&self, request: ClipRequest) -> Result<RecordingCreated>;
    async fn create_dvr(&self, request: DvrRequest) -> Result<RecordingCreated>;
}

/// Commands a peer cluster may forward for an artifact it does not own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactCommand {
    DeleteClip,
    StopDvr,
    DeleteDvr,
    DeleteVod,
}

impl ArtifactCommand {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delete_clip" => Some(Self::DeleteClip),
            "stop_dvr" => Some(Self::StopDvr),
            "delete_dvr" => Some(Self::DeleteDvr),
            "delete_vod" => Some(Self::DeleteVod),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeleteClip => "delete_clip",
            Self::StopDvr => "stop_dvr",
            Self::DeleteDvr => "delete_dvr",
            Self::DeleteVod => "delete_vod",
        }
    }
}

/// Executes artifact commands against local state.
///
/// `no_forward` marks a command that arrived from a peer so the handler
/// must not forward it across the mesh again.
#[async_trait]
pub trait ArtifactCommandHandler: Send + Sync {
    async fn handle(
        &self,
        command: ArtifactCommand,
        hash: &ArtifactHash,
        tenant_id: &TenantId,
        no_forward: bool,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_command_parse_roundtrip() {
        for cmd in [
            ArtifactCommand::DeleteClip,
            ArtifactCommand::StopDvr,
            ArtifactCommand::DeleteDvr,
            ArtifactCommand::DeleteVod,
        ] {
            assert_eq!(ArtifactCommand::parse(cmd.as_str()), Some(cmd));
        }
        assert_eq!(ArtifactCommand::parse("rewind_dvr"), None);
    }
}
