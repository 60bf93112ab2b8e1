use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ArtifactHash, TenantId};

/// Kind of stored artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Clip,
    Dvr,
    Vod,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Dvr => "dvr",
            Self::Vod => "vod",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clip" => Some(Self::Clip),
            "dvr" => Some(Self::Dvr),
            "vod" => Some(Self::Vod),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an artifact currently lives relative to object storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageState {
    /// Only on a local edge node, not yet uploaded
    Local,
    /// Upload to object storage in progress
    Freezing,
    /// Fully resident in object storage
    Frozen,
    /// Being restored from object storage to an edge
    Defrosting,
    /// A state this build does not recognize
    #[serde(other)]
    Unknown,
}

impl StorageState {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "local" => Self::Local,
            "freezing" => Self::Freezing,
            "frozen" => Self::Frozen,
            "defrosting" => Self::Defrosting,
            _ => Self::Unknown,
        }
    }
}

/// One row of the artifact table, as exposed by the store collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub hash: ArtifactHash,
    pub tenant_id: TenantId,
    pub internal_name: String,
    pub kind: ArtifactKind,
    /// Container format, e.g. "mp4" or "ts"
    pub format: String,
    pub storage_state: StorageState,
    /// Whether the artifact has been fully synced to object storage
    pub synced: bool,
    pub size_bytes: u64,
    /// Stream the artifact was cut from, when known
    pub stream_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_kind_parse() {
        assert_eq!(ArtifactKind::parse("clip"), Some(ArtifactKind::Clip));
        assert_eq!(ArtifactKind::parse("dvr"), Some(ArtifactKind::Dvr));
        assert_eq!(ArtifactKind::parse("vod"), Some(ArtifactKind::Vod));
        assert_eq!(ArtifactKind::parse("mp4"), None);
    }

    #[test]
    fn test_storage_state_unknown_deserializes() {
        let state: StorageState = serde_json::from_str("\"thawing\"").unwrap();
        assert_eq!(state, StorageState::Unknown);
        assert_eq!(StorageState::parse("thawing"), StorageState::Unknown);
    }
}
