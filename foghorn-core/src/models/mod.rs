pub mod artifact;
pub mod edge;
pub mod id;
pub mod stream;

pub use artifact::{ArtifactKind, ArtifactRecord, StorageState};
pub use edge::{EdgeNode, GeoPoint, HotArtifact};
pub use id::{ArtifactHash, ClusterId, InstanceId, NodeId, PlaybackId, TenantId};
pub use stream::{BufferState, StreamEdgeState, StreamInfo};
