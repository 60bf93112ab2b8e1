pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod models;
pub mod recording;
pub mod repository;
pub mod state;
pub mod storage;
pub mod test_helpers;

pub use config::{ClusterConfig, Config, LoggingConfig, RedisConfig};
pub use discovery::{DiscoveredPeer, PeerDiscovery, S3Config};
pub use error::{Error, Result};
pub use models::{
    ArtifactHash, ArtifactKind, ArtifactRecord, BufferState, ClusterId, EdgeNode, GeoPoint,
    HotArtifact, InstanceId, NodeId, PlaybackId, StorageState, StreamEdgeState, StreamInfo,
    TenantId,
};
pub use recording::{
    ArtifactCommand, ArtifactCommandHandler, ClipRequest, DvrRequest, RecordingCreated,
    RecordingService,
};
pub use repository::ArtifactStore;
pub use state::{EdgeBalancer, ScoredNode, StateManager};
pub use storage::ObjectStore;
