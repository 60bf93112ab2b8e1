//! Cross-cluster federation core of the Foghorn control plane.
//!
//! Each geographic cluster runs one balancer; clusters form a mesh over
//! persistent bidirectional gRPC channels. This crate provides the four
//! federation components: the Redis-backed remote edge cache, the outbound
//! federation client, the inbound federation server, and the leader-elected
//! peer manager that drives telemetry push and peering lifecycle.

pub mod cache;
pub mod error;
pub mod grpc;
pub mod peer;

pub use cache::{FederationCache, RedisBackend};
pub use error::{Error, Result};
pub use grpc::{
    FederationClient, FederationClientConfig, FederationServer, FederationServiceServer,
    ServiceAuthInterceptor,
};
pub use peer::{PeerHint, PeerLifecycle, PeerManager, PeerManagerConfig, PeerManagerMetrics};

/// Deployment-wide TCP port on which every cluster accepts federation RPCs
pub const FEDERATION_PORT: u16 = 18019;
