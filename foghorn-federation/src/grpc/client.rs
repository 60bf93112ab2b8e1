//! Outbound federation client.
//!
//! Thin wrapper over the generated gRPC client: a shared channel pool keyed
//! by peer cluster id, a bounded deadline on every unary call, and service
//! identity on the wire. End-user credentials from the calling context are
//! never forwarded; peers authenticate the cluster, not the viewer.

use std::time::Duration;

use moka::sync::Cache;
use tokio::time::timeout;
use tonic::metadata::MetadataValue;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

use foghorn_core::models::ClusterId;

use super::auth::SERVICE_TOKEN_HEADER;
use super::foghorn::federation as pb;
use super::foghorn::federation::federation_client::FederationClient as FederationGrpcClient;
use crate::error::{Error, Result};

/// TTL for cached gRPC channels. Channels to peers that drop out of the
/// roster are evicted after this much inactivity.
const CHANNEL_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of cached gRPC channels.
const CHANNEL_CACHE_MAX_CAPACITY: u64 = 64;

/// Configuration for the federation client
#[derive(Debug, Clone)]
pub struct FederationClientConfig {
    /// Deadline for ordinary unary RPCs
    pub call_timeout: Duration,
    /// Deadline for bulk artifact metadata RPCs
    pub bulk_call_timeout: Duration,
    /// Deadline for establishing a new connection to a peer
    pub connect_timeout: Duration,
    /// Shared secret attached to every outbound call
    pub service_secret: String,
}

impl Default for FederationClientConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            bulk_call_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            service_secret: String::new(),
        }
    }
}

/// Pooled outbound RPC wrapper
pub struct FederationClient {
    config: FederationClientConfig,
    /// Cached gRPC channels keyed by peer cluster id
    channels: Cache<ClusterId, Channel>,
}

impl FederationClient {
    #[must_use]
    pub fn new(config: FederationClientConfig) -> Self {
        let channels = Cache::builder()
            .max_capacity(CHANNEL_CACHE_MAX_CAPACITY)
            .time_to_idle(Duration::from_secs(CHANNEL_CACHE_TTL_SECS))
            .build();

        Self { config, channels }
    }

    /// Get or create a cached channel to `address` for `cluster_id`.
    async fn channel(&self, cluster_id: &ClusterId, address: &str) -> Result<Channel> {
        if let Some(channel) = self.channels.get(cluster_id) {
            return Ok(channel);
        }

        let uri = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|e| Error::Rpc(format!("Invalid endpoint URI for {cluster_id}: {e}")))?
            .connect_timeout(self.config.connect_timeout);

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to connect to {cluster_id} at {address}: {e}")))?;

        self.channels.insert(cluster_id.clone(), channel.clone());
        debug!(cluster_id = %cluster_id, address = %address, "Opened federation channel");
        Ok(channel)
    }

    /// Drop a cached channel (after a failed call)
    fn invalidate_channel(&self, cluster_id: &ClusterId) {
        self.channels.invalidate(cluster_id);
    }

    /// Build an outbound request carrying the service identity.
    ///
    /// The request is built fresh, so the caller's `authorization` metadata
    /// never crosses the cluster boundary; the explicit remove guards
    /// against callers smuggling it through the message.
    fn service_request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.metadata_mut().remove("authorization");
        if !self.config.service_secret.is_empty() {
            if let Ok(value) = self.config.service_secret.parse::<MetadataValue<_>>() {
                request.metadata_mut().insert(SERVICE_TOKEN_HEADER, value);
            }
        }
        request
    }

    async fn unary<T, F, Fut>(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        rpc_name: &str,
        deadline: Duration,
        call: F,
    ) -> Result<T>
    where
        F: FnOnce(FederationGrpcClient<Channel>) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<tonic::Response<T>, tonic::Status>>,
    {
        let channel = self.channel(cluster_id, address).await?;
        let client = FederationGrpcClient::new(channel);

        let response = timeout(deadline, call(client)).await.map_err(|_| {
            self.invalidate_channel(cluster_id);
            Error::Timeout(format!("{rpc_name} timed out for {cluster_id}"))
        })?;

        match response {
            Ok(response) => Ok(response.into_inner()),
            Err(status) => {
                warn!(
                    cluster_id = %cluster_id,
                    rpc = rpc_name,
                    error = %status,
                    "Federation RPC failed"
                );
                self.invalidate_channel(cluster_id);
                Err(Error::Rpc(format!(
                    "{rpc_name} failed for {cluster_id}: {status}"
                )))
            }
        }
    }

    pub async fn query_stream(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::QueryStreamRequest,
    ) -> Result<pb::QueryStreamResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "QueryStream",
            self.config.call_timeout,
            move |mut client| async move { client.query_stream(req).await },
        )
        .await
    }

    pub async fn notify_origin_pull(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::NotifyOriginPullRequest,
    ) -> Result<pb::NotifyOriginPullResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "NotifyOriginPull",
            self.config.call_timeout,
            move |mut client| async move { client.notify_origin_pull(req).await },
        )
        .await
    }

    pub async fn prepare_artifact(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::PrepareArtifactRequest,
    ) -> Result<pb::PrepareArtifactResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "PrepareArtifact",
            self.config.call_timeout,
            move |mut client| async move { client.prepare_artifact(req).await },
        )
        .await
    }

    pub async fn create_remote_clip(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::CreateRemoteClipRequest,
    ) -> Result<pb::CreateRemoteClipResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "CreateRemoteClip",
            self.config.call_timeout,
            move |mut client| async move { client.create_remote_clip(req).await },
        )
        .await
    }

    pub async fn create_remote_dvr(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::CreateRemoteDvrRequest,
    ) -> Result<pb::CreateRemoteDvrResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "CreateRemoteDvr",
            self.config.call_timeout,
            move |mut client| async move { client.create_remote_dvr(req).await },
        )
        .await
    }

    pub async fn forward_artifact_command(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::ForwardArtifactCommandRequest,
    ) -> Result<pb::ForwardArtifactCommandResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "ForwardArtifactCommand",
            self.config.call_timeout,
            move |mut client| async move { client.forward_artifact_command(req).await },
        )
        .await
    }

    /// Bulk listing; uses the longer deadline.
    pub async fn list_tenant_artifacts(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::ListTenantArtifactsRequest,
    ) -> Result<pb::ListTenantArtifactsResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "ListTenantArtifacts",
            self.config.bulk_call_timeout,
            move |mut client| async move { client.list_tenant_artifacts(req).await },
        )
        .await
    }

    /// Bulk migration; uses the longer deadline.
    pub async fn migrate_artifact_metadata(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        request: pb::MigrateArtifactMetadataRequest,
    ) -> Result<pb::MigrateArtifactMetadataResponse> {
        let req = self.service_request(request);
        self.unary(
            cluster_id,
            address,
            "MigrateArtifactMetadata",
            self.config.bulk_call_timeout,
            move |mut client| async move { client.migrate_artifact_metadata(req).await },
        )
        .await
    }

    /// Open the bidirectional peer channel, returning the raw inbound
    /// stream. The channel is long-lived, so no deadline is applied to the
    /// stream itself.
    pub async fn open_peer_channel<S>(
        &self,
        cluster_id: &ClusterId,
        address: &str,
        outbound: S,
    ) -> Result<tonic::Streaming<pb::PeerMessage>>
    where
        S: futures::Stream<Item = pb::PeerMessage> + Send + 'static,
    {
        let channel = self.channel(cluster_id, address).await?;
        let mut client = FederationGrpcClient::new(channel);

        let request = self.service_request(outbound);
        let response = client.peer_channel(request).await.map_err(|status| {
            self.invalidate_channel(cluster_id);
            Error::Rpc(format!("PeerChannel failed for {cluster_id}: {status}"))
        })?;

        Ok(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = FederationClientConfig::default();
        assert_eq!(config.call_timeout, Duration::from_secs(10));
        assert_eq!(config.bulk_call_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_service_request_carries_service_identity_only() {
        let client = FederationClient::new(FederationClientConfig {
            service_secret: "s3cret".to_string(),
            ..Default::default()
        });

        let request = client.service_request(());
        assert!(request.metadata().get("authorization").is_none());
        assert_eq!(
            request
                .metadata()
                .get(SERVICE_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("s3cret")
        );
    }

    #[test]
    fn test_service_request_without_secret() {
        let client = FederationClient::new(FederationClientConfig::default());
        let request = client.service_request(());
        assert!(request.metadata().get(SERVICE_TOKEN_HEADER).is_none());
    }
}
