//! Federation gRPC server implementation
//!
//! Inbound RPC endpoints plus the receive side of the bidirectional peer
//! channel. Every RPC requires service authentication. Artifact and
//! recording actions are delegated to local collaborators; telemetry from
//! peers is written to the shared cache.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Code, Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

use foghorn_core::models::{
    ArtifactHash, ArtifactKind, ArtifactRecord, ClusterId, GeoPoint, NodeId, StorageState,
    TenantId,
};
use foghorn_core::recording::{ArtifactCommand, ArtifactCommandHandler, ClipRequest, DvrRequest,
    RecordingService};
use foghorn_core::repository::ArtifactStore;
use foghorn_core::state::{EdgeBalancer, StateManager};
use foghorn_core::storage::ObjectStore;

use super::auth::require_service_auth;
use super::foghorn::federation as pb;
use super::foghorn::federation::federation_server::Federation;
use crate::cache::{ActiveReplication, FederationCache};
use crate::peer::receive::apply_peer_payload;

/// Presigned clip/VOD URLs stay valid this long
const ARTIFACT_URL_VALIDITY: Duration = Duration::from_secs(15 * 60);
/// DVR segment URLs stay valid longer; players fetch them over a session
const DVR_URL_VALIDITY: Duration = Duration::from_secs(30 * 60);

/// Candidates returned per stream query
const MAX_STREAM_CANDIDATES: usize = 10;

/// Federation gRPC service
///
/// Collaborators are injected at construction. The recording service and
/// the artifact command handler are built after the server in the full
/// process, so they occupy optional slots.
pub struct FederationServer {
    cluster_id: ClusterId,
    state: Arc<dyn StateManager>,
    balancer: Arc<dyn EdgeBalancer>,
    artifacts: Arc<dyn ArtifactStore>,
    objects: Arc<dyn ObjectStore>,
    cache: Option<Arc<FederationCache>>,
    recording: Option<Arc<dyn RecordingService>>,
    command_handler: Option<Arc<dyn ArtifactCommandHandler>>,
}

impl FederationServer {
    #[must_use]
    pub fn new(
        cluster_id: ClusterId,
        state: Arc<dyn StateManager>,
        balancer: Arc<dyn EdgeBalancer>,
        artifacts: Arc<dyn ArtifactStore>,
        objects: Arc<dyn ObjectStore>,
        cache: Option<Arc<FederationCache>>,
    ) -> Self {
        Self {
            cluster_id,
            state,
            balancer,
            artifacts,
            objects,
            cache,
            recording: None,
            command_handler: None,
        }
    }

    #[must_use]
    pub fn with_recording_service(mut self, recording: Arc<dyn RecordingService>) -> Self {
        self.recording = Some(recording);
        self
    }

    #[must_use]
    pub fn with_artifact_command_handler(
        mut self,
        handler: Arc<dyn ArtifactCommandHandler>,
    ) -> Self {
        self.command_handler = Some(handler);
        self
    }

    fn proto_geo(location: Option<GeoPoint>) -> (Option<f64>, Option<f64>) {
        match location {
            Some(geo) => (Some(geo.latitude), Some(geo.longitude)),
            None => (None, None),
        }
    }

    /// Object key holding a synced clip/VOD artifact
    fn artifact_object_key(record: &ArtifactRecord) -> String {
        let prefix = match record.kind {
            ArtifactKind::Clip => "clips",
            ArtifactKind::Vod => "vod",
            ArtifactKind::Dvr => "dvr",
        };
        format!(
            "{prefix}/{}/{}.{}",
            record.tenant_id, record.hash, record.format
        )
    }

    /// Prefix under which a DVR recording's segments live
    fn dvr_prefix(record: &ArtifactRecord) -> String {
        format!("dvr/{}/{}/", record.tenant_id, record.hash)
    }
}

fn not_ready(est_ready_seconds: u32) -> pb::PrepareArtifactResponse {
    pb::PrepareArtifactResponse {
        ready: false,
        est_ready_seconds,
        ..Default::default()
    }
}

fn prepare_error(error: &str) -> pb::PrepareArtifactResponse {
    pb::PrepareArtifactResponse {
        ready: false,
        error: error.to_string(),
        ..Default::default()
    }
}

fn pull_rejected(reason: &str) -> pb::NotifyOriginPullResponse {
    pb::NotifyOriginPullResponse {
        accepted: false,
        reason: reason.to_string(),
        ..Default::default()
    }
}

fn command_failed(error: String) -> pb::ForwardArtifactCommandResponse {
    pb::ForwardArtifactCommandResponse {
        handled: false,
        error,
    }
}

fn artifact_meta(record: &ArtifactRecord) -> pb::ArtifactMeta {
    pb::ArtifactMeta {
        artifact_hash: record.hash.to_string(),
        artifact_type: record.kind.as_str().to_string(),
        format: record.format.clone(),
        size_bytes: record.size_bytes,
        internal_name: record.internal_name.clone(),
        stream_id: record.stream_id.clone().unwrap_or_default(),
        created_at: record.created_at.timestamp(),
        storage_state: match record.storage_state {
            StorageState::Local => "local",
            StorageState::Freezing => "freezing",
            StorageState::Frozen => "frozen",
            StorageState::Defrosting => "defrosting",
            StorageState::Unknown => "unknown",
        }
        .to_string(),
        synced: record.synced,
    }
}

/// Drive the receive side of one inbound peer channel.
///
/// The first message must carry a non-empty `cluster_id` that is not this
/// cluster's; later messages may omit it but must never contradict it. EOF
/// and client cancellation end the stream successfully.
pub(crate) async fn serve_peer_channel<S>(
    self_cluster: &ClusterId,
    cache: Option<&FederationCache>,
    mut inbound: S,
) -> Result<(), Status>
where
    S: Stream<Item = Result<pb::PeerMessage, Status>> + Unpin,
{
    let mut bound: Option<ClusterId> = None;

    loop {
        match inbound.next().await {
            Some(Ok(message)) => {
                let peer = match &bound {
                    None => {
                        if message.cluster_id.is_empty() {
                            return Err(Status::invalid_argument(
                                "first peer message must carry a cluster_id",
                            ));
                        }
                        if message.cluster_id == self_cluster.as_str() {
                            return Err(Status::permission_denied(
                                "refusing peer channel from own cluster",
                            ));
                        }
                        let peer = ClusterId::from_string(message.cluster_id.clone());
                        info!(peer = %peer, "Peer channel established");
                        bound = Some(peer.clone());
                        peer
                    }
                    Some(peer) => {
                        if !message.cluster_id.is_empty() && message.cluster_id != peer.as_str() {
                            return Err(Status::permission_denied("peer channel cluster_id mismatch"));
                        }
                        peer.clone()
                    }
                };

                // Messages without a payload are ignored
                if let (Some(cache), Some(payload)) = (cache, message.payload) {
                    apply_peer_payload(cache, &peer, payload, false).await;
                }
            }
            Some(Err(status)) if status.code() == Code::Cancelled => {
                debug!(peer = ?bound, "Peer channel cancelled by client");
                return Ok(());
            }
            Some(Err(status)) => {
                warn!(peer = ?bound, error = %status, "Peer channel receive failed");
                return Err(status);
            }
            None => {
                debug!(peer = ?bound, "Peer channel closed");
                return Ok(());
            }
        }
    }
}

#[tonic::async_trait]
impl Federation for FederationServer {
    /// Score local candidates for a stream on behalf of a peer cluster
    async fn query_stream(
        &self,
        request: Request<pb::QueryStreamRequest>,
    ) -> Result<Response<pb::QueryStreamResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.stream_name.is_empty() || req.tenant_id.is_empty() || req.requesting_cluster.is_empty()
        {
            return Err(Status::invalid_argument(
                "stream_name, tenant_id and requesting_cluster are required",
            ));
        }
        if req.requesting_cluster == self.cluster_id.as_str() {
            return Err(Status::invalid_argument("refusing query from own cluster"));
        }

        let stream = self.state.stream(&req.stream_name).await;

        // Tenant isolation: a known stream owned by a different tenant
        // yields no candidates, indistinguishable from an unknown stream.
        if let Some(stream) = &stream {
            if !stream.tenant_id.is_empty() && stream.tenant_id.as_str() != req.tenant_id {
                return Ok(Response::new(pb::QueryStreamResponse {
                    candidates: Vec::new(),
                    origin_cluster_id: self.cluster_id.to_string(),
                }));
            }
        }

        let viewer_location = match (req.viewer_lat, req.viewer_lon) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let tenant = TenantId::from(req.tenant_id.clone());
        let scored = self
            .balancer
            .score_nodes(
                &req.stream_name,
                &tenant,
                viewer_location,
                MAX_STREAM_CANDIDATES,
            )
            .await;

        let mut candidates = Vec::with_capacity(scored.len());
        for entry in scored {
            let Some(node) = self.state.node(&entry.node_id).await else {
                continue;
            };
            let dtsc_url = self
                .state
                .dtsc_url(&entry.node_id, &req.stream_name)
                .await
                .unwrap_or_default();
            let edge_state = stream
                .as_ref()
                .and_then(|s| s.edges.iter().find(|e| e.node_id == entry.node_id));
            let is_origin = stream.as_ref().is_some_and(|s| s.is_origin(&entry.node_id));
            if req.is_source_selection && !is_origin {
                continue;
            }
            let (latitude, longitude) = Self::proto_geo(node.location);
            candidates.push(pb::StreamCandidate {
                node_id: node.node_id.to_string(),
                base_url: node.base_url,
                dtsc_url,
                viewer_count: node.viewer_count,
                cpu: node.cpu,
                bandwidth_available: node.bandwidth_available,
                ram_used: node.ram_used,
                ram_max: node.ram_max,
                latitude,
                longitude,
                buffer_state: edge_state
                    .map(|e| e.buffer_state)
                    .unwrap_or_default()
                    .as_str()
                    .to_string(),
                is_origin,
                score: entry.score,
            });
        }

        Ok(Response::new(pb::QueryStreamResponse {
            candidates,
            origin_cluster_id: self.cluster_id.to_string(),
        }))
    }

    /// Accept (or refuse) an origin-pull of a locally originated stream
    async fn notify_origin_pull(
        &self,
        request: Request<pb::NotifyOriginPullRequest>,
    ) -> Result<Response<pb::NotifyOriginPullResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.stream_name.is_empty()
            || req.tenant_id.is_empty()
            || req.dest_cluster_id.is_empty()
            || req.dest_node_id.is_empty()
        {
            return Err(Status::invalid_argument(
                "stream_name, tenant_id, dest_cluster_id and dest_node_id are required",
            ));
        }

        // 1. Elect a source when the caller did not pick one
        let source_node = if req.source_node_id.is_empty() {
            match self.balancer.best_source_node(&req.stream_name).await {
                Some(node) => node,
                None => {
                    return Ok(Response::new(pull_rejected(
                        "no source node with active inputs",
                    )))
                }
            }
        } else {
            NodeId::from(req.source_node_id.clone())
        };

        // 2. Resolve the pull URL
        let Some(dtsc_url) = self.state.dtsc_url(&source_node, &req.stream_name).await else {
            return Ok(Response::new(pull_rejected("cannot build pull url")));
        };

        // 3. Stream must exist locally under the caller's tenant
        let Some(stream) = self.state.stream(&req.stream_name).await else {
            return Ok(Response::new(pull_rejected("stream not found locally")));
        };
        if !stream.tenant_id.is_empty() && stream.tenant_id.as_str() != req.tenant_id {
            // Same answer as an unknown stream so tenants cannot probe
            // each other's namespaces
            return Ok(Response::new(pull_rejected("stream not found locally")));
        }

        // 4. Record the in-flight replication; without the record the
        //    completion watcher could never close the loop, so a cache
        //    failure refuses the pull.
        let Some(cache) = &self.cache else {
            return Ok(Response::new(pull_rejected(
                "replication tracking unavailable",
            )));
        };
        let record = ActiveReplication {
            stream_name: req.stream_name.clone(),
            source_cluster: self.cluster_id.clone(),
            source_node: source_node.clone(),
            dest_cluster: ClusterId::from_string(req.dest_cluster_id.clone()),
            dest_node: NodeId::from(req.dest_node_id.clone()),
            dtsc_url: dtsc_url.clone(),
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = cache.set_active_replication(&record).await {
            warn!(stream = %req.stream_name, error = %e, "Failed to record replication intent");
            return Ok(Response::new(pull_rejected(
                "failed to record replication intent",
            )));
        }

        info!(
            stream = %req.stream_name,
            source_node = %source_node,
            dest_cluster = %req.dest_cluster_id,
            dest_node = %req.dest_node_id,
            "Accepted origin pull"
        );

        Ok(Response::new(pb::NotifyOriginPullResponse {
            accepted: true,
            reason: String::new(),
            dtsc_url,
            source_node_id: source_node.to_string(),
        }))
    }

    /// Stage an artifact for cross-cluster download
    async fn prepare_artifact(
        &self,
        request: Request<pb::PrepareArtifactRequest>,
    ) -> Result<Response<pb::PrepareArtifactResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.artifact_hash.is_empty() || req.tenant_id.is_empty() {
            return Err(Status::invalid_argument(
                "artifact_hash and tenant_id are required",
            ));
        }

        let hash = ArtifactHash::from(req.artifact_hash.clone());
        let tenant = TenantId::from(req.tenant_id.clone());
        let record = self
            .artifacts
            .find(&hash, &tenant)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;
        let Some(record) = record else {
            return Err(Status::not_found("artifact not found"));
        };

        if !record.synced {
            return Ok(Response::new(match record.storage_state {
                StorageState::Local | StorageState::Freezing => {
                    // Fire the upload; the caller polls again shortly.
                    // Triggering is idempotent for an upload already in
                    // flight.
                    let artifacts = Arc::clone(&self.artifacts);
                    let freeze_hash = hash.clone();
                    tokio::spawn(async move {
                        if let Err(e) = artifacts.trigger_freeze(&freeze_hash).await {
                            warn!(hash = %freeze_hash, error = %e, "Freeze trigger failed");
                        }
                    });
                    not_ready(30)
                }
                StorageState::Defrosting => not_ready(15),
                // Unrecognized states read as in-flight storage work, not
                // errors; a conservative retry interval covers them.
                StorageState::Frozen | StorageState::Unknown => not_ready(60),
            }));
        }

        if !req.artifact_type.is_empty() {
            match ArtifactKind::parse(&req.artifact_type) {
                Some(kind) if kind == record.kind => {}
                _ => return Ok(Response::new(prepare_error("artifact type mismatch"))),
            }
        }

        match record.kind {
            ArtifactKind::Clip | ArtifactKind::Vod => {
                let key = Self::artifact_object_key(&record);
                let url = self
                    .objects
                    .presign_get(&key, ARTIFACT_URL_VALIDITY)
                    .await
                    .map_err(|e| Status::internal(e.to_string()))?;
                Ok(Response::new(pb::PrepareArtifactResponse {
                    ready: true,
                    url,
                    size_bytes: record.size_bytes,
                    format: record.format.clone(),
                    internal_name: record.internal_name.clone(),
                    artifact_type: record.kind.as_str().to_string(),
                    ..Default::default()
                }))
            }
            ArtifactKind::Dvr => {
                let prefix = Self::dvr_prefix(&record);
                let keys = self
                    .objects
                    .list(&prefix)
                    .await
                    .map_err(|e| Status::internal(e.to_string()))?;
                if keys.is_empty() {
                    return Ok(Response::new(prepare_error("no dvr segments found")));
                }
                let mut segment_urls = Vec::with_capacity(keys.len());
                for key in keys {
                    let url = self
                        .objects
                        .presign_get(&key, DVR_URL_VALIDITY)
                        .await
                        .map_err(|e| Status::internal(e.to_string()))?;
                    segment_urls.push(url);
                }
                Ok(Response::new(pb::PrepareArtifactResponse {
                    ready: true,
                    segment_urls,
                    size_bytes: record.size_bytes,
                    format: record.format.clone(),
                    internal_name: record.internal_name.clone(),
                    artifact_type: record.kind.as_str().to_string(),
                    ..Default::default()
                }))
            }
        }
    }

    /// Cut a clip from a locally live stream on behalf of a peer
    async fn create_remote_clip(
        &self,
        request: Request<pb::CreateRemoteClipRequest>,
    ) -> Result<Response<pb::CreateRemoteClipResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.stream_name.is_empty() || req.tenant_id.is_empty() {
            return Err(Status::invalid_argument(
                "stream_name and tenant_id are required",
            ));
        }

        let rejected = |reason: &str| pb::CreateRemoteClipResponse {
            accepted: false,
            reason: reason.to_string(),
            ..Default::default()
        };

        let Some(stream) = self.state.stream(&req.stream_name).await else {
            return Ok(Response::new(rejected("stream not live locally")));
        };
        if !stream.tenant_id.is_empty() && stream.tenant_id.as_str() != req.tenant_id {
            return Ok(Response::new(rejected("stream not live locally")));
        }
        let Some(recording) = &self.recording else {
            return Ok(Response::new(rejected("clip service unavailable")));
        };

        match recording
            .create_clip(ClipRequest {
                internal_name: req.stream_name.clone(),
                tenant_id: TenantId::from(req.tenant_id.clone()),
                start_unix: req.start_unix,
                end_unix: req.end_unix,
                title: req.title.clone(),
            })
            .await
        {
            Ok(created) => Ok(Response::new(pb::CreateRemoteClipResponse {
                accepted: true,
                reason: String::new(),
                clip_hash: created.hash.to_string(),
                storage_node_id: created
                    .storage_node_id
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            })),
            Err(e) => Ok(Response::new(rejected(&e.to_string()))),
        }
    }

    /// Start a DVR recording of a locally live stream on behalf of a peer
    async fn create_remote_dvr(
        &self,
        request: Request<pb::CreateRemoteDvrRequest>,
    ) -> Result<Response<pb::CreateRemoteDvrResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.stream_name.is_empty() || req.tenant_id.is_empty() {
            return Err(Status::invalid_argument(
                "stream_name and tenant_id are required",
            ));
        }

        let rejected = |reason: &str| pb::CreateRemoteDvrResponse {
            accepted: false,
            reason: reason.to_string(),
            ..Default::default()
        };

        let Some(stream) = self.state.stream(&req.stream_name).await else {
            return Ok(Response::new(rejected("stream not live locally")));
        };
        if !stream.tenant_id.is_empty() && stream.tenant_id.as_str() != req.tenant_id {
            return Ok(Response::new(rejected("stream not live locally")));
        }
        let Some(recording) = &self.recording else {
            return Ok(Response::new(rejected("dvr service unavailable")));
        };

        match recording
            .create_dvr(DvrRequest {
                internal_name: req.stream_name.clone(),
                tenant_id: TenantId::from(req.tenant_id.clone()),
                retention_hours: req.retention_hours,
            })
            .await
        {
            Ok(created) => Ok(Response::new(pb::CreateRemoteDvrResponse {
                accepted: true,
                reason: String::new(),
                dvr_hash: created.hash.to_string(),
                storage_node_id: created
                    .storage_node_id
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            })),
            Err(e) => Ok(Response::new(rejected(&e.to_string()))),
        }
    }

    /// Execute an artifact command forwarded by the cluster that received it
    async fn forward_artifact_command(
        &self,
        request: Request<pb::ForwardArtifactCommandRequest>,
    ) -> Result<Response<pb::ForwardArtifactCommandResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.command.is_empty() || req.artifact_hash.is_empty() || req.tenant_id.is_empty() {
            return Err(Status::invalid_argument(
                "command, artifact_hash and tenant_id are required",
            ));
        }

        let Some(command) = ArtifactCommand::parse(&req.command) else {
            return Ok(Response::new(command_failed(format!(
                "unknown command: {}",
                req.command
            ))));
        };

        let hash = ArtifactHash::from(req.artifact_hash.clone());
        let tenant = TenantId::from(req.tenant_id.clone());

        // stop_dvr may carry the stream it is expected to stop; refuse the
        // command when the stored recording belongs to a different stream.
        if command == ArtifactCommand::StopDvr && !req.stream_id.is_empty() {
            match self.artifacts.find(&hash, &tenant).await {
                Ok(Some(record)) => {
                    if record.stream_id.as_deref() != Some(req.stream_id.as_str()) {
                        return Ok(Response::new(command_failed(
                            "stream_id mismatch".to_string(),
                        )));
                    }
                }
                Ok(None) => {}
                Err(e) => return Ok(Response::new(command_failed(e.to_string()))),
            }
        }

        let Some(handler) = &self.command_handler else {
            return Ok(Response::new(command_failed(
                "no artifact command handler registered".to_string(),
            )));
        };

        // no_forward stops the handler from bouncing the command back
        // across the mesh
        match handler.handle(command, &hash, &tenant, true).await {
            Ok(()) => Ok(Response::new(pb::ForwardArtifactCommandResponse {
                handled: true,
                error: String::new(),
            })),
            Err(e) if e.is_not_found() => Ok(Response::new(pb::ForwardArtifactCommandResponse {
                handled: false,
                error: String::new(),
            })),
            Err(e) => Ok(Response::new(command_failed(e.to_string()))),
        }
    }

    async fn list_tenant_artifacts(
        &self,
        request: Request<pb::ListTenantArtifactsRequest>,
    ) -> Result<Response<pb::ListTenantArtifactsResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        if req.tenant_id.is_empty() {
            return Err(Status::invalid_argument("tenant_id is required"));
        }
        let kind = if req.artifact_type.is_empty() {
            None
        } else {
            match ArtifactKind::parse(&req.artifact_type) {
                Some(kind) => Some(kind),
                None => {
                    return Err(Status::invalid_argument(format!(
                        "unknown artifact type: {}",
                        req.artifact_type
                    )))
                }
            }
        };

        let records = self
            .artifacts
            .list_by_tenant(&TenantId::from(req.tenant_id), kind)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(pb::ListTenantArtifactsResponse {
            artifacts: records.iter().map(artifact_meta).collect(),
        }))
    }

    async fn migrate_artifact_metadata(
        &self,
        request: Request<pb::MigrateArtifactMetadataRequest>,
    ) -> Result<Response<pb::MigrateArtifactMetadataResponse>, Status> {
        require_service_auth(&request)?;
        let req = request.into_inner();

        let failed = |error: String| pb::MigrateArtifactMetadataResponse {
            migrated: false,
            error,
        };

        if req.tenant_id.is_empty() {
            return Err(Status::invalid_argument("tenant_id is required"));
        }
        let Some(meta) = req.artifact else {
            return Err(Status::invalid_argument("artifact is required"));
        };
        let Some(kind) = ArtifactKind::parse(&meta.artifact_type) else {
            return Ok(Response::new(failed(format!(
                "unknown artifact type: {}",
                meta.artifact_type
            ))));
        };

        let record = ArtifactRecord {
            hash: ArtifactHash::from(meta.artifact_hash),
            tenant_id: TenantId::from(req.tenant_id),
            internal_name: meta.internal_name,
            kind,
            format: meta.format,
            storage_state: StorageState::parse(&meta.storage_state),
            synced: meta.synced,
            size_bytes: meta.size_bytes,
            stream_id: (!meta.stream_id.is_empty()).then_some(meta.stream_id),
            created_at: chrono::DateTime::from_timestamp(meta.created_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        };

        match self.artifacts.upsert(record).await {
            Ok(()) => Ok(Response::new(pb::MigrateArtifactMetadataResponse {
                migrated: true,
                error: String::new(),
            })),
            Err(e) => Ok(Response::new(failed(e.to_string()))),
        }
    }

    type PeerChannelStream =
        Pin<Box<dyn Stream<Item = Result<pb::PeerMessage, Status>> + Send + 'static>>;

    /// Receive side of the bidirectional peer channel
    async fn peer_channel(
        &self,
        request: Request<Streaming<pb::PeerMessage>>,
    ) -> Result<Response<Self::PeerChannelStream>, Status> {
        require_service_auth(&request)?;
        let inbound = request.into_inner();
        let cluster_id = self.cluster_id.clone();
        let cache = self.cache.clone();

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        tokio::spawn(async move {
            if let Err(status) = serve_peer_channel(&cluster_id, cache.as_deref(), inbound).await {
                let _ = tx.send(Err(status)).await;
            }
            // Dropping the sender completes the response stream
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryBackend;
    use crate::error::Error as FederationError;
    use async_trait::async_trait;
    use foghorn_core::state::ScoredNode;
    use foghorn_core::test_helpers::{
        test_artifact, test_node, test_stream, CommandProbe, FakeObjectStore,
        InMemoryArtifactStore, InMemoryStateManager, RecordingStub, StaticBalancer,
    };
    use std::collections::HashMap;

    /// Backend that fails every operation, for cache-outage paths
    struct FailingBackend;

    #[async_trait]
    impl crate::cache::Backend for FailingBackend {
        async fn get(&self, _: &str) -> crate::error::Result<Option<String>> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn set_ex(&self, _: &str, _: &str, _: Duration) -> crate::error::Result<()> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn set_nx_px(&self, _: &str, _: &str, _: Duration) -> crate::error::Result<bool> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn del(&self, _: &str) -> crate::error::Result<()> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn expire_if_equal(
            &self,
            _: &str,
            _: &str,
            _: Duration,
        ) -> crate::error::Result<bool> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn del_if_equal(&self, _: &str, _: &str) -> crate::error::Result<bool> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn replace_hash(
            &self,
            _: &str,
            _: &HashMap<String, String>,
            _: Duration,
        ) -> crate::error::Result<()> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn hgetall(&self, _: &str) -> crate::error::Result<HashMap<String, String>> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn scan_keys(&self, _: &str, _: usize) -> crate::error::Result<Vec<String>> {
            Err(FederationError::Redis("backend down".to_string()))
        }
        async fn mget(&self, _: &[String]) -> crate::error::Result<Vec<Option<String>>> {
            Err(FederationError::Redis("backend down".to_string()))
        }
    }

    struct Fixture {
        state: Arc<InMemoryStateManager>,
        balancer: Arc<StaticBalancer>,
        artifacts: Arc<InMemoryArtifactStore>,
        objects: Arc<FakeObjectStore>,
        cache: Arc<FederationCache>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_objects(Vec::new())
        }

        fn with_objects(objects: Vec<String>) -> Self {
            Self {
                state: Arc::new(InMemoryStateManager::new()),
                balancer: Arc::new(StaticBalancer::new()),
                artifacts: Arc::new(InMemoryArtifactStore::new()),
                objects: Arc::new(FakeObjectStore::new().with_objects(objects)),
                cache: Arc::new(FederationCache::new(
                    Arc::new(MemoryBackend::new()),
                    ClusterId::from("cluster-a"),
                )),
            }
        }

        fn server(&self) -> FederationServer {
            FederationServer::new(
                ClusterId::from("cluster-a"),
                self.state.clone(),
                self.balancer.clone(),
                self.artifacts.clone(),
                self.objects.clone(),
                Some(self.cache.clone()),
            )
        }
    }

    fn service_request<T>(message: T) -> Request<T> {
        let mut request = Request::new(message);
        request
            .extensions_mut()
            .insert(crate::grpc::auth::CallType::Service);
        request
    }

    fn message(
        cluster_id: &str,
        payload: Option<pb::peer_message::Payload>,
    ) -> Result<pb::PeerMessage, Status> {
        Ok(pb::PeerMessage {
            cluster_id: cluster_id.to_string(),
            payload,
        })
    }

    #[tokio::test]
    async fn test_rpc_without_service_auth_is_rejected() {
        let fixture = Fixture::new();
        let server = fixture.server();

        let status = server
            .query_stream(Request::new(pb::QueryStreamRequest {
                stream_name: "s".to_string(),
                tenant_id: "t".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                viewer_lat: None,
                viewer_lon: None,
                is_source_selection: false,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_query_stream_rejects_self_and_missing_fields() {
        let fixture = Fixture::new();
        let server = fixture.server();

        let status = server
            .query_stream(service_request(pb::QueryStreamRequest {
                stream_name: String::new(),
                tenant_id: "t".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                viewer_lat: None,
                viewer_lon: None,
                is_source_selection: false,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = server
            .query_stream(service_request(pb::QueryStreamRequest {
                stream_name: "s".to_string(),
                tenant_id: "t".to_string(),
                requesting_cluster: "cluster-a".to_string(),
                viewer_lat: None,
                viewer_lon: None,
                is_source_selection: false,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_query_stream_tenant_isolation_yields_no_candidates() {
        let mut fixture = Fixture::new();
        fixture.balancer = Arc::new(StaticBalancer::new().with_scored(vec![ScoredNode {
            node_id: NodeId::from("n1"),
            score: 0.9,
        }]));
        fixture.state.seed_node(test_node("n1", 5000, 20.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+show", "tenant-a", "n1"));
        let server = fixture.server();

        let response = server
            .query_stream(service_request(pb::QueryStreamRequest {
                stream_name: "tenantA+show".to_string(),
                tenant_id: "tenant-b".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                viewer_lat: None,
                viewer_lon: None,
                is_source_selection: false,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.candidates.is_empty());
        assert_eq!(response.origin_cluster_id, "cluster-a");
    }

    #[tokio::test]
    async fn test_query_stream_enriches_candidates() {
        let mut fixture = Fixture::new();
        fixture.balancer = Arc::new(StaticBalancer::new().with_scored(vec![ScoredNode {
            node_id: NodeId::from("n1"),
            score: 0.9,
        }]));
        fixture.state.seed_node(test_node("n1", 5000, 20.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+show", "tenant-a", "n1"));
        let server = fixture.server();

        let response = server
            .query_stream(service_request(pb::QueryStreamRequest {
                stream_name: "tenantA+show".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                viewer_lat: Some(52.0),
                viewer_lon: Some(4.8),
                is_source_selection: false,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.candidates.len(), 1);
        let candidate = &response.candidates[0];
        assert_eq!(candidate.node_id, "n1");
        assert!(candidate.is_origin);
        assert!(candidate.dtsc_url.starts_with("dtsc://"));
        assert_eq!(candidate.bandwidth_available, 5000);
        assert_eq!(candidate.buffer_state, "full");
    }

    // S2: origin-pull accept with tenant match
    #[tokio::test]
    async fn test_notify_origin_pull_accepts_matching_tenant() {
        let mut fixture = Fixture::new();
        fixture.balancer = Arc::new(StaticBalancer::new().with_source(NodeId::from("src-1")));
        fixture.state.seed_node(test_node("src-1", 8000, 10.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+S", "tenant-a", "src-1"));
        let server = fixture.server();

        let response = server
            .notify_origin_pull(service_request(pb::NotifyOriginPullRequest {
                stream_name: "tenantA+S".to_string(),
                tenant_id: "tenant-a".to_string(),
                source_node_id: String::new(),
                dest_cluster_id: "cluster-b".to_string(),
                dest_node_id: "dest-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.accepted);
        assert!(!response.dtsc_url.is_empty());
        assert_eq!(response.source_node_id, "src-1");

        let stored = fixture
            .cache
            .active_replication("tenantA+S")
            .await
            .unwrap()
            .expect("active replication stored");
        assert_eq!(stored.dest_cluster.as_str(), "cluster-b");
        assert_eq!(stored.dest_node.as_str(), "dest-1");
        assert_eq!(stored.dtsc_url, response.dtsc_url);
    }

    // S3: origin-pull rejects tenant mismatch
    #[tokio::test]
    async fn test_notify_origin_pull_rejects_tenant_mismatch() {
        let mut fixture = Fixture::new();
        fixture.balancer = Arc::new(StaticBalancer::new().with_source(NodeId::from("src-1")));
        fixture.state.seed_node(test_node("src-1", 8000, 10.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+S", "tenant-a", "src-1"));
        let server = fixture.server();

        let response = server
            .notify_origin_pull(service_request(pb::NotifyOriginPullRequest {
                stream_name: "tenantA+S".to_string(),
                tenant_id: "tenant-b".to_string(),
                source_node_id: String::new(),
                dest_cluster_id: "cluster-b".to_string(),
                dest_node_id: "dest-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.accepted);
        assert_eq!(response.reason, "stream not found locally");
        assert!(fixture
            .cache
            .active_replication("tenantA+S")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_notify_origin_pull_requires_cache_write() {
        let mut fixture = Fixture::new();
        fixture.balancer = Arc::new(StaticBalancer::new().with_source(NodeId::from("src-1")));
        fixture.state.seed_node(test_node("src-1", 8000, 10.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+S", "tenant-a", "src-1"));
        fixture.cache = Arc::new(FederationCache::new(
            Arc::new(FailingBackend),
            ClusterId::from("cluster-a"),
        ));
        let server = fixture.server();

        let response = server
            .notify_origin_pull(service_request(pb::NotifyOriginPullRequest {
                stream_name: "tenantA+S".to_string(),
                tenant_id: "tenant-a".to_string(),
                source_node_id: String::new(),
                dest_cluster_id: "cluster-b".to_string(),
                dest_node_id: "dest-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.accepted);
        assert_eq!(response.reason, "failed to record replication intent");
    }

    #[tokio::test]
    async fn test_notify_origin_pull_no_source_available() {
        let fixture = Fixture::new();
        let server = fixture.server();

        let response = server
            .notify_origin_pull(service_request(pb::NotifyOriginPullRequest {
                stream_name: "tenantA+S".to_string(),
                tenant_id: "tenant-a".to_string(),
                source_node_id: String::new(),
                dest_cluster_id: "cluster-b".to_string(),
                dest_node_id: "dest-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.accepted);
        assert_eq!(response.reason, "no source node with active inputs");
    }

    #[tokio::test]
    async fn test_prepare_artifact_not_synced_triggers_freeze() {
        let fixture = Fixture::new();
        let mut record = test_artifact("a1", "tenant-a", ArtifactKind::Clip);
        record.synced = false;
        record.storage_state = StorageState::Local;
        fixture.artifacts.insert(record);
        let server = fixture.server();

        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.ready);
        assert_eq!(response.est_ready_seconds, 30);

        // Freeze fires asynchronously
        tokio::task::yield_now().await;
        assert_eq!(
            fixture.artifacts.freeze_triggers(),
            vec![ArtifactHash::from("a1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_prepare_artifact_defrosting_and_unknown_states() {
        let fixture = Fixture::new();
        let mut record = test_artifact("a1", "tenant-a", ArtifactKind::Clip);
        record.synced = false;
        record.storage_state = StorageState::Defrosting;
        fixture.artifacts.insert(record.clone());
        let server = fixture.server();

        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.ready);
        assert_eq!(response.est_ready_seconds, 15);

        record.storage_state = StorageState::Unknown;
        fixture.artifacts.insert(record);
        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.ready);
        assert_eq!(response.est_ready_seconds, 60);
        assert!(response.error.is_empty());
    }

    #[tokio::test]
    async fn test_prepare_artifact_type_mismatch() {
        let fixture = Fixture::new();
        fixture
            .artifacts
            .insert(test_artifact("a1", "tenant-a", ArtifactKind::Clip));
        let server = fixture.server();

        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: "dvr".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.ready);
        assert_eq!(response.error, "artifact type mismatch");
    }

    #[tokio::test]
    async fn test_prepare_artifact_presigns_clip() {
        let fixture = Fixture::new();
        fixture
            .artifacts
            .insert(test_artifact("a1", "tenant-a", ArtifactKind::Clip));
        let server = fixture.server();

        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: "clip".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.ready);
        assert!(response.url.contains("clips/tenant-a/a1.mp4"));
        assert_eq!(response.size_bytes, 1_048_576);
        assert_eq!(response.format, "mp4");
        assert_eq!(response.artifact_type, "clip");
    }

    #[tokio::test]
    async fn test_prepare_artifact_dvr_segments() {
        let fixture = Fixture::with_objects(vec![
            "dvr/tenant-a/a1/segment_000.ts".to_string(),
            "dvr/tenant-a/a1/segment_001.ts".to_string(),
            "dvr/tenant-a/other/segment_000.ts".to_string(),
        ]);
        fixture
            .artifacts
            .insert(test_artifact("a1", "tenant-a", ArtifactKind::Dvr));
        let server = fixture.server();

        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.ready);
        assert_eq!(response.segment_urls.len(), 2);

        // A DVR with no uploaded segments is an error, not a retry
        let fixture = Fixture::new();
        fixture
            .artifacts
            .insert(test_artifact("a2", "tenant-a", ArtifactKind::Dvr));
        let server = fixture.server();
        let response = server
            .prepare_artifact(service_request(pb::PrepareArtifactRequest {
                artifact_hash: "a2".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                artifact_type: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.ready);
        assert_eq!(response.error, "no dvr segments found");
    }

    #[tokio::test]
    async fn test_create_remote_clip_delegates() {
        let fixture = Fixture::new();
        fixture.state.seed_node(test_node("n1", 5000, 20.0));
        fixture
            .state
            .seed_stream(test_stream("tenantA+show", "tenant-a", "n1"));
        let server = fixture
            .server()
            .with_recording_service(Arc::new(RecordingStub::new()));

        let response = server
            .create_remote_clip(service_request(pb::CreateRemoteClipRequest {
                stream_name: "tenantA+show".to_string(),
                tenant_id: "tenant-a".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                start_unix: Some(100),
                end_unix: Some(200),
                title: Some("highlight".to_string()),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.accepted);
        assert_eq!(response.clip_hash, "clip_tenantA+show");
        assert_eq!(response.storage_node_id, "storage-1");

        // Tenant mismatch refuses without leaking the real tenant
        let response = server
            .create_remote_clip(service_request(pb::CreateRemoteClipRequest {
                stream_name: "tenantA+show".to_string(),
                tenant_id: "tenant-b".to_string(),
                requesting_cluster: "cluster-b".to_string(),
                start_unix: None,
                end_unix: None,
                title: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.accepted);
        assert_eq!(response.reason, "stream not live locally");
    }

    #[tokio::test]
    async fn test_forward_artifact_command_stream_id_mismatch() {
        let fixture = Fixture::new();
        let mut record = test_artifact("a1", "tenant-a", ArtifactKind::Dvr);
        record.stream_id = Some("tenantA+expected".to_string());
        fixture.artifacts.insert(record);
        let probe = Arc::new(CommandProbe::new());
        let server = fixture
            .server()
            .with_artifact_command_handler(probe.clone());

        let response = server
            .forward_artifact_command(service_request(pb::ForwardArtifactCommandRequest {
                command: "stop_dvr".to_string(),
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                stream_id: "tenantA+other".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.handled);
        assert_eq!(response.error, "stream_id mismatch");
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_forward_artifact_command_paths() {
        let fixture = Fixture::new();
        let probe = Arc::new(CommandProbe::new());
        let server = fixture
            .server()
            .with_artifact_command_handler(probe.clone());

        // Happy path carries the no-forward marker
        let response = server
            .forward_artifact_command(service_request(pb::ForwardArtifactCommandRequest {
                command: "delete_clip".to_string(),
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                stream_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.handled);
        let calls = probe.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ArtifactCommand::DeleteClip);
        assert!(calls[0].3, "handler must receive the no-forward marker");

        // NOT_FOUND maps to handled=false without an error
        *probe.not_found.lock() = true;
        let response = server
            .forward_artifact_command(service_request(pb::ForwardArtifactCommandRequest {
                command: "delete_vod".to_string(),
                artifact_hash: "a2".to_string(),
                tenant_id: "tenant-a".to_string(),
                stream_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.handled);
        assert!(response.error.is_empty());

        // Unknown command never reaches the handler
        let before = probe.calls().len();
        let response = server
            .forward_artifact_command(service_request(pb::ForwardArtifactCommandRequest {
                command: "rewind_dvr".to_string(),
                artifact_hash: "a3".to_string(),
                tenant_id: "tenant-a".to_string(),
                stream_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.handled);
        assert!(response.error.contains("unknown command"));
        assert_eq!(probe.calls().len(), before);
    }

    #[tokio::test]
    async fn test_forward_artifact_command_without_handler() {
        let fixture = Fixture::new();
        let server = fixture.server();

        let response = server
            .forward_artifact_command(service_request(pb::ForwardArtifactCommandRequest {
                command: "delete_clip".to_string(),
                artifact_hash: "a1".to_string(),
                tenant_id: "tenant-a".to_string(),
                stream_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.handled);
        assert!(!response.error.is_empty());
    }

    #[tokio::test]
    async fn test_migrate_and_list_tenant_artifacts() {
        let fixture = Fixture::new();
        let server = fixture.server();

        let response = server
            .migrate_artifact_metadata(service_request(pb::MigrateArtifactMetadataRequest {
                tenant_id: "tenant-a".to_string(),
                artifact: Some(pb::ArtifactMeta {
                    artifact_hash: "a1".to_string(),
                    artifact_type: "vod".to_string(),
                    format: "mp4".to_string(),
                    size_bytes: 42,
                    internal_name: "tenantA+old".to_string(),
                    stream_id: String::new(),
                    created_at: 1_700_000_000,
                    storage_state: "frozen".to_string(),
                    synced: true,
                }),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.migrated);

        let listed = server
            .list_tenant_artifacts(service_request(pb::ListTenantArtifactsRequest {
                tenant_id: "tenant-a".to_string(),
                artifact_type: "vod".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(listed.artifacts.len(), 1);
        assert_eq!(listed.artifacts[0].artifact_hash, "a1");
        assert_eq!(listed.artifacts[0].storage_state, "frozen");
    }

    // Property 4: peer channel cluster-id binding
    #[tokio::test]
    async fn test_peer_channel_binding_rules() {
        let cluster = ClusterId::from("cluster-a");

        // Empty cluster_id on the first message
        let stream = futures::stream::iter(vec![message("", None)]);
        let status = serve_peer_channel(&cluster, None, stream).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        // Self-peering
        let stream = futures::stream::iter(vec![message("cluster-a", None)]);
        let status = serve_peer_channel(&cluster, None, stream).await.unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);

        // Mismatching second message
        let stream = futures::stream::iter(vec![
            message("cluster-b", None),
            message("cluster-c", None),
        ]);
        let status = serve_peer_channel(&cluster, None, stream).await.unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);

        // Empty cluster_id after binding is fine; EOF is success
        let stream = futures::stream::iter(vec![
            message("cluster-b", None),
            message("", None),
        ]);
        serve_peer_channel(&cluster, None, stream).await.unwrap();

        // Client cancellation is success
        let stream = futures::stream::iter(vec![
            message("cluster-b", None),
            Err(Status::cancelled("client went away")),
        ]);
        serve_peer_channel(&cluster, None, stream).await.unwrap();
    }

    // S1: a full handshake persists every inbound record type
    #[tokio::test]
    async fn test_peer_channel_persists_inbound_telemetry() {
        let fixture = Fixture::new();
        let cluster = ClusterId::from("cluster-a");

        use pb::peer_message::Payload;
        let messages = vec![
            message(
                "cluster-b",
                Some(Payload::EdgeTelemetry(pb::EdgeTelemetry {
                    stream_name: "s1".to_string(),
                    node_id: "n1".to_string(),
                    base_url: "https://n1.cluster-b.test".to_string(),
                    bandwidth_available: 1000,
                    viewer_count: 7,
                    cpu: 25.0,
                    ram_used: 1_000,
                    ram_max: 8_000,
                    latitude: None,
                    longitude: None,
                })),
            ),
            message(
                "",
                Some(Payload::ReplicationEvent(pb::ReplicationEvent {
                    stream_name: "s-rep".to_string(),
                    node_id: "n1".to_string(),
                    base_url: "https://n1.cluster-b.test".to_string(),
                    dtsc_url: "dtsc://n1.cluster-b.test:4200/s-rep".to_string(),
                    available: true,
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::EdgeSummary(pb::ClusterEdgeSummary {
                    edges: vec![pb::EdgeSnapshot {
                        node_id: "n1".to_string(),
                        base_url: "https://n1.cluster-b.test".to_string(),
                        bandwidth_available: 900,
                        cpu: 30.0,
                    }],
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::StreamLifecycle(pb::StreamLifecycleEvent {
                    internal_name: "s-live".to_string(),
                    tenant_id: "t1".to_string(),
                    is_live: true,
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::StreamLifecycle(pb::StreamLifecycleEvent {
                    internal_name: "s-live".to_string(),
                    tenant_id: "t1".to_string(),
                    is_live: false,
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::StreamAd(pb::StreamAdvertisement {
                    internal_name: "s-ad".to_string(),
                    tenant_id: "t1".to_string(),
                    playback_id: "p1".to_string(),
                    origin_cluster_id: "cluster-b".to_string(),
                    is_live: true,
                    edges: vec![pb::StreamEdge {
                        node_id: "n1".to_string(),
                        base_url: "https://n1.cluster-b.test".to_string(),
                        dtsc_url: "dtsc://n1.cluster-b.test:4200/s-ad".to_string(),
                        is_origin: true,
                        bandwidth_available: 800,
                        cpu: 30.0,
                        viewer_count: 4,
                        latitude: None,
                        longitude: None,
                        buffer_state: "full".to_string(),
                    }],
                    timestamp: 0,
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::ArtifactAd(pb::ArtifactAdvertisement {
                    locations: vec![pb::ArtifactLocation {
                        artifact_hash: "a1".to_string(),
                        artifact_type: "clip".to_string(),
                        node_id: "n1".to_string(),
                        base_url: "https://n1.cluster-b.test".to_string(),
                        size_bytes: 1024,
                        access_count: 3,
                        last_accessed: 1_700_000_000,
                        latitude: None,
                        longitude: None,
                    }],
                })),
            ),
            message(
                "cluster-b",
                Some(Payload::Heartbeat(pb::PeerHeartbeat {
                    protocol_version: 1,
                    stream_count: 5,
                    edge_count: 3,
                    total_bandwidth_available: 10_000,
                    uptime_seconds: 3600,
                    capabilities: vec!["stream_ad".to_string()],
                })),
            ),
        ];

        serve_peer_channel(
            &cluster,
            Some(fixture.cache.as_ref()),
            futures::stream::iter(messages),
        )
        .await
        .unwrap();

        let edges = fixture.cache.remote_edges().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].cluster_id.as_str(), "cluster-b");
        assert_eq!(edges[0].bandwidth_available, 1000);
        assert_eq!(edges[0].viewer_count, 7);

        let replications = fixture.cache.remote_replications().await.unwrap();
        assert_eq!(replications.len(), 1);
        assert_eq!(replications[0].stream_name, "s-rep");

        assert_eq!(fixture.cache.edge_summaries().await.unwrap().len(), 1);
        assert!(fixture
            .cache
            .remote_live_stream("s-live")
            .await
            .unwrap()
            .is_none());

        let ads = fixture.cache.stream_ads().await.unwrap();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].internal_name, "s-ad");
        assert_eq!(
            fixture
                .cache
                .playback_index(&foghorn_core::models::PlaybackId::from_string(
                    "p1".to_string()
                ))
                .await
                .unwrap()
                .as_deref(),
            Some("s-ad")
        );

        let artifacts = fixture.cache.remote_artifacts().await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].hash.as_str(), "a1");

        let heartbeats = fixture.cache.peer_heartbeats().await.unwrap();
        assert_eq!(heartbeats.len(), 1);
        assert_eq!(heartbeats[0].stream_count, 5);
        assert_eq!(heartbeats[0].edge_count, 3);
    }
}
