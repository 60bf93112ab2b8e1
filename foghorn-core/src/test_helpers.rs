//! Test helpers and fixtures for foghorn tests
//!
//! In-memory stand-ins for the collaborators the federation core talks to
//! (state manager, balancer, artifact table, object storage, discovery),
//! plus common fixtures. Used across crates to keep tests free of real
//! Postgres/S3/Quartermaster backends.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::discovery::{DiscoveredPeer, PeerDiscovery};
use crate::error::{Error, Result};
use crate::models::{
    ArtifactHash, ArtifactKind, ArtifactRecord, BufferState, EdgeNode, GeoPoint, NodeId,
    PlaybackId, StorageState, StreamEdgeState, StreamInfo, TenantId,
};
use crate::recording::{
    ArtifactCommand, ArtifactCommandHandler, ClipRequest, DvrRequest, RecordingCreated,
    RecordingService,
};
use crate::repository::ArtifactStore;
use crate::state::{EdgeBalancer, ScoredNode, StateManager};
use crate::storage::ObjectStore;

/// Seedable in-memory state manager
#[derive(Default)]
pub struct InMemoryStateManager {
    inner: RwLock<StateInner>,
}

#[derive(Default)]
struct StateInner {
    streams: HashMap<String, StreamInfo>,
    nodes: HashMap<NodeId, EdgeNode>,
    live_on: HashSet<(String, NodeId)>,
}

impl InMemoryStateManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_node(&self, node: EdgeNode) {
        self.inner.write().nodes.insert(node.node_id.clone(), node);
    }

    /// Seed a stream; its origin node and serving edges are marked live.
    pub fn seed_stream(&self, stream: StreamInfo) {
        let mut inner = self.inner.write();
        if let Some(origin) = &stream.origin_node {
            inner
                .live_on
                .insert((stream.internal_name.clone(), origin.clone()));
        }
        for edge in &stream.edges {
            inner
                .live_on
                .insert((stream.internal_name.clone(), edge.node_id.clone()));
        }
        inner.streams.insert(stream.internal_name.clone(), stream);
    }

    /// Mark `internal_name` live on `node_id`, creating a minimal stream
    /// entry when none was seeded.
    pub fn promote(&self, internal_name: &str, node_id: &NodeId) {
        let mut inner = self.inner.write();
        inner
            .live_on
            .insert((internal_name.to_string(), node_id.clone()));
        inner
            .streams
            .entry(internal_name.to_string())
            .or_insert_with(|| StreamInfo {
                internal_name: internal_name.to_string(),
                tenant_id: TenantId::default(),
                playback_id: None,
                origin_node: Some(node_id.clone()),
                has_active_inputs: true,
                edges: Vec::new(),
            });
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.streams.clear();
        inner.nodes.clear();
        inner.live_on.clear();
    }
}

#[async_trait]
impl StateManager for InMemoryStateManager {
    async fn live_streams(&self) -> Vec<StreamInfo> {
        self.inner.read().streams.values().cloned().collect()
    }

    async fn stream(&self, internal_name: &str) -> Option<StreamInfo> {
        self.inner.read().streams.get(internal_name).cloned()
    }

    async fn nodes(&self) -> Vec<EdgeNode> {
        self.inner.read().nodes.values().cloned().collect()
    }

    async fn node(&self, node_id: &NodeId) -> Option<EdgeNode> {
        self.inner.read().nodes.get(node_id).cloned()
    }

    async fn is_stream_live_on_node(&self, internal_name: &str, node_id: &NodeId) -> bool {
        self.inner
            .read()
            .live_on
            .contains(&(internal_name.to_string(), node_id.clone()))
    }

    async fn dtsc_url(&self, node_id: &NodeId, internal_name: &str) -> Option<String> {
        let inner = self.inner.read();
        let node = inner.nodes.get(node_id)?;
        let host = node
            .base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        Some(format!("dtsc://{host}:4200/{internal_name}"))
    }
}

/// Balancer returning canned scores
#[derive(Default)]
pub struct StaticBalancer {
    scored: Mutex<Vec<ScoredNode>>,
    source: Mutex<Option<NodeId>>,
}

impl StaticBalancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scored(self, scored: Vec<ScoredNode>) -> Self {
        *self.scored.lock() = scored;
        self
    }

    #[must_use]
    pub fn with_source(self, source: NodeId) -> Self {
        *self.source.lock() = Some(source);
        self
    }
}

#[async_trait]
impl EdgeBalancer for StaticBalancer {
    async fn score_nodes(
        &self,
        _internal_name: &str,
        _tenant_id: &TenantId,
        _viewer_location: Option<GeoPoint>,
        limit: usize,
    ) -> Vec<ScoredNode> {
        let mut scored = self.scored.lock().clone();
        scored.truncate(limit);
        scored
    }

    async fn best_source_node(&self, _internal_name: &str) -> Option<NodeId> {
        self.source.lock().clone()
    }
}

/// In-memory artifact table
#[derive(Default)]
pub struct InMemoryArtifactStore {
    records: RwLock<HashMap<String, ArtifactRecord>>,
    freeze_triggers: Mutex<Vec<ArtifactHash>>,
}

impl InMemoryArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: ArtifactRecord) {
        self.records
            .write()
            .insert(record.hash.as_str().to_string(), record);
    }

    /// Hashes for which a freeze was triggered, in order
    #[must_use]
    pub fn freeze_triggers(&self) -> Vec<ArtifactHash> {
        self.freeze_triggers.lock().clone()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn find(
        &self,
        hash: &ArtifactHash,
        tenant_id: &TenantId,
    ) -> Result<Option<ArtifactRecord>> {
        Ok(self
            .records
            .read()
            .get(hash.as_str())
            .filter(|r| &r.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<ArtifactRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| &r.tenant_id == tenant_id)
            .filter(|r| kind.is_none_or(|k| r.kind == k))
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: ArtifactRecord) -> Result<()> {
        self.insert(record);
        Ok(())
    }

    async fn trigger_freeze(&self, hash: &ArtifactHash) -> Result<()> {
        self.freeze_triggers.lock().push(hash.clone());
        Ok(())
    }
}

/// Object store that presigns deterministic URLs over a seeded key list
#[derive(Default)]
pub struct FakeObjectStore {
    objects: RwLock<Vec<String>>,
}

impl FakeObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_objects(self, keys: Vec<String>) -> Self {
        *self.objects.write() = keys;
        self
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn presign_get(&self, key: &str, validity: Duration) -> Result<String> {
        Ok(format!(
            "https://storage.test/{key}?X-Expires={}",
            validity.as_secs()
        ))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Discovery service returning a fixed peer list
#[derive(Default)]
pub struct StaticDiscovery {
    peers: RwLock<Vec<DiscoveredPeer>>,
}

impl StaticDiscovery {
    #[must_use]
    pub fn new(peers: Vec<DiscoveredPeer>) -> Self {
        Self {
            peers: RwLock::new(peers),
        }
    }

    pub fn set_peers(&self, peers: Vec<DiscoveredPeer>) {
        *self.peers.write() = peers;
    }
}

#[async_trait]
impl PeerDiscovery for StaticDiscovery {
    async fn list_peers(&self) -> Result<Vec<DiscoveredPeer>> {
        Ok(self.peers.read().clone())
    }
}

/// Recording service producing deterministic hashes
#[derive(Default)]
pub struct RecordingStub {
    fail_with: Mutex<Option<String>>,
}

impl RecordingStub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failure(&self, reason: &str) {
        *self.fail_with.lock() = Some(reason.to_string());
    }
}

#[async_trait]
impl RecordingService for RecordingStub {
    async fn create_clip(&self, request: ClipRequest) -> Result<RecordingCreated> {
        if let Some(reason) = self.fail_with.lock().clone() {
            return Err(Error::Internal(reason));
        }
        Ok(RecordingCreated {
            hash: ArtifactHash::from_string(format!("clip_{}", request.internal_name)),
            storage_node_id: Some(NodeId::from_string("storage-1".to_string())),
        })
    }

    async fn create_dvr(&self, request: DvrRequest) -> Result<RecordingCreated> {
        if let Some(reason) = self.fail_with.lock().clone() {
            return Err(Error::Internal(reason));
        }
        Ok(RecordingCreated {
            hash: ArtifactHash::from_string(format!("dvr_{}", request.internal_name)),
            storage_node_id: Some(NodeId::from_string("storage-1".to_string())),
        })
    }
}

/// Command handler that records every invocation
#[derive(Default)]
pub struct CommandProbe {
    calls: Mutex<Vec<(ArtifactCommand, ArtifactHash, TenantId, bool)>>,
    pub not_found: Mutex<bool>,
}

impl CommandProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<(ArtifactCommand, ArtifactHash, TenantId, bool)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ArtifactCommandHandler for CommandProbe {
    async fn handle(
        &self,
        command: ArtifactCommand,
        hash: &ArtifactHash,
        tenant_id: &TenantId,
        no_forward: bool,
    ) -> Result<()> {
        self.calls
            .lock()
            .push((command, hash.clone(), tenant_id.clone(), no_forward));
        if *self.not_found.lock() {
            return Err(Error::NotFound(format!("artifact {hash} not found")));
        }
        Ok(())
    }
}

/// Build an active edge node with the given bandwidth and CPU
#[must_use]
pub fn test_node(id: &str, bandwidth_available: u64, cpu: f64) -> EdgeNode {
    EdgeNode {
        bandwidth_available,
        bandwidth_max: bandwidth_available * 2,
        cpu,
        ram_used: 2_000,
        ram_max: 16_000,
        viewer_count: 0,
        location: Some(GeoPoint {
            latitude: 52.37,
            longitude: 4.9,
        }),
        ..EdgeNode::new(
            NodeId::from_string(id.to_string()),
            format!("https://{id}.edge.test"),
        )
    }
}

/// Build a live stream served (and originated) by `origin`
#[must_use]
pub fn test_stream(internal_name: &str, tenant: &str, origin: &str) -> StreamInfo {
    StreamInfo {
        internal_name: internal_name.to_string(),
        tenant_id: TenantId::from_string(tenant.to_string()),
        playback_id: Some(PlaybackId::from_string(format!("pb_{internal_name}"))),
        origin_node: Some(NodeId::from_string(origin.to_string())),
        has_active_inputs: true,
        edges: vec![StreamEdgeState {
            node_id: NodeId::from_string(origin.to_string()),
            buffer_state: BufferState::Full,
            viewer_count: 3,
        }],
    }
}

/// Build a synced artifact record in object storage
#[must_use]
pub fn test_artifact(hash: &str, tenant: &str, kind: ArtifactKind) -> ArtifactRecord {
    ArtifactRecord {
        hash: ArtifactHash::from_string(hash.to_string()),
        tenant_id: TenantId::from_string(tenant.to_string()),
        internal_name: format!("{tenant}+recording"),
        kind,
        format: "mp4".to_string(),
        storage_state: StorageState::Frozen,
        synced: true,
        size_bytes: 1_048_576,
        stream_id: Some(format!("{tenant}+recording")),
        created_at: Utc::now(),
    }
}
