//! Peer manager: peering lifecycle and the outbound push side of the mesh.
//!
//! One replica per cluster holds the `peer_manager` lease and drives
//! peering: discovery refresh, per-peer channels, periodic telemetry,
//! summaries, advertisements and heartbeats. Non-leader replicas mirror the
//! peer address map from the cache so they can still resolve peers. Every
//! replica's server-side PeerChannel keeps writing inbound telemetry; only
//! the outbound push is leader-gated.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use foghorn_core::discovery::{DiscoveredPeer, PeerDiscovery};
use foghorn_core::models::{ClusterId, EdgeNode, InstanceId, NodeId, TenantId};
use foghorn_core::state::StateManager;

use super::metrics::MetricsHistory;
use super::receive::apply_peer_payload;
use super::state::{PeerHint, PeerLifecycle, PeerProvenance, PeerState};
use crate::cache::FederationCache;
use crate::grpc::foghorn::federation as pb;
use crate::grpc::FederationClient;
use crate::FEDERATION_PORT;

/// Contested leader-lease role
const LEADER_ROLE: &str = "peer_manager";

/// Peer channel protocol version
const PROTOCOL_VERSION: u32 = 1;

/// Deadline for handing one message to a peer's outbound queue
const SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound queue depth per peer
const PEER_QUEUE_DEPTH: usize = 64;

/// Peer manager configuration
#[derive(Debug, Clone)]
pub struct PeerManagerConfig {
    pub cluster_id: ClusterId,
    pub instance_id: InstanceId,
    /// Telemetry push, lease renew and replication-completion cadence
    pub telemetry_interval: Duration,
    /// Cluster edge summary cadence
    pub summary_interval: Duration,
    /// Artifact advertisement cadence
    pub artifact_ad_interval: Duration,
    /// Stream advertisement cadence
    pub stream_ad_interval: Duration,
    /// Peer heartbeat cadence
    pub heartbeat_interval: Duration,
    /// Discovery refresh and address republish cadence
    pub discovery_interval: Duration,
    /// Delay between reconnect attempts of a peer channel
    pub reconnect_backoff: Duration,
    /// Delay between lease acquisition attempts while not leader
    pub acquire_retry: Duration,
    pub capabilities: Vec<String>,
}

impl Default for PeerManagerConfig {
    fn default() -> Self {
        Self {
            cluster_id: ClusterId::from_string(String::new()),
            instance_id: InstanceId::generate(),
            telemetry_interval: Duration::from_secs(5),
            summary_interval: Duration::from_secs(15),
            artifact_ad_interval: Duration::from_secs(30),
            stream_ad_interval: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(10),
            discovery_interval: Duration::from_secs(300),
            reconnect_backoff: Duration::from_secs(10),
            acquire_retry: Duration::from_secs(5),
            capabilities: vec![
                "stream_ad".to_string(),
                "artifact_ad".to_string(),
                "capacity_summary".to_string(),
            ],
        }
    }
}

/// Roster and its satellites, guarded by one lock. Writers hold it only for
/// the mutation itself; I/O always happens outside.
#[derive(Default)]
struct Roster {
    peers: HashMap<ClusterId, Arc<PeerState>>,
    stream_peers: HashMap<ClusterId, HashSet<String>>,
    history: MetricsHistory,
}

/// Snapshot of the manager for operational surfaces
#[derive(Debug, Clone)]
pub struct PeerManagerMetrics {
    pub cluster_id: ClusterId,
    pub instance_id: InstanceId,
    pub peer_count: usize,
    pub connected_peers: usize,
    pub tracked_streams: usize,
    pub is_leader: bool,
}

/// Synthesize the federation address of a discovered peer
fn peer_address(seed: &DiscoveredPeer) -> String {
    format!("foghorn.{}.{}:{}", seed.slug, seed.base_url, FEDERATION_PORT)
}

fn eligible(roster: &Roster, peer: &PeerState, internal_name: &str, tenant: &TenantId) -> bool {
    let tenants = peer.tenant_ids();
    if !tenants.is_empty() && !tenants.contains(tenant) {
        return false;
    }
    if peer.lifecycle() == PeerLifecycle::AlwaysOn {
        return true;
    }
    roster
        .stream_peers
        .get(&peer.cluster_id)
        .is_some_and(|streams| streams.contains(internal_name))
}

pub struct PeerManager {
    config: PeerManagerConfig,
    client: Arc<FederationClient>,
    cache: Option<Arc<FederationCache>>,
    state: Arc<dyn StateManager>,
    discovery: Option<Arc<dyn PeerDiscovery>>,
    inner: RwLock<Roster>,
    is_leader: AtomicBool,
    done: CancellationToken,
    started_at: Instant,
}

impl PeerManager {
    #[must_use]
    pub fn new(
        config: PeerManagerConfig,
        client: Arc<FederationClient>,
        cache: Option<Arc<FederationCache>>,
        state: Arc<dyn StateManager>,
        discovery: Option<Arc<dyn PeerDiscovery>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            client,
            cache,
            state,
            discovery,
            inner: RwLock::new(Roster::default()),
            is_leader: AtomicBool::new(false),
            done: CancellationToken::new(),
            started_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.is_leader.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn metrics(&self) -> PeerManagerMetrics {
        let roster = self.inner.read();
        let tracked: HashSet<&String> = roster.stream_peers.values().flatten().collect();
        PeerManagerMetrics {
            cluster_id: self.config.cluster_id.clone(),
            instance_id: self.config.instance_id.clone(),
            peer_count: roster.peers.len(),
            connected_peers: roster.peers.values().filter(|p| p.is_connected()).count(),
            tracked_streams: tracked.len(),
            is_leader: self.is_leader(),
        }
    }

    /// Resolve a peer's federation address from the roster
    #[must_use]
    pub fn get_peer_addr(&self, cluster_id: &ClusterId) -> Option<String> {
        self.inner
            .read()
            .peers
            .get(cluster_id)
            .map(|peer| peer.address())
    }

    // -- lifecycle loop ----------------------------------------------------

    /// Main loop: contend for the lease, run the leader loop while holding
    /// it, mirror peer addresses while not. With no cache configured the
    /// process is single-instance and always leader.
    pub async fn run(self: Arc<Self>) {
        loop {
            if self.done.is_cancelled() {
                return;
            }

            if self.try_acquire_leadership().await {
                info!(instance_id = %self.config.instance_id, "Acquired peer manager leadership");
                self.run_leader().await;
                self.disconnect_all_peers();
                self.release_leadership().await;
                info!(instance_id = %self.config.instance_id, "Released peer manager leadership");
            } else {
                self.load_peer_addresses_from_redis().await;
                tokio::select! {
                    () = self.done.cancelled() => return,
                    () = sleep(self.config.acquire_retry) => {}
                }
            }
        }
    }

    /// Stop the manager: cancel every loop, tear down peer channels and
    /// release the lease if held.
    pub async fn close(&self) {
        self.done.cancel();
        self.disconnect_all_peers();
        if self.is_leader() {
            self.release_leadership().await;
        }
        info!("Peer manager closed");
    }

    async fn try_acquire_leadership(&self) -> bool {
        let Some(cache) = &self.cache else {
            self.is_leader.store(true, Ordering::Release);
            return true;
        };
        match cache
            .acquire_lease(LEADER_ROLE, &self.config.instance_id)
            .await
        {
            Ok(acquired) => {
                if acquired {
                    self.is_leader.store(true, Ordering::Release);
                }
                acquired
            }
            Err(e) => {
                debug!(error = %e, "Lease acquisition failed");
                false
            }
        }
    }

    async fn renew_leadership(&self) -> bool {
        let Some(cache) = &self.cache else {
            return true;
        };
        match cache
            .renew_lease(LEADER_ROLE, &self.config.instance_id)
            .await
        {
            Ok(renewed) => renewed,
            Err(e) => {
                warn!(error = %e, "Lease renew failed");
                false
            }
        }
    }

    async fn release_leadership(&self) {
        self.is_leader.store(false, Ordering::Release);
        if let Some(cache) = &self.cache {
            match cache
                .release_lease(LEADER_ROLE, &self.config.instance_id)
                .await
            {
                Ok(released) => {
                    if !released {
                        debug!("Lease already held by a successor, not released");
                    }
                }
                Err(e) => debug!(error = %e, "Lease release failed"),
            }
        }
    }

    async fn run_leader(self: &Arc<Self>) {
        self.load_stream_peers_from_redis().await;
        self.refresh_peers_from_discovery().await;
        self.publish_peer_addresses().await;
        self.connect_known_peers();

        let mut telemetry = interval(self.config.telemetry_interval);
        let mut summary = interval(self.config.summary_interval);
        let mut artifact_ads = interval(self.config.artifact_ad_interval);
        let mut stream_ads = interval(self.config.stream_ad_interval);
        let mut heartbeat = interval(self.config.heartbeat_interval);
        let mut discovery = interval(self.config.discovery_interval);
        for ticker in [
            &mut telemetry,
            &mut summary,
            &mut artifact_ads,
            &mut stream_ads,
            &mut heartbeat,
            &mut discovery,
        ] {
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        loop {
            tokio::select! {
                () = self.done.cancelled() => return,
                _ = telemetry.tick() => {
                    if !self.renew_leadership().await {
                        warn!(instance_id = %self.config.instance_id, "Lost peer manager lease, stepping down");
                        return;
                    }
                    self.record_metric_samples().await;
                    self.push_stream_telemetry().await;
                    self.check_replication_completion().await;
                }
                _ = summary.tick() => self.push_cluster_summary().await,
                _ = artifact_ads.tick() => self.push_artifact_advertisements().await,
                _ = stream_ads.tick() => self.push_stream_advertisements().await,
                _ = heartbeat.tick() => self.push_peer_heartbeat().await,
                _ = discovery.tick() => {
                    self.refresh_peers_from_discovery().await;
                    self.publish_peer_addresses().await;
                }
            }
        }
    }

    // -- roster management -------------------------------------------------

    /// Demand-driven registration. Addresses and tenant/S3 hints are
    /// recorded on any replica; only the leader opens channels to new
    /// entries.
    pub async fn notify_peers(self: &Arc<Self>, hints: Vec<PeerHint>) {
        let mut added = Vec::new();
        {
            let mut roster = self.inner.write();
            for hint in hints {
                if hint.cluster_id == self.config.cluster_id {
                    continue;
                }
                match roster.peers.get(&hint.cluster_id) {
                    Some(peer) => {
                        peer.set_address(hint.address);
                        peer.set_tenant_ids(hint.tenant_ids);
                        if hint.s3.is_some() {
                            peer.set_s3(hint.s3);
                        }
                        // Hints outrank mirror entries for reconciliation
                        if peer.provenance() == PeerProvenance::Mirror {
                            peer.set_provenance(PeerProvenance::Hint);
                        }
                    }
                    None => {
                        let peer = Arc::new(PeerState::new(
                            hint.cluster_id.clone(),
                            hint.address,
                            hint.lifecycle,
                            PeerProvenance::Hint,
                        ));
                        peer.set_tenant_ids(hint.tenant_ids);
                        peer.set_s3(hint.s3);
                        roster.peers.insert(hint.cluster_id.clone(), peer.clone());
                        added.push(peer);
                    }
                }
            }
        }

        if self.is_leader() {
            for peer in added {
                self.connect_peer(peer);
            }
        }
    }

    /// Leader-only discovery refresh: add/update discovered peers, drop
    /// discovery-originated peers that disappeared.
    pub async fn refresh_peers_from_discovery(self: &Arc<Self>) {
        let Some(discovery) = &self.discovery else {
            return;
        };
        let seeds = match discovery.list_peers().await {
            Ok(seeds) => seeds,
            Err(e) => {
                warn!(error = %e, "Peer discovery refresh failed");
                return;
            }
        };

        let mut added = Vec::new();
        {
            let mut roster = self.inner.write();
            let seen: HashSet<&ClusterId> = seeds.iter().map(|s| &s.cluster_id).collect();

            let stale: Vec<ClusterId> = roster
                .peers
                .iter()
                .filter(|(cluster, peer)| {
                    peer.provenance() == PeerProvenance::Discovery && !seen.contains(cluster)
                })
                .map(|(cluster, _)| cluster.clone())
                .collect();
            for cluster in stale {
                if let Some(peer) = roster.peers.remove(&cluster) {
                    info!(peer = %cluster, "Peer vanished from discovery, evicting");
                    peer.cancel();
                }
            }

            for seed in seeds {
                if seed.cluster_id == self.config.cluster_id {
                    continue;
                }
                let address = peer_address(&seed);
                let lifecycle = if seed.preferred {
                    PeerLifecycle::AlwaysOn
                } else {
                    PeerLifecycle::StreamScoped
                };
                match roster.peers.get(&seed.cluster_id) {
                    Some(peer) => {
                        peer.set_address(address);
                        peer.set_tenant_ids(seed.tenant_ids);
                        peer.set_lifecycle(lifecycle);
                        peer.set_provenance(PeerProvenance::Discovery);
                        if seed.s3.is_some() {
                            peer.set_s3(seed.s3);
                        }
                    }
                    None => {
                        let peer = Arc::new(PeerState::new(
                            seed.cluster_id.clone(),
                            address,
                            lifecycle,
                            PeerProvenance::Discovery,
                        ));
                        peer.set_tenant_ids(seed.tenant_ids);
                        peer.set_s3(seed.s3);
                        roster.peers.insert(seed.cluster_id.clone(), peer.clone());
                        added.push(peer);
                    }
                }
            }
        }

        for peer in added {
            self.connect_peer(peer);
        }
    }

    /// Non-leader path: mirror the peer address map from the cache without
    /// opening channels. Mirror-originated entries that no longer appear in
    /// the map are dropped; hint- and discovery-originated entries survive.
    pub async fn load_peer_addresses_from_redis(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let addresses = match cache.peer_addresses().await {
            Ok(addresses) => addresses,
            Err(e) => {
                debug!(error = %e, "Peer address mirror failed");
                return;
            }
        };

        let mut roster = self.inner.write();
        for (cluster, address) in &addresses {
            if *cluster == self.config.cluster_id {
                continue;
            }
            match roster.peers.get(cluster) {
                Some(peer) => {
                    if peer.provenance() == PeerProvenance::Mirror {
                        peer.set_address(address.clone());
                    }
                }
                None => {
                    roster.peers.insert(
                        cluster.clone(),
                        Arc::new(PeerState::new(
                            cluster.clone(),
                            address.clone(),
                            PeerLifecycle::StreamScoped,
                            PeerProvenance::Mirror,
                        )),
                    );
                }
            }
        }

        let stale: Vec<ClusterId> = roster
            .peers
            .iter()
            .filter(|(cluster, peer)| {
                peer.provenance() == PeerProvenance::Mirror && !addresses.contains_key(cluster)
            })
            .map(|(cluster, _)| cluster.clone())
            .collect();
        for cluster in stale {
            roster.peers.remove(&cluster);
        }
    }

    /// Publish the roster's address map for non-leader replicas
    async fn publish_peer_addresses(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let addresses: HashMap<ClusterId, String> = {
            let roster = self.inner.read();
            roster
                .peers
                .iter()
                .filter(|(_, peer)| peer.provenance() != PeerProvenance::Mirror)
                .map(|(cluster, peer)| (cluster.clone(), peer.address()))
                .collect()
        };
        if let Err(e) = cache.publish_peer_addresses(&addresses).await {
            warn!(error = %e, "Failed to publish peer addresses");
        }
    }

    async fn load_stream_peers_from_redis(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        match cache.stream_peers().await {
            Ok(sets) => {
                let mut roster = self.inner.write();
                for (cluster, streams) in sets {
                    roster
                        .stream_peers
                        .entry(cluster)
                        .or_default()
                        .extend(streams);
                }
            }
            Err(e) => warn!(error = %e, "Failed to load stream-peer mappings"),
        }
    }

    // -- per-peer channel --------------------------------------------------

    fn connect_known_peers(self: &Arc<Self>) {
        let peers: Vec<Arc<PeerState>> = self
            .inner
            .read()
            .peers
            .values()
            .filter(|peer| peer.provenance() != PeerProvenance::Mirror)
            .cloned()
            .collect();
        for peer in peers {
            self.connect_peer(peer);
        }
    }

    /// Spawn the long-lived connect supervisor for one peer. Before each
    /// attempt it re-checks that this `PeerState` is still the roster's
    /// current entry; a stale supervisor exits silently.
    fn connect_peer(self: &Arc<Self>, peer: Arc<PeerState>) {
        if peer.has_supervisor() {
            return;
        }
        let token = CancellationToken::new();
        peer.set_cancel(token.clone());

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if token.is_cancelled() || manager.done.is_cancelled() {
                    return;
                }
                let current = manager.inner.read().peers.get(&peer.cluster_id).cloned();
                match current {
                    Some(entry) if Arc::ptr_eq(&entry, &peer) => {}
                    _ => {
                        debug!(peer = %peer.cluster_id, "Roster entry changed, supervisor exiting");
                        return;
                    }
                }

                manager.run_peer_channel(&peer, &token).await;
                peer.mark_disconnected();

                tokio::select! {
                    () = token.cancelled() => return,
                    () = manager.done.cancelled() => return,
                    () = sleep(manager.config.reconnect_backoff) => {}
                }
            }
        });
    }

    /// One connection attempt plus its receive loop
    async fn run_peer_channel(&self, peer: &Arc<PeerState>, token: &CancellationToken) {
        let address = peer.address();
        let (tx, rx) = mpsc::channel::<pb::PeerMessage>(PEER_QUEUE_DEPTH);

        let mut inbound = match self
            .client
            .open_peer_channel(&peer.cluster_id, &address, ReceiverStream::new(rx))
            .await
        {
            Ok(inbound) => inbound,
            Err(e) => {
                debug!(peer = %peer.cluster_id, address = %address, error = %e, "Peer connect failed");
                return;
            }
        };

        // The first outbound message binds our cluster_id on the peer side
        let hello = self.build_heartbeat().await;
        if tx.send(hello).await.is_err() {
            return;
        }

        peer.mark_connected(tx);
        info!(peer = %peer.cluster_id, address = %address, "Peer channel connected");

        loop {
            tokio::select! {
                () = token.cancelled() => return,
                () = self.done.cancelled() => return,
                message = inbound.message() => match message {
                    Ok(Some(message)) => {
                        if let (Some(cache), Some(payload)) = (&self.cache, message.payload) {
                            apply_peer_payload(cache, &peer.cluster_id, payload, true).await;
                        }
                    }
                    Ok(None) => {
                        debug!(peer = %peer.cluster_id, "Peer channel closed by remote");
                        return;
                    }
                    Err(status) => {
                        debug!(peer = %peer.cluster_id, error = %status, "Peer channel receive failed");
                        return;
                    }
                }
            }
        }
    }

    fn disconnect_all_peers(&self) {
        let peers: Vec<Arc<PeerState>> = self.inner.read().peers.values().cloned().collect();
        for peer in peers {
            peer.cancel();
        }
    }

    // -- stream tracking ---------------------------------------------------

    /// Associate a stream with the given peer clusters and persist each
    /// affected cluster's stream set.
    pub async fn track_stream(&self, internal_name: &str, clusters: &[ClusterId]) {
        let affected: Vec<(ClusterId, HashSet<String>)> = {
            let mut roster = self.inner.write();
            clusters
                .iter()
                .map(|cluster| {
                    let set = roster.stream_peers.entry(cluster.clone()).or_default();
                    set.insert(internal_name.to_string());
                    (cluster.clone(), set.clone())
                })
                .collect()
        };

        if let Some(cache) = &self.cache {
            for (cluster, streams) in affected {
                if let Err(e) = cache.set_stream_peers(&cluster, &streams).await {
                    warn!(peer = %cluster, error = %e, "Failed to persist stream-peer set");
                }
            }
        }
    }

    /// Remove a stream from every peer's set; stream-scoped peers whose set
    /// empties are torn down and evicted.
    pub async fn untrack_stream(&self, internal_name: &str) {
        let mut affected = Vec::new();
        let mut evicted = Vec::new();
        {
            let mut roster = self.inner.write();
            let Roster {
                peers,
                stream_peers,
                ..
            } = &mut *roster;

            for (cluster, streams) in stream_peers.iter_mut() {
                if streams.remove(internal_name) {
                    affected.push((cluster.clone(), streams.clone()));
                }
            }

            for (cluster, streams) in &affected {
                if !streams.is_empty() {
                    continue;
                }
                let is_stream_scoped = peers
                    .get(cluster)
                    .is_some_and(|peer| peer.lifecycle() == PeerLifecycle::StreamScoped);
                if is_stream_scoped {
                    if let Some(peer) = peers.remove(cluster) {
                        peer.cancel();
                        evicted.push(peer);
                    }
                    stream_peers.remove(cluster);
                }
            }
        }

        for peer in &evicted {
            info!(peer = %peer.cluster_id, "Stream-scoped peer has no tracked streams, removed");
        }

        if let Some(cache) = &self.cache {
            for (cluster, streams) in affected {
                if let Err(e) = cache.set_stream_peers(&cluster, &streams).await {
                    warn!(peer = %cluster, error = %e, "Failed to persist stream-peer set");
                }
            }
        }
    }

    /// Stream-scoped send eligibility: the peer's shared-tenant set (when
    /// non-empty) must contain the stream's tenant, and stream-scoped peers
    /// must track the stream.
    #[must_use]
    pub fn should_send(&self, peer: &PeerState, internal_name: &str, tenant: &TenantId) -> bool {
        eligible(&self.inner.read(), peer, internal_name, tenant)
    }

    // -- remote stream lookup ----------------------------------------------

    /// Which peer cluster, if any, reports this stream live under the given
    /// tenant. Fail-open: cache errors read as "not live" so ingest never
    /// blocks on Redis.
    pub async fn is_stream_live_on_peer(
        &self,
        internal_name: &str,
        tenant: &TenantId,
    ) -> Option<ClusterId> {
        let cache = self.cache.as_ref()?;
        match cache.remote_live_stream(internal_name).await {
            Ok(Some(record)) if record.tenant_id == *tenant => Some(record.cluster_id),
            Ok(_) => None,
            Err(e) => {
                debug!(stream = %internal_name, error = %e, "Remote live-stream lookup failed");
                None
            }
        }
    }

    // -- outbound push -----------------------------------------------------

    fn message(&self, payload: pb::peer_message::Payload) -> pb::PeerMessage {
        pb::PeerMessage {
            cluster_id: self.config.cluster_id.to_string(),
            payload: Some(payload),
        }
    }

    /// Send a batch to one peer in order; the first failed send aborts the
    /// rest of the batch for that peer only.
    async fn send_batch(&self, peer: &Arc<PeerState>, messages: Vec<pb::PeerMessage>) {
        let Some(sender) = peer.sender() else {
            return;
        };
        for message in messages {
            if let Err(e) = sender.send_timeout(message, SEND_TIMEOUT).await {
                debug!(peer = %peer.cluster_id, error = %e, "Peer send failed, aborting batch");
                return;
            }
        }
    }

    fn connected_peers(&self) -> Vec<Arc<PeerState>> {
        self.inner
            .read()
            .peers
            .values()
            .filter(|peer| peer.is_connected())
            .cloned()
            .collect()
    }

    async fn broadcast_connected(&self, payload: pb::peer_message::Payload) {
        let message = self.message(payload);
        for peer in self.connected_peers() {
            self.send_batch(&peer, vec![message.clone()]).await;
        }
    }

    async fn record_metric_samples(&self) {
        let nodes = self.state.nodes().await;
        let now = Instant::now();
        let active: HashSet<NodeId> = nodes
            .iter()
            .filter(|node| node.active)
            .map(|node| node.node_id.clone())
            .collect();

        let mut roster = self.inner.write();
        for node in nodes.iter().filter(|node| node.active) {
            roster
                .history
                .record(&node.node_id, node.bandwidth_available, node.cpu, now);
        }
        roster.history.retain_nodes(|node_id| active.contains(node_id));
    }

    /// 5 s tick: per-stream edge telemetry, then lifecycle heartbeats, per
    /// eligible peer.
    async fn push_stream_telemetry(&self) {
        let streams = self.state.live_streams().await;
        if streams.is_empty() {
            return;
        }
        let nodes: HashMap<NodeId, EdgeNode> = self
            .state
            .nodes()
            .await
            .into_iter()
            .map(|node| (node.node_id.clone(), node))
            .collect();

        // Telemetry messages per stream, shared across peers
        let mut per_stream: Vec<(String, TenantId, Vec<pb::PeerMessage>)> = Vec::new();
        let mut seen = HashSet::new();
        for stream in &streams {
            if !seen.insert(stream.internal_name.as_str()) {
                continue;
            }
            let mut messages = Vec::new();
            for edge in &stream.edges {
                let Some(node) = nodes.get(&edge.node_id) else {
                    continue;
                };
                let (latitude, longitude) = match node.location {
                    Some(geo) => (Some(geo.latitude), Some(geo.longitude)),
                    None => (None, None),
                };
                messages.push(self.message(pb::peer_message::Payload::EdgeTelemetry(
                    pb::EdgeTelemetry {
                        stream_name: stream.internal_name.clone(),
                        node_id: node.node_id.to_string(),
                        base_url: node.base_url.clone(),
                        bandwidth_available: node.bandwidth_available,
                        viewer_count: edge.viewer_count,
                        cpu: node.cpu,
                        ram_used: node.ram_used,
                        ram_max: node.ram_max,
                        latitude,
                        longitude,
                    },
                )));
            }
            // Liveness heartbeat follows the stream's telemetry
            messages.push(self.message(pb::peer_message::Payload::StreamLifecycle(
                pb::StreamLifecycleEvent {
                    internal_name: stream.internal_name.clone(),
                    tenant_id: stream.tenant_id.to_string(),
                    is_live: true,
                },
            )));
            per_stream.push((
                stream.internal_name.clone(),
                stream.tenant_id.clone(),
                messages,
            ));
        }

        let plan: Vec<(Arc<PeerState>, Vec<pb::PeerMessage>)> = {
            let roster = self.inner.read();
            roster
                .peers
                .values()
                .filter(|peer| peer.is_connected())
                .map(|peer| {
                    let batch: Vec<pb::PeerMessage> = per_stream
                        .iter()
                        .filter(|(name, tenant, _)| eligible(&roster, peer, name, tenant))
                        .flat_map(|(_, _, messages)| messages.clone())
                        .collect::<Vec<_>>();
                    (peer.clone(), batch)
                })
                .collect()
        };

        for (peer, batch) in plan {
            if !batch.is_empty() {
                self.send_batch(&peer, batch).await;
            }
        }
    }

    /// 15 s tick: 30 s-averaged snapshot of active, non-idle nodes
    async fn push_cluster_summary(&self) {
        let nodes = self.state.nodes().await;
        let edges: Vec<pb::EdgeSnapshot> = {
            let roster = self.inner.read();
            nodes
                .iter()
                .filter(|node| node.active)
                .filter_map(|node| {
                    let averages = roster.history.averages(&node.node_id)?;
                    if averages.bandwidth_available == 0 {
                        return None;
                    }
                    Some(pb::EdgeSnapshot {
                        node_id: node.node_id.to_string(),
                        base_url: node.base_url.clone(),
                        bandwidth_available: averages.bandwidth_available,
                        cpu: averages.cpu,
                    })
                })
                .collect()
        };
        if edges.is_empty() {
            return;
        }
        self.broadcast_connected(pb::peer_message::Payload::EdgeSummary(
            pb::ClusterEdgeSummary { edges },
        ))
        .await;
    }

    /// 30 s tick: advertise every hot artifact on every active node
    async fn push_artifact_advertisements(&self) {
        let nodes = self.state.nodes().await;
        let mut locations = Vec::new();
        for node in nodes.iter().filter(|node| node.active) {
            let (latitude, longitude) = match node.location {
                Some(geo) => (Some(geo.latitude), Some(geo.longitude)),
                None => (None, None),
            };
            for artifact in &node.hot_artifacts {
                locations.push(pb::ArtifactLocation {
                    artifact_hash: artifact.hash.to_string(),
                    artifact_type: artifact.kind.as_str().to_string(),
                    node_id: node.node_id.to_string(),
                    base_url: node.base_url.clone(),
                    size_bytes: artifact.size_bytes,
                    access_count: artifact.access_count,
                    last_accessed: artifact.last_accessed.timestamp(),
                    latitude,
                    longitude,
                });
            }
        }
        if locations.is_empty() {
            return;
        }
        self.broadcast_connected(pb::peer_message::Payload::ArtifactAd(
            pb::ArtifactAdvertisement { locations },
        ))
        .await;
    }

    /// 5 s tick: one advertisement per live stream per eligible peer
    async fn push_stream_advertisements(&self) {
        let streams = self.state.live_streams().await;
        if streams.is_empty() {
            return;
        }
        let nodes: HashMap<NodeId, EdgeNode> = self
            .state
            .nodes()
            .await
            .into_iter()
            .map(|node| (node.node_id.clone(), node))
            .collect();

        let mut ads: Vec<(String, TenantId, pb::PeerMessage)> = Vec::new();
        for stream in &streams {
            let mut edges = Vec::new();
            for edge in &stream.edges {
                let Some(node) = nodes.get(&edge.node_id) else {
                    continue;
                };
                let dtsc_url = self
                    .state
                    .dtsc_url(&edge.node_id, &stream.internal_name)
                    .await
                    .unwrap_or_default();
                let (latitude, longitude) = match node.location {
                    Some(geo) => (Some(geo.latitude), Some(geo.longitude)),
                    None => (None, None),
                };
                edges.push(pb::StreamEdge {
                    node_id: node.node_id.to_string(),
                    base_url: node.base_url.clone(),
                    dtsc_url,
                    is_origin: stream.is_origin(&edge.node_id),
                    bandwidth_available: node.bandwidth_available,
                    cpu: node.cpu,
                    viewer_count: edge.viewer_count,
                    latitude,
                    longitude,
                    buffer_state: edge.buffer_state.as_str().to_string(),
                });
            }
            let ad = self.message(pb::peer_message::Payload::StreamAd(
                pb::StreamAdvertisement {
                    internal_name: stream.internal_name.clone(),
                    tenant_id: stream.tenant_id.to_string(),
                    playback_id: stream
                        .playback_id
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    origin_cluster_id: self.config.cluster_id.to_string(),
                    is_live: true,
                    edges,
                    timestamp: chrono::Utc::now().timestamp(),
                },
            ));
            ads.push((stream.internal_name.clone(), stream.tenant_id.clone(), ad));
        }

        let plan: Vec<(Arc<PeerState>, Vec<pb::PeerMessage>)> = {
            let roster = self.inner.read();
            roster
                .peers
                .values()
                .filter(|peer| peer.is_connected())
                .map(|peer| {
                    let batch: Vec<pb::PeerMessage> = ads
                        .iter()
                        .filter(|(name, tenant, _)| eligible(&roster, peer, name, tenant))
                        .map(|(_, _, ad)| ad.clone())
                        .collect();
                    (peer.clone(), batch)
                })
                .collect()
        };

        for (peer, batch) in plan {
            if !batch.is_empty() {
                self.send_batch(&peer, batch).await;
            }
        }
    }

    async fn build_heartbeat(&self) -> pb::PeerMessage {
        let streams = self.state.live_streams().await;
        let nodes = self.state.nodes().await;
        let active: Vec<&EdgeNode> = nodes.iter().filter(|node| node.active).collect();
        self.message(pb::peer_message::Payload::Heartbeat(pb::PeerHeartbeat {
            protocol_version: PROTOCOL_VERSION,
            stream_count: streams.len() as u32,
            edge_count: active.len() as u32,
            total_bandwidth_available: active.iter().map(|n| n.bandwidth_available).sum(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            capabilities: self.config.capabilities.clone(),
        }))
    }

    /// 10 s tick: cluster-wide heartbeat to every connected peer
    async fn push_peer_heartbeat(&self) {
        let heartbeat = self.build_heartbeat().await;
        for peer in self.connected_peers() {
            self.send_batch(&peer, vec![heartbeat.clone()]).await;
        }
    }

    /// Announce a live/offline transition to every eligible connected peer
    pub async fn broadcast_stream_lifecycle(
        &self,
        internal_name: &str,
        tenant: &TenantId,
        is_live: bool,
    ) {
        let message = self.message(pb::peer_message::Payload::StreamLifecycle(
            pb::StreamLifecycleEvent {
                internal_name: internal_name.to_string(),
                tenant_id: tenant.to_string(),
                is_live,
            },
        ));
        let plan: Vec<Arc<PeerState>> = {
            let roster = self.inner.read();
            roster
                .peers
                .values()
                .filter(|peer| peer.is_connected())
                .filter(|peer| eligible(&roster, peer, internal_name, tenant))
                .cloned()
                .collect()
        };
        for peer in plan {
            self.send_batch(&peer, vec![message.clone()]).await;
        }
    }

    // -- replication completion --------------------------------------------

    /// Clear active replications whose destination node reports the stream
    /// live, announcing availability to every connected peer.
    pub async fn check_replication_completion(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let replications = match cache.active_replications().await {
            Ok(replications) => replications,
            Err(e) => {
                debug!(error = %e, "Active replication scan failed");
                return;
            }
        };

        for replication in replications {
            if replication.dest_cluster != self.config.cluster_id {
                continue;
            }
            if !self
                .state
                .is_stream_live_on_node(&replication.stream_name, &replication.dest_node)
                .await
            {
                continue;
            }

            if let Err(e) = cache
                .delete_active_replication(&replication.stream_name)
                .await
            {
                warn!(stream = %replication.stream_name, error = %e, "Failed to clear active replication");
                continue;
            }

            info!(
                stream = %replication.stream_name,
                node = %replication.dest_node,
                "Replication complete"
            );

            let base_url = self
                .state
                .node(&replication.dest_node)
                .await
                .map(|node| node.base_url)
                .unwrap_or_default();
            self.broadcast_connected(pb::peer_message::Payload::ReplicationEvent(
                pb::ReplicationEvent {
                    stream_name: replication.stream_name.clone(),
                    node_id: replication.dest_node.to_string(),
                    base_url,
                    dtsc_url: replication.dtsc_url.clone(),
                    available: true,
                },
            ))
            .await;
        }
    }
}
