//! Remote edge cache.
//!
//! Redis-backed shared state for the federation subsystem: leader leases,
//! peer addresses, remote-edge telemetry, stream advertisements, artifact
//! locations, heartbeats and active-replication bridge records. Every key
//! begins with `{cluster_id}:` (braces included) so Redis cluster mode
//! hashes one cluster's namespace to a single slot and multi-key operations
//! stay slot-local.

pub mod backend;
pub mod entities;
#[cfg(test)]
pub mod memory;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use foghorn_core::models::{ClusterId, InstanceId, PlaybackId};

pub use backend::{Backend, RedisBackend};
pub use entities::{
    ActiveReplication, EdgeSnapshot, EdgeSummary, PeerHeartbeatRecord, RemoteArtifact, RemoteEdge,
    RemoteLiveStream, RemoteReplication, StreamAd, StreamAdEdge,
};

use crate::error::{Error, Result};
use entities::{
    ACTIVE_REPLICATION_TTL, EDGE_SUMMARY_TTL, LEADER_LEASE_TTL, PEER_ADDRESSES_TTL,
    PEER_HEARTBEAT_TTL, PLAYBACK_INDEX_TTL, REMOTE_ARTIFACT_TTL, REMOTE_EDGE_TTL,
    REMOTE_REPLICATION_TTL, REMOTE_STREAM_TTL, STREAM_AD_TTL, STREAM_PEERS_TTL,
};

/// Keys fetched per SCAN/MGET round trip
const SCAN_BATCH: usize = 100;

/// Extract the peer cluster id from a `remote_edges` or
/// `remote_replications` key without a separate lookup.
#[must_use]
pub fn peer_cluster_id_from_key(key: &str) -> Option<ClusterId> {
    let rest = key.strip_prefix('{')?;
    let (_, rest) = rest.split_once("}:")?;

    // {c}:remote_edges:<peer>:<node>
    if let Some(tail) = rest.strip_prefix("remote_edges:") {
        let (peer, _) = tail.split_once(':')?;
        return Some(ClusterId::from(peer));
    }

    // {c}:remote_replications:<stream>:<peer>
    if let Some(tail) = rest.strip_prefix("remote_replications:") {
        let (_, peer) = tail.rsplit_once(':')?;
        return Some(ClusterId::from(peer));
    }

    None
}

/// Typed operations over the shared federation state
pub struct FederationCache {
    backend: Arc<dyn Backend>,
    cluster_id: ClusterId,
}

impl FederationCache {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, cluster_id: ClusterId) -> Self {
        Self {
            backend,
            cluster_id,
        }
    }

    /// Cache over a Redis deployment
    pub fn connect(redis_url: &str, cluster_id: ClusterId, op_timeout: Duration) -> Result<Self> {
        let backend = RedisBackend::new(redis_url, op_timeout)?;
        Ok(Self::new(Arc::new(backend), cluster_id))
    }

    #[must_use]
    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    fn key(&self, suffix: &str) -> String {
        format!("{{{}}}:{}", self.cluster_id, suffix)
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| Error::Serialization(format!("encode {key}: {e}")))?;
        self.backend.set_ex(key, &raw, ttl).await
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::Serialization(format!("decode {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// SCAN + MGET over one entity family; undecodable values are skipped.
    async fn scan_json<T: DeserializeOwned>(&self, pattern: &str) -> Result<Vec<(String, T)>> {
        let keys = self.backend.scan_keys(&self.key(pattern), SCAN_BATCH).await?;
        let mut out = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(SCAN_BATCH) {
            let values = self.backend.mget(chunk).await?;
            for (key, value) in chunk.iter().zip(values) {
                let Some(raw) = value else { continue };
                match serde_json::from_str::<T>(&raw) {
                    Ok(v) => out.push((key.clone(), v)),
                    Err(e) => debug!(key = %key, error = %e, "Skipping undecodable cache entry"),
                }
            }
        }
        Ok(out)
    }

    // -- leases ------------------------------------------------------------

    /// Acquire the `role` lease for `instance_id`. Re-entrant: an acquire by
    /// the current holder succeeds.
    pub async fn acquire_lease(&self, role: &str, instance_id: &InstanceId) -> Result<bool> {
        let key = self.key(&format!("leases:{role}"));
        if self
            .backend
            .set_nx_px(&key, instance_id.as_str(), LEADER_LEASE_TTL)
            .await?
        {
            return Ok(true);
        }
        Ok(self.backend.get(&key).await?.as_deref() == Some(instance_id.as_str()))
    }

    /// Extend the lease; fails when the lease is held by someone else or
    /// has expired.
    pub async fn renew_lease(&self, role: &str, instance_id: &InstanceId) -> Result<bool> {
        let key = self.key(&format!("leases:{role}"));
        self.backend
            .expire_if_equal(&key, instance_id.as_str(), LEADER_LEASE_TTL)
            .await
    }

    /// Compare-and-delete release; never evicts a successor's lease.
    pub async fn release_lease(&self, role: &str, instance_id: &InstanceId) -> Result<bool> {
        let key = self.key(&format!("leases:{role}"));
        self.backend.del_if_equal(&key, instance_id.as_str()).await
    }

    pub async fn lease_holder(&self, role: &str) -> Result<Option<InstanceId>> {
        let key = self.key(&format!("leases:{role}"));
        Ok(self.backend.get(&key).await?.map(InstanceId::from_string))
    }

    // -- peer addresses ----------------------------------------------------

    /// Atomically overwrite the mirrored peer address map. An empty map
    /// clears the hash entirely.
    pub async fn publish_peer_addresses(
        &self,
        addresses: &HashMap<ClusterId, String>,
    ) -> Result<()> {
        let entries: HashMap<String, String> = addresses
            .iter()
            .map(|(cluster, addr)| (cluster.to_string(), addr.clone()))
            .collect();
        self.backend
            .replace_hash(&self.key("peer_addresses"), &entries, PEER_ADDRESSES_TTL)
            .await
    }

    pub async fn peer_addresses(&self) -> Result<HashMap<ClusterId, String>> {
        let raw = self.backend.hgetall(&self.key("peer_addresses")).await?;
        Ok(raw
            .into_iter()
            .map(|(cluster, addr)| (ClusterId::from_string(cluster), addr))
            .collect())
    }

    // -- remote edges ------------------------------------------------------

    pub async fn set_remote_edge(&self, edge: &RemoteEdge) -> Result<()> {
        let key = self.key(&format!("remote_edges:{}:{}", edge.cluster_id, edge.node_id));
        self.set_json(&key, edge, REMOTE_EDGE_TTL).await
    }

    pub async fn remote_edges(&self) -> Result<Vec<RemoteEdge>> {
        Ok(self
            .scan_json("remote_edges:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    // -- remote replications -----------------------------------------------

    /// Store a replication record; an unavailable replication deletes the key.
    pub async fn set_remote_replication(&self, replication: &RemoteReplication) -> Result<()> {
        let key = self.key(&format!(
            "remote_replications:{}:{}",
            replication.stream_name, replication.cluster_id
        ));
        if replication.available {
            self.set_json(&key, replication, REMOTE_REPLICATION_TTL).await
        } else {
            self.backend.del(&key).await
        }
    }

    pub async fn remote_replications(&self) -> Result<Vec<RemoteReplication>> {
        Ok(self
            .scan_json("remote_replications:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    // -- active replications -----------------------------------------------

    pub async fn set_active_replication(&self, replication: &ActiveReplication) -> Result<()> {
        let key = self.key(&format!("active_replications:{}", replication.stream_name));
        self.set_json(&key, replication, ACTIVE_REPLICATION_TTL).await
    }

    pub async fn active_replication(&self, stream_name: &str) -> Result<Option<ActiveReplication>> {
        self.get_json(&self.key(&format!("active_replications:{stream_name}")))
            .await
    }

    pub async fn active_replications(&self) -> Result<Vec<ActiveReplication>> {
        Ok(self
            .scan_json("active_replications:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    pub async fn delete_active_replication(&self, stream_name: &str) -> Result<()> {
        self.backend
            .del(&self.key(&format!("active_replications:{stream_name}")))
            .await
    }

    // -- edge summaries ----------------------------------------------------

    pub async fn set_edge_summary(&self, summary: &EdgeSummary) -> Result<()> {
        let key = self.key(&format!("edge_summaries:{}", summary.cluster_id));
        self.set_json(&key, summary, EDGE_SUMMARY_TTL).await
    }

    pub async fn edge_summaries(&self) -> Result<Vec<EdgeSummary>> {
        Ok(self
            .scan_json("edge_summaries:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    // -- remote live streams -----------------------------------------------

    pub async fn set_remote_live_stream(&self, stream: &RemoteLiveStream) -> Result<()> {
        let key = self.key(&format!("remote_streams:{}", stream.internal_name));
        self.set_json(&key, stream, REMOTE_STREAM_TTL).await
    }

    pub async fn remote_live_stream(&self, internal_name: &str) -> Result<Option<RemoteLiveStream>> {
        self.get_json(&self.key(&format!("remote_streams:{internal_name}")))
            .await
    }

    pub async fn delete_remote_live_stream(&self, internal_name: &str) -> Result<()> {
        self.backend
            .del(&self.key(&format!("remote_streams:{internal_name}")))
            .await
    }

    // -- stream advertisements ---------------------------------------------

    /// Store a stream advertisement; a not-live advertisement deletes the key.
    pub async fn set_stream_ad(&self, ad: &StreamAd) -> Result<()> {
        let key = self.key(&format!("stream_ads:{}:{}", ad.cluster_id, ad.internal_name));
        if ad.is_live {
            self.set_json(&key, ad, STREAM_AD_TTL).await
        } else {
            self.backend.del(&key).await
        }
    }

    pub async fn stream_ads(&self) -> Result<Vec<StreamAd>> {
        Ok(self
            .scan_json("stream_ads:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    pub async fn delete_stream_ad(&self, peer: &ClusterId, internal_name: &str) -> Result<()> {
        self.backend
            .del(&self.key(&format!("stream_ads:{peer}:{internal_name}")))
            .await
    }

    // -- playback index ----------------------------------------------------

    pub async fn set_playback_index(
        &self,
        playback_id: &PlaybackId,
        internal_name: &str,
    ) -> Result<()> {
        let key = self.key(&format!("playback_index:{playback_id}"));
        self.backend
            .set_ex(&key, internal_name, PLAYBACK_INDEX_TTL)
            .await
    }

    pub async fn playback_index(&self, playback_id: &PlaybackId) -> Result<Option<String>> {
        self.backend
            .get(&self.key(&format!("playback_index:{playback_id}")))
            .await
    }

    pub async fn delete_playback_index(&self, playback_id: &PlaybackId) -> Result<()> {
        self.backend
            .del(&self.key(&format!("playback_index:{playback_id}")))
            .await
    }

    // -- remote artifacts --------------------------------------------------

    pub async fn set_remote_artifact(&self, artifact: &RemoteArtifact) -> Result<()> {
        let key = self.key(&format!(
            "remote_artifacts:{}:{}",
            artifact.cluster_id, artifact.hash
        ));
        self.set_json(&key, artifact, REMOTE_ARTIFACT_TTL).await
    }

    pub async fn remote_artifacts(&self) -> Result<Vec<RemoteArtifact>> {
        Ok(self
            .scan_json("remote_artifacts:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    // -- peer heartbeats ---------------------------------------------------

    pub async fn set_peer_heartbeat(&self, heartbeat: &PeerHeartbeatRecord) -> Result<()> {
        let key = self.key(&format!("peer_heartbeats:{}", heartbeat.cluster_id));
        self.set_json(&key, heartbeat, PEER_HEARTBEAT_TTL).await
    }

    pub async fn peer_heartbeats(&self) -> Result<Vec<PeerHeartbeatRecord>> {
        Ok(self
            .scan_json("peer_heartbeats:*")
            .await?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    // -- stream-peer sets --------------------------------------------------

    /// Persist a peer's tracked-stream set so a leader takeover restores it.
    /// An empty set deletes the key.
    pub async fn set_stream_peers(
        &self,
        peer: &ClusterId,
        streams: &HashSet<String>,
    ) -> Result<()> {
        let key = self.key(&format!("stream_peers:{peer}"));
        if streams.is_empty() {
            return self.backend.del(&key).await;
        }
        self.set_json(&key, streams, STREAM_PEERS_TTL).await
    }

    pub async fn stream_peers(&self) -> Result<HashMap<ClusterId, HashSet<String>>> {
        let entries: Vec<(String, HashSet<String>)> = self.scan_json("stream_peers:*").await?;
        let mut out = HashMap::with_capacity(entries.len());
        for (key, streams) in entries {
            if let Some((_, peer)) = key.rsplit_once("stream_peers:") {
                out.insert(ClusterId::from(peer), streams);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;
    use chrono::Utc;
    use foghorn_core::models::{ArtifactHash, NodeId, TenantId};

    const ROLE: &str = "peer_manager";

    fn test_cache() -> (Arc<MemoryBackend>, FederationCache) {
        let backend = Arc::new(MemoryBackend::new());
        let cache = FederationCache::new(
            backend.clone(),
            ClusterId::from_string("test-cluster".to_string()),
        );
        (backend, cache)
    }

    fn remote_edge(peer: &str, node: &str) -> RemoteEdge {
        RemoteEdge {
            cluster_id: ClusterId::from(peer),
            node_id: NodeId::from(node),
            base_url: format!("https://{node}.{peer}.test"),
            bandwidth_available: 1000,
            viewer_count: 7,
            cpu: 12.5,
            ram_used: 2_000,
            ram_max: 16_000,
            location: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_lease_acquire_is_exclusive() {
        let (_, cache) = test_cache();
        let a = InstanceId::from_string("inst_a".to_string());
        let b = InstanceId::from_string("inst_b".to_string());

        assert!(cache.acquire_lease(ROLE, &a).await.unwrap());
        assert!(!cache.acquire_lease(ROLE, &b).await.unwrap());
        // Re-entrant acquire by the holder succeeds
        assert!(cache.acquire_lease(ROLE, &a).await.unwrap());
    }

    #[tokio::test]
    async fn test_lease_release_never_evicts_successor() {
        let (backend, cache) = test_cache();
        let a = InstanceId::from_string("inst_a".to_string());
        let b = InstanceId::from_string("inst_b".to_string());

        assert!(cache.acquire_lease(ROLE, &a).await.unwrap());

        // A's lease expires and B takes over
        backend.advance(entities::LEADER_LEASE_TTL + Duration::from_millis(1));
        assert!(cache.acquire_lease(ROLE, &b).await.unwrap());

        // A must neither renew nor release B's lease
        assert!(!cache.renew_lease(ROLE, &a).await.unwrap());
        assert!(!cache.release_lease(ROLE, &a).await.unwrap());
        assert_eq!(cache.lease_holder(ROLE).await.unwrap(), Some(b.clone()));

        assert!(cache.release_lease(ROLE, &b).await.unwrap());
        assert_eq!(cache.lease_holder(ROLE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lease_renew_extends_ttl() {
        let (backend, cache) = test_cache();
        let a = InstanceId::from_string("inst_a".to_string());

        assert!(cache.acquire_lease(ROLE, &a).await.unwrap());
        backend.advance(Duration::from_secs(15));
        assert!(cache.renew_lease(ROLE, &a).await.unwrap());
        // Past the original expiry but inside the renewed one
        backend.advance(Duration::from_secs(10));
        assert_eq!(cache.lease_holder(ROLE).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_every_key_is_cluster_prefixed() {
        let (backend, cache) = test_cache();

        cache.set_remote_edge(&remote_edge("peer-a", "n1")).await.unwrap();
        cache
            .set_remote_replication(&RemoteReplication {
                stream_name: "s1".to_string(),
                cluster_id: ClusterId::from("peer-a"),
                node_id: NodeId::from("n1"),
                base_url: String::new(),
                dtsc_url: "dtsc://n1:4200/s1".to_string(),
                available: true,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_active_replication(&ActiveReplication {
                stream_name: "s1".to_string(),
                source_cluster: ClusterId::from("peer-a"),
                source_node: NodeId::from("n1"),
                dest_cluster: ClusterId::from("test-cluster"),
                dest_node: NodeId::from("n2"),
                dtsc_url: "dtsc://n1:4200/s1".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_edge_summary(&EdgeSummary {
                cluster_id: ClusterId::from("peer-a"),
                edges: Vec::new(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_remote_live_stream(&RemoteLiveStream {
                internal_name: "s1".to_string(),
                cluster_id: ClusterId::from("peer-a"),
                tenant_id: TenantId::from("t1"),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_stream_ad(&StreamAd {
                cluster_id: ClusterId::from("peer-a"),
                internal_name: "s1".to_string(),
                tenant_id: TenantId::from("t1"),
                playback_id: None,
                origin_cluster_id: ClusterId::from("peer-a"),
                is_live: true,
                edges: Vec::new(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_playback_index(&PlaybackId::from_string("p1".to_string()), "s1")
            .await
            .unwrap();
        cache
            .set_remote_artifact(&RemoteArtifact {
                cluster_id: ClusterId::from("peer-a"),
                hash: ArtifactHash::from("a1".to_string()),
                kind: None,
                node_id: NodeId::from("n1"),
                base_url: String::new(),
                size_bytes: 0,
                access_count: 0,
                last_accessed: Utc::now(),
                location: None,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_peer_heartbeat(&PeerHeartbeatRecord {
                cluster_id: ClusterId::from("peer-a"),
                protocol_version: 1,
                stream_count: 0,
                edge_count: 0,
                total_bandwidth_available: 0,
                uptime_seconds: 0,
                capabilities: Vec::new(),
                received_at: Utc::now(),
            })
            .await
            .unwrap();
        cache
            .set_stream_peers(
                &ClusterId::from("peer-a"),
                &HashSet::from(["s1".to_string()]),
            )
            .await
            .unwrap();
        let mut addresses = HashMap::new();
        addresses.insert(ClusterId::from("peer-a"), "addr:18019".to_string());
        cache.publish_peer_addresses(&addresses).await.unwrap();
        let instance = InstanceId::from_string("inst_a".to_string());
        cache.acquire_lease(ROLE, &instance).await.unwrap();

        let keys = backend.scan_keys("*", 100).await.unwrap();
        assert!(!keys.is_empty());
        for key in keys {
            assert!(
                key.starts_with("{test-cluster}:"),
                "key not cluster-prefixed: {key}"
            );
        }
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let (backend, cache) = test_cache();

        cache.set_remote_edge(&remote_edge("peer-a", "n1")).await.unwrap();
        backend.advance(entities::REMOTE_EDGE_TTL - Duration::from_millis(10));
        assert_eq!(cache.remote_edges().await.unwrap().len(), 1);

        backend.advance(Duration::from_millis(20));
        assert!(cache.remote_edges().await.unwrap().is_empty());

        let ad = StreamAd {
            cluster_id: ClusterId::from("peer-a"),
            internal_name: "s1".to_string(),
            tenant_id: TenantId::from("t1"),
            playback_id: None,
            origin_cluster_id: ClusterId::from("peer-a"),
            is_live: true,
            edges: Vec::new(),
            updated_at: Utc::now(),
        };
        cache.set_stream_ad(&ad).await.unwrap();
        backend.advance(entities::STREAM_AD_TTL - Duration::from_millis(10));
        assert_eq!(cache.stream_ads().await.unwrap().len(), 1);
        backend.advance(Duration::from_millis(20));
        assert!(cache.stream_ads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_replication_deletes() {
        let (_, cache) = test_cache();

        let mut replication = RemoteReplication {
            stream_name: "s-rep".to_string(),
            cluster_id: ClusterId::from("peer-a"),
            node_id: NodeId::from("n1"),
            base_url: String::new(),
            dtsc_url: "dtsc://n1:4200/s-rep".to_string(),
            available: true,
            updated_at: Utc::now(),
        };
        cache.set_remote_replication(&replication).await.unwrap();
        assert_eq!(cache.remote_replications().await.unwrap().len(), 1);

        replication.available = false;
        cache.set_remote_replication(&replication).await.unwrap();
        assert!(cache.remote_replications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_live_stream_ad_deletes() {
        let (_, cache) = test_cache();

        let mut ad = StreamAd {
            cluster_id: ClusterId::from("peer-a"),
            internal_name: "s1".to_string(),
            tenant_id: TenantId::from("t1"),
            playback_id: Some(PlaybackId::from_string("p1".to_string())),
            origin_cluster_id: ClusterId::from("peer-a"),
            is_live: true,
            edges: Vec::new(),
            updated_at: Utc::now(),
        };
        cache.set_stream_ad(&ad).await.unwrap();
        assert_eq!(cache.stream_ads().await.unwrap().len(), 1);

        ad.is_live = false;
        cache.set_stream_ad(&ad).await.unwrap();
        assert!(cache.stream_ads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_empty_addresses_clears_hash() {
        let (_, cache) = test_cache();

        let mut addresses = HashMap::new();
        addresses.insert(ClusterId::from("peer-a"), "addr-a:18019".to_string());
        addresses.insert(ClusterId::from("peer-b"), "addr-b:18019".to_string());
        cache.publish_peer_addresses(&addresses).await.unwrap();
        assert_eq!(cache.peer_addresses().await.unwrap().len(), 2);

        cache.publish_peer_addresses(&HashMap::new()).await.unwrap();
        assert!(cache.peer_addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_peers_roundtrip_and_empty_delete() {
        let (_, cache) = test_cache();
        let peer = ClusterId::from("peer-a");

        let streams: HashSet<String> = ["s1".to_string(), "s2".to_string()].into();
        cache.set_stream_peers(&peer, &streams).await.unwrap();

        let loaded = cache.stream_peers().await.unwrap();
        assert_eq!(loaded.get(&peer), Some(&streams));

        cache.set_stream_peers(&peer, &HashSet::new()).await.unwrap();
        assert!(cache.stream_peers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_skips_undecodable_entries() {
        let (backend, cache) = test_cache();

        cache.set_remote_edge(&remote_edge("peer-a", "n1")).await.unwrap();
        backend
            .set_ex(
                "{test-cluster}:remote_edges:peer-b:n9",
                "not json",
                Duration::from_secs(30),
            )
            .await
            .unwrap();

        let edges = cache.remote_edges().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].node_id.as_str(), "n1");
    }

    #[test]
    fn test_peer_cluster_id_from_key() {
        assert_eq!(
            peer_cluster_id_from_key("{ams}:remote_edges:fra:n1"),
            Some(ClusterId::from("fra"))
        );
        assert_eq!(
            peer_cluster_id_from_key("{ams}:remote_replications:tenantA+show:fra"),
            Some(ClusterId::from("fra"))
        );
        assert_eq!(peer_cluster_id_from_key("{ams}:peer_heartbeats:fra"), None);
        assert_eq!(peer_cluster_id_from_key("malformed"), None);
    }

    #[tokio::test]
    async fn test_miss_reads_as_unknown() {
        let (_, cache) = test_cache();
        assert!(cache.remote_live_stream("absent").await.unwrap().is_none());
        assert!(cache
            .playback_index(&PlaybackId::from_string("absent".to_string()))
            .await
            .unwrap()
            .is_none());
        assert!(cache.active_replication("absent").await.unwrap().is_none());
        assert!(cache.peer_addresses().await.unwrap().is_empty());
    }
}
