//! Shared handling of inbound peer channel payloads.
//!
//! Both receive paths feed this dispatcher: the server side of PeerChannel
//! and the peer manager's client-side receive loop. Cache write failures are
//! logged and swallowed; inbound telemetry is advisory and the sender will
//! refresh it within one TTL.

use chrono::Utc;
use tracing::{debug, trace};

use foghorn_core::models::{ArtifactKind, BufferState, ClusterId, GeoPoint, PlaybackId, TenantId};

use crate::cache::{
    EdgeSnapshot, EdgeSummary, FederationCache, PeerHeartbeatRecord, RemoteArtifact, RemoteEdge,
    RemoteLiveStream, RemoteReplication, StreamAd, StreamAdEdge,
};
use crate::grpc::foghorn::federation as pb;

fn geo(latitude: Option<f64>, longitude: Option<f64>) -> Option<GeoPoint> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

/// Apply one payload variant from `peer` to the cache.
///
/// `clear_playback_on_offline` is the client-side extra: a not-live stream
/// advertisement also clears the associated playback index entry.
pub(crate) async fn apply_peer_payload(
    cache: &FederationCache,
    peer: &ClusterId,
    payload: pb::peer_message::Payload,
    clear_playback_on_offline: bool,
) {
    use pb::peer_message::Payload;

    let result = match payload {
        Payload::EdgeTelemetry(telemetry) => {
            cache
                .set_remote_edge(&RemoteEdge {
                    cluster_id: peer.clone(),
                    node_id: telemetry.node_id.into(),
                    base_url: telemetry.base_url,
                    bandwidth_available: telemetry.bandwidth_available,
                    viewer_count: telemetry.viewer_count,
                    cpu: telemetry.cpu,
                    ram_used: telemetry.ram_used,
                    ram_max: telemetry.ram_max,
                    location: geo(telemetry.latitude, telemetry.longitude),
                    updated_at: Utc::now(),
                })
                .await
        }
        Payload::ReplicationEvent(event) => {
            cache
                .set_remote_replication(&RemoteReplication {
                    stream_name: event.stream_name,
                    cluster_id: peer.clone(),
                    node_id: event.node_id.into(),
                    base_url: event.base_url,
                    dtsc_url: event.dtsc_url,
                    available: event.available,
                    updated_at: Utc::now(),
                })
                .await
        }
        Payload::EdgeSummary(summary) => {
            cache
                .set_edge_summary(&EdgeSummary {
                    cluster_id: peer.clone(),
                    edges: summary
                        .edges
                        .into_iter()
                        .map(|edge| EdgeSnapshot {
                            node_id: edge.node_id.into(),
                            base_url: edge.base_url,
                            bandwidth_available: edge.bandwidth_available,
                            cpu: edge.cpu,
                        })
                        .collect(),
                    updated_at: Utc::now(),
                })
                .await
        }
        Payload::StreamLifecycle(event) => {
            if event.is_live {
                cache
                    .set_remote_live_stream(&RemoteLiveStream {
                        internal_name: event.internal_name,
                        cluster_id: peer.clone(),
                        tenant_id: TenantId::from(event.tenant_id),
                        updated_at: Utc::now(),
                    })
                    .await
            } else {
                cache.delete_remote_live_stream(&event.internal_name).await
            }
        }
        Payload::StreamAd(ad) => {
            let playback_id = (!ad.playback_id.is_empty())
                .then(|| PlaybackId::from_string(ad.playback_id.clone()));
            let record = StreamAd {
                cluster_id: peer.clone(),
                internal_name: ad.internal_name.clone(),
                tenant_id: TenantId::from(ad.tenant_id),
                playback_id: playback_id.clone(),
                origin_cluster_id: ClusterId::from_string(ad.origin_cluster_id),
                is_live: ad.is_live,
                edges: ad
                    .edges
                    .into_iter()
                    .map(|edge| StreamAdEdge {
                        node_id: edge.node_id.into(),
                        base_url: edge.base_url,
                        dtsc_url: edge.dtsc_url,
                        is_origin: edge.is_origin,
                        bandwidth_available: edge.bandwidth_available,
                        cpu: edge.cpu,
                        viewer_count: edge.viewer_count,
                        location: geo(edge.latitude, edge.longitude),
                        buffer_state: BufferState::parse(&edge.buffer_state),
                    })
                    .collect(),
                updated_at: Utc::now(),
            };
            let mut result = cache.set_stream_ad(&record).await;
            if let Some(playback_id) = playback_id {
                if ad.is_live {
                    result = result
                        .and(cache.set_playback_index(&playback_id, &ad.internal_name).await);
                } else if clear_playback_on_offline {
                    result = result.and(cache.delete_playback_index(&playback_id).await);
                }
            }
            result
        }
        Payload::ArtifactAd(ad) => {
            let mut result = Ok(());
            for location in ad.locations {
                result = result.and(
                    cache
                        .set_remote_artifact(&RemoteArtifact {
                            cluster_id: peer.clone(),
                            hash: location.artifact_hash.into(),
                            kind: ArtifactKind::parse(&location.artifact_type),
                            node_id: location.node_id.into(),
                            base_url: location.base_url,
                            size_bytes: location.size_bytes,
                            access_count: location.access_count,
                            last_accessed: chrono::DateTime::from_timestamp(
                                location.last_accessed,
                                0,
                            )
                            .unwrap_or_else(Utc::now),
                            location: geo(location.latitude, location.longitude),
                            updated_at: Utc::now(),
                        })
                        .await,
                );
            }
            result
        }
        Payload::Heartbeat(heartbeat) => {
            cache
                .set_peer_heartbeat(&PeerHeartbeatRecord {
                    cluster_id: peer.clone(),
                    protocol_version: heartbeat.protocol_version,
                    stream_count: heartbeat.stream_count,
                    edge_count: heartbeat.edge_count,
                    total_bandwidth_available: heartbeat.total_bandwidth_available,
                    uptime_seconds: heartbeat.uptime_seconds,
                    capabilities: heartbeat.capabilities,
                    received_at: Utc::now(),
                })
                .await
        }
        Payload::CapacitySummary(_) => {
            // Accepted for forward compatibility, not stored yet
            trace!(peer = %peer, "Ignoring capacity summary");
            Ok(())
        }
    };

    if let Err(e) = result {
        debug!(peer = %peer, error = %e, "Failed to persist peer payload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryBackend;
    use std::sync::Arc;

    fn cache() -> FederationCache {
        FederationCache::new(
            Arc::new(MemoryBackend::new()),
            ClusterId::from("local-cluster"),
        )
    }

    #[tokio::test]
    async fn test_stream_ad_live_indexes_playback() {
        let cache = cache();
        let peer = ClusterId::from("cluster-b");

        let payload = pb::peer_message::Payload::StreamAd(pb::StreamAdvertisement {
            internal_name: "s-ad".to_string(),
            tenant_id: "t1".to_string(),
            playback_id: "p1".to_string(),
            origin_cluster_id: "cluster-b".to_string(),
            is_live: true,
            edges: Vec::new(),
            timestamp: 0,
        });
        apply_peer_payload(&cache, &peer, payload, true).await;

        assert_eq!(cache.stream_ads().await.unwrap().len(), 1);
        assert_eq!(
            cache
                .playback_index(&PlaybackId::from_string("p1".to_string()))
                .await
                .unwrap()
                .as_deref(),
            Some("s-ad")
        );
    }

    #[tokio::test]
    async fn test_stream_ad_offline_clears_index_on_client_path() {
        let cache = cache();
        let peer = ClusterId::from("cluster-b");
        let playback = PlaybackId::from_string("p1".to_string());

        let live = pb::StreamAdvertisement {
            internal_name: "s-ad".to_string(),
            tenant_id: "t1".to_string(),
            playback_id: "p1".to_string(),
            origin_cluster_id: "cluster-b".to_string(),
            is_live: true,
            edges: Vec::new(),
            timestamp: 0,
        };
        apply_peer_payload(
            &cache,
            &peer,
            pb::peer_message::Payload::StreamAd(live.clone()),
            true,
        )
        .await;

        let offline = pb::StreamAdvertisement {
            is_live: false,
            ..live
        };
        apply_peer_payload(
            &cache,
            &peer,
            pb::peer_message::Payload::StreamAd(offline),
            true,
        )
        .await;

        assert!(cache.stream_ads().await.unwrap().is_empty());
        assert!(cache.playback_index(&playback).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lifecycle_offline_deletes_live_stream() {
        let cache = cache();
        let peer = ClusterId::from("cluster-b");

        apply_peer_payload(
            &cache,
            &peer,
            pb::peer_message::Payload::StreamLifecycle(pb::StreamLifecycleEvent {
                internal_name: "s-live".to_string(),
                tenant_id: "t1".to_string(),
                is_live: true,
            }),
            false,
        )
        .await;
        assert!(cache.remote_live_stream("s-live").await.unwrap().is_some());

        apply_peer_payload(
            &cache,
            &peer,
            pb::peer_message::Payload::StreamLifecycle(pb::StreamLifecycleEvent {
                internal_name: "s-live".to_string(),
                tenant_id: "t1".to_string(),
                is_live: false,
            }),
            false,
        )
        .await;
        assert!(cache.remote_live_stream("s-live").await.unwrap().is_none());
    }
}
