//! Per-peer connection state.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use foghorn_core::discovery::S3Config;
use foghorn_core::models::{ClusterId, TenantId};

use crate::grpc::foghorn::federation as pb;

/// How long a peer's channel is kept alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerLifecycle {
    /// Maintained regardless of tracked streams (official/preferred peers)
    AlwaysOn,
    /// Torn down once no tracked stream references the peer
    StreamScoped,
}

/// Which path put a peer into the roster. Drives reconciliation: mirror
/// entries follow the Redis hash, hint and discovery entries do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerProvenance {
    Discovery,
    Hint,
    Mirror,
}

/// Demand-driven peer registration
#[derive(Debug, Clone)]
pub struct PeerHint {
    pub cluster_id: ClusterId,
    pub address: String,
    pub tenant_ids: Vec<TenantId>,
    pub lifecycle: PeerLifecycle,
    pub s3: Option<S3Config>,
}

/// In-memory state for one peer cluster.
///
/// Identity matters: a connect supervisor exits once the roster holds a
/// different `PeerState` for its cluster id, so eviction plus re-add never
/// leaves two supervisors fighting over one peer.
pub struct PeerState {
    pub cluster_id: ClusterId,
    address: Mutex<String>,
    tenant_ids: Mutex<Vec<TenantId>>,
    lifecycle: Mutex<PeerLifecycle>,
    provenance: Mutex<PeerProvenance>,
    s3: Mutex<Option<S3Config>>,
    connected: AtomicBool,
    sender: Mutex<Option<mpsc::Sender<pb::PeerMessage>>>,
    cancel: Mutex<Option<CancellationToken>>,
    last_refresh: Mutex<DateTime<Utc>>,
}

impl PeerState {
    #[must_use]
    pub fn new(
        cluster_id: ClusterId,
        address: String,
        lifecycle: PeerLifecycle,
        provenance: PeerProvenance,
    ) -> Self {
        Self {
            cluster_id,
            address: Mutex::new(address),
            tenant_ids: Mutex::new(Vec::new()),
            lifecycle: Mutex::new(lifecycle),
            provenance: Mutex::new(provenance),
            s3: Mutex::new(None),
            connected: AtomicBool::new(false),
            sender: Mutex::new(None),
            cancel: Mutex::new(None),
            last_refresh: Mutex::new(Utc::now()),
        }
    }

    #[must_use]
    pub fn address(&self) -> String {
        self.address.lock().clone()
    }

    pub fn set_address(&self, address: String) {
        *self.address.lock() = address;
        *self.last_refresh.lock() = Utc::now();
    }

    #[must_use]
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        self.tenant_ids.lock().clone()
    }

    pub fn set_tenant_ids(&self, tenant_ids: Vec<TenantId>) {
        *self.tenant_ids.lock() = tenant_ids;
    }

    #[must_use]
    pub fn lifecycle(&self) -> PeerLifecycle {
        *self.lifecycle.lock()
    }

    pub fn set_lifecycle(&self, lifecycle: PeerLifecycle) {
        *self.lifecycle.lock() = lifecycle;
    }

    #[must_use]
    pub fn provenance(&self) -> PeerProvenance {
        *self.provenance.lock()
    }

    pub fn set_provenance(&self, provenance: PeerProvenance) {
        *self.provenance.lock() = provenance;
    }

    #[must_use]
    pub fn s3(&self) -> Option<S3Config> {
        self.s3.lock().clone()
    }

    pub fn set_s3(&self, s3: Option<S3Config>) {
        *self.s3.lock() = s3;
    }

    #[must_use]
    pub fn last_refresh(&self) -> DateTime<Utc> {
        *self.last_refresh.lock()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Record a live outbound stream
    pub fn mark_connected(&self, sender: mpsc::Sender<pb::PeerMessage>) {
        *self.sender.lock() = Some(sender);
        self.connected.store(true, Ordering::Release);
    }

    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
        *self.sender.lock() = None;
    }

    #[must_use]
    pub fn sender(&self) -> Option<mpsc::Sender<pb::PeerMessage>> {
        self.sender.lock().clone()
    }

    /// Register the cancel handle of the connect supervisor
    pub fn set_cancel(&self, token: CancellationToken) {
        *self.cancel.lock() = Some(token);
    }

    #[must_use]
    pub fn has_supervisor(&self) -> bool {
        self.cancel.lock().is_some()
    }

    /// Cancel the connect supervisor, if one is running
    pub fn cancel(&self) {
        if let Some(token) = self.cancel.lock().take() {
            token.cancel();
        }
        self.mark_disconnected();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> PeerState {
        PeerState::new(
            ClusterId::from("peer-a"),
            "addr-a:18019".to_string(),
            PeerLifecycle::StreamScoped,
            PeerProvenance::Hint,
        )
    }

    #[test]
    fn test_connection_state_transitions() {
        let state = peer();
        assert!(!state.is_connected());
        assert!(state.sender().is_none());

        let (tx, _rx) = mpsc::channel(1);
        state.mark_connected(tx);
        assert!(state.is_connected());
        assert!(state.sender().is_some());

        state.mark_disconnected();
        assert!(!state.is_connected());
        assert!(state.sender().is_none());
    }

    #[test]
    fn test_cancel_consumes_token() {
        let state = peer();
        let token = CancellationToken::new();
        state.set_cancel(token.clone());
        assert!(state.has_supervisor());

        state.cancel();
        assert!(token.is_cancelled());
        assert!(!state.has_supervisor());

        // Idempotent
        state.cancel();
    }
}
