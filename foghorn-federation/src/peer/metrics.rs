//! 30-second moving averages of per-node metrics.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use foghorn_core::models::NodeId;

/// How far back samples contribute to the average
const WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct MetricSample {
    bandwidth_available: u64,
    cpu: f64,
    taken_at: Instant,
}

/// Averaged metrics for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricAverages {
    pub bandwidth_available: u64,
    pub cpu: f64,
}

/// Per-node sample buffers. Not synchronized; the peer manager guards this
/// with its roster lock.
#[derive(Default)]
pub struct MetricsHistory {
    samples: HashMap<NodeId, Vec<MetricSample>>,
}

impl MetricsHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, pruning everything older than the window first.
    pub fn record(&mut self, node_id: &NodeId, bandwidth_available: u64, cpu: f64, now: Instant) {
        self.record_at(node_id, bandwidth_available, cpu, now);
    }

    fn record_at(&mut self, node_id: &NodeId, bandwidth_available: u64, cpu: f64, now: Instant) {
        let samples = self.samples.entry(node_id.clone()).or_default();
        samples.retain(|s| now.duration_since(s.taken_at) <= WINDOW);
        samples.push(MetricSample {
            bandwidth_available,
            cpu,
            taken_at: now,
        });
    }

    /// Arithmetic means over the retained samples
    #[must_use]
    pub fn averages(&self, node_id: &NodeId) -> Option<MetricAverages> {
        let samples = self.samples.get(node_id)?;
        if samples.is_empty() {
            return None;
        }
        let count = samples.len() as u64;
        let bandwidth: u64 = samples.iter().map(|s| s.bandwidth_available).sum();
        let cpu: f64 = samples.iter().map(|s| s.cpu).sum();
        Some(MetricAverages {
            bandwidth_available: bandwidth / count,
            cpu: cpu / count as f64,
        })
    }

    /// Drop buffers for nodes that no longer exist
    pub fn retain_nodes(&mut self, keep: impl Fn(&NodeId) -> bool) {
        self.samples.retain(|node_id, _| keep(node_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_prunes_old_samples() {
        let node = NodeId::from("n1");
        let mut history = MetricsHistory::new();
        let base = Instant::now();

        // 40 s old sample is pruned once newer samples arrive
        history.record_at(&node, 1000, 40.0, base);
        history.record_at(&node, 2000, 60.0, base + Duration::from_secs(30));
        history.record_at(&node, 3000, 80.0, base + Duration::from_secs(40));

        let averages = history.averages(&node).unwrap();
        assert_eq!(averages.bandwidth_available, 2500);
        assert!((averages.cpu - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_node_has_no_average() {
        let history = MetricsHistory::new();
        assert!(history.averages(&NodeId::from("missing")).is_none());
    }

    #[test]
    fn test_retain_nodes() {
        let mut history = MetricsHistory::new();
        let now = Instant::now();
        history.record(&NodeId::from("n1"), 100, 10.0, now);
        history.record(&NodeId::from("n2"), 200, 20.0, now);

        history.retain_nodes(|node| node.as_str() == "n1");
        assert!(history.averages(&NodeId::from("n1")).is_some());
        assert!(history.averages(&NodeId::from("n2")).is_none());
    }
}
