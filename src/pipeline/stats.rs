//! Pipeline counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    snapshots: AtomicU64,
    matched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot_seen(&self) {
        self.snapshots.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn matched(&self) {
        self.matched.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn read(&self) -> PipelineStats {
        // Outcome counters first so a concurrent snapshot cannot push them past `snapshots`
        let delivered = self.delivered.load(Ordering::Acquire);
        let failed = self.failed.load(Ordering::Acquire);
        let matched = self.matched.load(Ordering::Acquire);
        PipelineStats {
            snapshots: self.snapshots.load(Ordering::Acquire),
            matched,
            delivered,
            failed,
        }
    }
}

/// Point-in-time copy of the pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PipelineStats {
    /// Snapshot events received
    pub snapshots: u64,
    /// Snapshots that passed the trigger match
    pub matched: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl PipelineStats {
    /// Snapshots that matched no trigger
    pub fn dropped(&self) -> u64 {
        self.snapshots.saturating_sub(self.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_never_underflows() {
        let stats = PipelineStats {
            snapshots: 3,
            matched: 5,
            ..PipelineStats::default()
        };
        assert_eq!(stats.dropped(), 0);
    }

    #[test]
    fn test_read_during_concurrent_updates() {
        let counters = std::sync::Arc::new(Counters::default());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let counters = std::sync::Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        counters.snapshot_seen();
                        counters.matched();
                        counters.delivered();
                    }
                })
            })
            .collect();

        while !writers.iter().all(|w| w.is_finished()) {
            let stats = counters.read();
            assert!(stats.matched <= stats.snapshots);
            assert!(stats.delivered <= stats.matched);
            assert!(stats.dropped() <= stats.snapshots);
        }
        for writer in writers {
            writer.join().unwrap();
        }

        let stats = counters.read();
        assert_eq!(stats.snapshots, 40_000);
        assert_eq!(stats.dropped(), 0);
    }
}
