use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::TunnelError;

/// A point in time view of the stray counters reported by the MDS.
///
/// Field names match the `mds_cache` section of `perf dump` so the snapshot can be deserialized
/// straight from the admin socket output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Strays queued for reclamation that have not finished yet.
    pub num_strays: u64,
    /// Strays currently being purged. This is the "files in flight" metric.
    pub num_strays_purging: u64,
    /// Strays held back, for example by throttling.
    pub num_strays_delayed: u64,
    /// Purge operations currently in flight.
    pub num_purge_ops: u64,
    /// Monotonic count of strays ever enqueued.
    pub strays_created: u64,
    /// Monotonic count of strays ever fully purged.
    pub strays_purged: u64,
}

impl Display for StatsSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "num_strays={} num_strays_purging={} num_strays_delayed={} num_purge_ops={} strays_created={} strays_purged={}",
            self.num_strays,
            self.num_strays_purging,
            self.num_strays_delayed,
            self.num_purge_ops,
            self.strays_created,
            self.strays_purged,
        )
    }
}

/// The two purge throttles, as configured on the MDS when the run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_purge_ops: u64,
    pub max_purge_files: u64,
}

/// Source of live counter snapshots from the system under test.
///
/// Every call must reflect the current state, implementations must not cache.
#[allow(async_fn_in_trait)]
pub trait StatsSource {
    async fn sample(&self) -> Result<StatsSnapshot, TunnelError>;
}

/// Administrative commands, other than stats, that the harness needs from the MDS.
#[allow(async_fn_in_trait)]
pub trait MdsAdmin {
    /// Force pending metadata to be journaled so stray accounting can be trusted.
    async fn flush_journal(&self) -> Result<(), TunnelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ignores_unknown_counters() {
        let snapshot: StatsSnapshot = serde_json::from_str(
            r#"{
                "num_strays": 12,
                "num_strays_purging": 4,
                "num_strays_delayed": 1,
                "num_purge_ops": 9,
                "strays_created": 401,
                "strays_purged": 389,
                "strays_reintegrated": 0,
                "num_recovering_processing": 0
            }"#,
        )
        .unwrap();

        assert_eq!(12, snapshot.num_strays);
        assert_eq!(4, snapshot.num_strays_purging);
        assert_eq!(9, snapshot.num_purge_ops);
        assert_eq!(389, snapshot.strays_purged);
    }

    #[test]
    fn display_names_every_counter() {
        let text = StatsSnapshot {
            strays_created: 401,
            ..Default::default()
        }
        .to_string();

        for counter in [
            "num_strays=",
            "num_strays_purging=",
            "num_strays_delayed=",
            "num_purge_ops=",
            "strays_created=401",
            "strays_purged=",
        ] {
            assert!(text.contains(counter), "missing {counter} in {text}");
        }
    }
}
