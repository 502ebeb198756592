use std::time::Duration;

use crate::kind::ThrottleKind;
use crate::stats::StatsSnapshot;

/// Every way a throttle verification can fail. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    /// Setting or reading a limit failed.
    #[error("Configuration error for `{key}`: {reason}")]
    Configuration { key: String, reason: String },

    /// The MDS could not be queried.
    #[error("Stats source unavailable: {0}")]
    Unavailable(String),

    /// The purge did not finish before the deadline.
    #[error("Timeout after {}s waiting for {expected} strays to purge, stats: {last}", .elapsed.as_secs())]
    Timeout {
        expected: u64,
        elapsed: Duration,
        last: StatsSnapshot,
    },

    /// A correctness bound was broken. This is a defect in the system under test, or in the
    /// expected workload size.
    #[error("Invariant violated: {0}")]
    InvariantViolation(Violation),

    /// The limit under test was respected but never approached, so the run proves little.
    #[error("{} in flight high water is unexpectedly low ({high_water} / {limit})", counter_label(.kind))]
    HeuristicViolation {
        kind: ThrottleKind,
        high_water: u64,
        limit: u64,
    },
}

impl TunnelError {
    /// The violation detail, if this is an invariant violation.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            TunnelError::InvariantViolation(v) => Some(v),
            _ => None,
        }
    }
}

fn counter_label(kind: &ThrottleKind) -> &'static str {
    match kind {
        ThrottleKind::Ops => "Ops",
        ThrottleKind::Files => "Files",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Violation {
    #[display("more strays purged than expected ({purged} / {expected}), stats: {stats}")]
    OverPurged {
        expected: u64,
        purged: u64,
        stats: StatsSnapshot,
    },

    #[display("{counter} violates threshold {value}/{bound} ({bound_key})")]
    ThrottleExceeded {
        counter: &'static str,
        value: u64,
        bound_key: &'static str,
        bound: u64,
    },

    #[display("strays_purged went backwards from {previous} to {current}")]
    PurgedWentBackwards { previous: u64, current: u64 },

    #[display("final {counter} was {actual}, expected {expected}")]
    FinalState {
        counter: &'static str,
        expected: u64,
        actual: u64,
    },
}
