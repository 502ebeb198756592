use std::sync::Arc;
use std::time::Duration;

use purge_tunnel_core::prelude::{
    Limits, StatsSnapshot, StatsSource, ThrottleKind, TunnelError, Violation, MDS_MAX_PURGE_FILES,
    MDS_MAX_PURGE_OPS,
};
use purge_tunnel_instruments::{Reporter, SampleRecord};
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Which in-flight counter is held against which limit on every poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BoundCheck {
    /// Compare `num_strays_purging` against `mds_max_purge_files`, whichever throttle is under
    /// test.
    #[default]
    AsObserved,
    /// Compare the counter that belongs to the throttle under test against its own limit:
    /// `num_purge_ops` for the ops throttle, `num_strays_purging` for the files throttle.
    PerKind,
}

impl BoundCheck {
    fn check(
        &self,
        kind: ThrottleKind,
        limits: &Limits,
        snapshot: &StatsSnapshot,
    ) -> Result<(), TunnelError> {
        let (counter, value, bound_key, bound) = match (self, kind) {
            (BoundCheck::PerKind, ThrottleKind::Ops) => (
                "num_purge_ops",
                snapshot.num_purge_ops,
                MDS_MAX_PURGE_OPS,
                limits.max_purge_ops,
            ),
            _ => (
                "num_strays_purging",
                snapshot.num_strays_purging,
                MDS_MAX_PURGE_FILES,
                limits.max_purge_files,
            ),
        };

        if value > bound {
            return Err(TunnelError::InvariantViolation(
                Violation::ThrottleExceeded {
                    counter,
                    value,
                    bound_key,
                    bound,
                },
            ));
        }

        Ok(())
    }
}

/// What the monitor saw over a run that drained completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCompletion {
    /// Time from the first poll to the poll that saw the purge complete.
    pub elapsed: Duration,
    pub ops_high_water: u64,
    pub files_high_water: u64,
    /// Number of polls taken, including the final one.
    pub samples: u64,
}

impl PurgeCompletion {
    /// The high water mark of the in-flight counter governed by `kind`.
    pub fn high_water(&self, kind: ThrottleKind) -> u64 {
        match kind {
            ThrottleKind::Ops => self.ops_high_water,
            ThrottleKind::Files => self.files_high_water,
        }
    }
}

/// Running maxima for a single run. Never shared between runs.
#[derive(Default)]
struct Accumulator {
    ops_high_water: u64,
    files_high_water: u64,
    last_purged: Option<u64>,
    samples: u64,
}

impl Accumulator {
    fn observe(&mut self, snapshot: &StatsSnapshot) -> Result<(), TunnelError> {
        self.samples += 1;
        self.ops_high_water = self.ops_high_water.max(snapshot.num_purge_ops);
        self.files_high_water = self.files_high_water.max(snapshot.num_strays_purging);

        if let Some(previous) = self.last_purged {
            if snapshot.strays_purged < previous {
                return Err(TunnelError::InvariantViolation(
                    Violation::PurgedWentBackwards {
                        previous,
                        current: snapshot.strays_purged,
                    },
                ));
            }
        }
        self.last_purged = Some(snapshot.strays_purged);

        Ok(())
    }
}

/// Polls a [StatsSource] until a purge drains, checking the throttle bound on every sample.
///
/// The loop runs one poll per tick of `poll_interval` (one second by default). Every failure is
/// fatal to the run.
pub struct ThrottleMonitor<'a, S> {
    source: &'a S,
    poll_interval: Duration,
    bound_check: BoundCheck,
    reporter: Option<Arc<Reporter>>,
}

impl<'a, S: StatsSource> ThrottleMonitor<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            bound_check: BoundCheck::default(),
            reporter: None,
        }
    }

    /// Change the time between polls. Clamped to at least one millisecond.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_bound_check(mut self, bound_check: BoundCheck) -> Self {
        self.bound_check = bound_check;
        self
    }

    /// Forward every sample to `reporter` as it is taken.
    pub fn with_reporter(mut self, reporter: Arc<Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Poll until `strays_purged` reaches `expected_completed`.
    ///
    /// Fails with [TunnelError::Timeout] once `timeout` has passed since the first poll, with
    /// [TunnelError::InvariantViolation] if more strays than expected are purged, if
    /// `strays_purged` goes backwards or if the throttle bound is exceeded, and with whatever
    /// the stats source returns if it cannot be queried.
    pub async fn run(
        &self,
        kind: ThrottleKind,
        limits: Limits,
        expected_completed: u64,
        timeout: Duration,
    ) -> Result<PurgeCompletion, TunnelError> {
        let start = Instant::now();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut acc = Accumulator::default();

        loop {
            ticker.tick().await;

            let snapshot = self.source.sample().await?;
            let elapsed = start.elapsed();
            if let Some(reporter) = &self.reporter {
                reporter.add_sample(&SampleRecord::new(elapsed, snapshot));
            }

            if elapsed >= timeout {
                return Err(TunnelError::Timeout {
                    expected: expected_completed,
                    elapsed,
                    last: snapshot,
                });
            }

            acc.observe(&snapshot)?;

            if snapshot.strays_purged == expected_completed {
                log::info!("Complete purge in {} seconds", elapsed.as_secs());
                return Ok(PurgeCompletion {
                    elapsed,
                    ops_high_water: acc.ops_high_water,
                    files_high_water: acc.files_high_water,
                    samples: acc.samples,
                });
            }

            if snapshot.strays_purged > expected_completed {
                return Err(TunnelError::InvariantViolation(Violation::OverPurged {
                    expected: expected_completed,
                    purged: snapshot.strays_purged,
                    stats: snapshot,
                }));
            }

            self.bound_check.check(kind, &limits, &snapshot)?;

            log::info!(
                "Waiting for purge to complete {}/{}, {}/{}",
                snapshot.num_strays_purging,
                snapshot.num_strays,
                snapshot.strays_purged,
                snapshot.strays_created
            );
        }
    }
}
