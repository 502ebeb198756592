use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use purge_tunnel_core::prelude::{
    get_config_u64, ConfigStore, Limits, MdsAdmin, StatsSnapshot, StatsSource, ThrottleKind,
    TunnelError, Violation, WorkloadDriver, WorkloadShape, MDS_COMPONENT, MDS_MAX_PURGE_FILES,
    MDS_MAX_PURGE_OPS, UNBOUNDED_LIMIT,
};
use purge_tunnel_instruments::Reporter;

use crate::config_override::ConfigOverride;
use crate::monitor::{BoundCheck, PurgeCompletion, ThrottleMonitor, DEFAULT_POLL_INTERVAL};
use crate::types::PurgeTunnelResult;

/// How long a full purge of the workload may take before the run fails.
pub const DEFAULT_PURGE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub bound_check: BoundCheck,
    pub shape: WorkloadShape,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PURGE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            bound_check: BoundCheck::default(),
            shape: WorkloadShape::default(),
        }
    }
}

/// The outcome of a scenario that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioReport {
    pub kind: ThrottleKind,
    pub limits: Limits,
    pub completion: PurgeCompletion,
}

/// What a scenario found out before it finished, whether or not it passed.
///
/// Limits are set once they have been read and the completion once the purge has drained, so a
/// run that fails its later checks still reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioProgress {
    pub limits: Option<Limits>,
    pub completion: Option<PurgeCompletion>,
}

/// One end to end verification of a purge throttle.
///
/// Method:
/// - Relaxes the throttle that is not under test so it can't be the bottleneck.
/// - Writes the workload and deletes it in one go, then flushes the MDS journal.
/// - Reads the throttle limits and hands over to [ThrottleMonitor] until the purge drains.
/// - Checks the throttle under test was pushed to at least half its limit.
/// - Checks the stray counters have settled on the workload size.
///
/// The relaxed throttle is restored whether or not the checks pass.
pub struct ThrottleScenario<'a, M, W> {
    mds: &'a M,
    workload: &'a W,
    settings: ScenarioSettings,
    reporter: Option<Arc<Reporter>>,
}

impl<'a, M, W> ThrottleScenario<'a, M, W>
where
    M: StatsSource + ConfigStore + MdsAdmin,
    W: WorkloadDriver,
{
    pub fn new(mds: &'a M, workload: &'a W) -> Self {
        Self {
            mds,
            workload,
            settings: ScenarioSettings::default(),
            reporter: None,
        }
    }

    pub fn with_settings(mut self, settings: ScenarioSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub async fn execute(&self, kind: ThrottleKind) -> PurgeTunnelResult<ScenarioReport> {
        self.execute_with_progress(kind, &mut ScenarioProgress::default())
            .await
    }

    /// Like [ThrottleScenario::execute], also filling in `progress` as the run goes.
    pub async fn execute_with_progress(
        &self,
        kind: ThrottleKind,
        progress: &mut ScenarioProgress,
    ) -> PurgeTunnelResult<ScenarioReport> {
        let relaxed = ConfigOverride::apply(
            self.mds,
            MDS_COMPONENT,
            kind.relaxed_key(),
            &UNBOUNDED_LIMIT.to_string(),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to relax {} before testing the {kind} throttle",
                kind.relaxed_key()
            )
        })?;

        let result = self.execute_throttled(kind, progress).await;

        let relaxed_key = relaxed.key().to_string();
        if let Err(e) = relaxed.restore(self.mds).await {
            log::error!("Failed to restore {relaxed_key} after the {kind} throttle test: {e:?}");
            if result.is_ok() {
                return Err(e).with_context(|| format!("Failed to restore {relaxed_key}"));
            }
        }

        result
    }

    async fn execute_throttled(
        &self,
        kind: ThrottleKind,
        progress: &mut ScenarioProgress,
    ) -> PurgeTunnelResult<ScenarioReport> {
        let shape = &self.settings.shape;
        let expected = shape.total_objects();

        self.workload
            .create_workload(shape)
            .await
            .context("Failed to create workload")?;
        self.workload
            .remove_workload(shape)
            .await
            .context("Failed to delete workload")?;
        self.mds.flush_journal().await?;

        let limits = read_limits(self.mds).await?;
        progress.limits = Some(limits);
        log::info!(
            "Testing {kind} throttle with {MDS_MAX_PURGE_OPS}={} {MDS_MAX_PURGE_FILES}={}, expecting {expected} strays",
            limits.max_purge_ops,
            limits.max_purge_files
        );
        if kind == ThrottleKind::Ops && self.settings.bound_check == BoundCheck::AsObserved {
            log::warn!("Ops throttle is bounded by {MDS_MAX_PURGE_FILES} while polling, use the per-kind bound check to hold num_purge_ops against {MDS_MAX_PURGE_OPS}");
        }

        let mut monitor = ThrottleMonitor::new(self.mds)
            .with_poll_interval(self.settings.poll_interval)
            .with_bound_check(self.settings.bound_check);
        if let Some(reporter) = &self.reporter {
            monitor = monitor.with_reporter(reporter.clone());
        }
        let completion = monitor
            .run(kind, limits, expected, self.settings.timeout)
            .await?;
        progress.completion = Some(completion);

        check_high_water(kind, &limits, &completion)?;

        let stats = self.mds.sample().await?;
        check_final_state(&stats, expected)?;

        Ok(ScenarioReport {
            kind,
            limits,
            completion,
        })
    }
}

/// Read both purge throttles from the MDS.
pub async fn read_limits<C: ConfigStore>(config: &C) -> Result<Limits, TunnelError> {
    Ok(Limits {
        max_purge_ops: get_config_u64(config, MDS_COMPONENT, MDS_MAX_PURGE_OPS).await?,
        max_purge_files: get_config_u64(config, MDS_COMPONENT, MDS_MAX_PURGE_FILES).await?,
    })
}

/// The throttle under test must have reached at least half its limit.
///
/// This is racy. A pathologically slow cluster, or one so fast that everything purges between
/// polls, fails here without any defect in the throttle.
pub fn check_high_water(
    kind: ThrottleKind,
    limits: &Limits,
    completion: &PurgeCompletion,
) -> Result<(), TunnelError> {
    let limit = match kind {
        ThrottleKind::Ops => limits.max_purge_ops,
        ThrottleKind::Files => limits.max_purge_files,
    };
    let high_water = completion.high_water(kind);

    if high_water < limit / 2 {
        return Err(TunnelError::HeuristicViolation {
            kind,
            high_water,
            limit,
        });
    }

    Ok(())
}

/// Once drained, nothing may be left in flight and both totals must equal the workload size.
pub fn check_final_state(stats: &StatsSnapshot, expected: u64) -> Result<(), TunnelError> {
    let checks = [
        ("num_strays", stats.num_strays, 0),
        ("num_strays_purging", stats.num_strays_purging, 0),
        ("num_strays_delayed", stats.num_strays_delayed, 0),
        ("num_purge_ops", stats.num_purge_ops, 0),
        ("strays_created", stats.strays_created, expected),
        ("strays_purged", stats.strays_purged, expected),
    ];

    for (counter, actual, expected) in checks {
        if actual != expected {
            return Err(TunnelError::InvariantViolation(Violation::FinalState {
                counter,
                expected,
                actual,
            }));
        }
    }

    Ok(())
}
