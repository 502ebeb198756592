use std::sync::Arc;

use purge_tunnel_core::prelude::{ConfigStore, MdsAdmin, StatsSource, WorkloadDriver};
use purge_tunnel_instruments::Reporter;

use crate::executor::Executor;
use crate::scenario::{ScenarioProgress, ScenarioSettings, ThrottleScenario};

/// Everything a test hook needs to verify a throttle: the MDS and workload collaborators, the
/// executor to drive them and the reporter for the current test.
///
/// `M` talks to the MDS (stats, config and admin commands), `W` drives the workload on the
/// filesystem.
pub struct RunnerContext<M, W> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    mds: M,
    workload: W,
    settings: ScenarioSettings,
    run_id: String,
    progress: ScenarioProgress,
}

impl<M, W> RunnerContext<M, W> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        mds: M,
        workload: W,
        settings: ScenarioSettings,
        run_id: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            mds,
            workload,
            settings,
            run_id,
            progress: ScenarioProgress::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// The reporter for the test that is currently running. Each test gets a fresh one.
    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    pub fn get_run_id(&self) -> &str {
        &self.run_id
    }

    /// A scenario wired up to this context's collaborators, settings and reporter.
    pub fn scenario(&self) -> ThrottleScenario<'_, M, W>
    where
        M: StatsSource + ConfigStore + MdsAdmin,
        W: WorkloadDriver,
    {
        ThrottleScenario::new(&self.mds, &self.workload)
            .with_settings(self.settings.clone())
            .with_reporter(self.reporter())
    }

    /// Keep what the scenario found out so the runner can add it to the run summary, whether the
    /// test passed or not.
    pub fn record_progress(&mut self, progress: ScenarioProgress) {
        self.progress = progress;
    }

    pub(crate) fn start_test(&mut self, reporter: Arc<Reporter>) {
        self.reporter = reporter;
        self.progress = ScenarioProgress::default();
    }

    pub(crate) fn take_progress(&mut self) -> ScenarioProgress {
        std::mem::take(&mut self.progress)
    }
}
