use purge_tunnel_core::prelude::{ConfigStore, MdsAdmin, StatsSource, ThrottleKind, WorkloadDriver};

use crate::context::RunnerContext;
use crate::definition::HookResult;
use crate::scenario::ScenarioProgress;

/// Run the full [crate::scenario::ThrottleScenario] for `kind` against the context's MDS and
/// workload.
///
/// This is all a test hook needs to do to verify one throttle:
/// ```rust,no_run
/// use purge_tunnel_runner::prelude::{execute_throttle_scenario, HookResult, RunnerContext, ThrottleKind};
/// # use purge_tunnel_core::prelude::{ConfigStore, MdsAdmin, StatsSource, WorkloadDriver};
///
/// fn files_throttle<M, W>(ctx: &mut RunnerContext<M, W>) -> HookResult
/// where
///     M: StatsSource + ConfigStore + MdsAdmin,
///     W: WorkloadDriver,
/// {
///     execute_throttle_scenario(ctx, ThrottleKind::Files)
/// }
/// ```
///
/// Limits and high water marks are kept on the context and end up in the run summary, also when
/// the run fails after reading them.
pub fn execute_throttle_scenario<M, W>(
    ctx: &mut RunnerContext<M, W>,
    kind: ThrottleKind,
) -> HookResult
where
    M: StatsSource + ConfigStore + MdsAdmin,
    W: WorkloadDriver,
{
    let executor = ctx.executor().clone();
    let mut progress = ScenarioProgress::default();
    let result = {
        let scenario = ctx.scenario();
        executor.execute_in_place(scenario.execute_with_progress(kind, &mut progress))
    };
    ctx.record_progress(progress);
    let report = result?;

    log::info!(
        "[{}] {kind} throttle held over {} samples, ops high water {}, files high water {}",
        ctx.get_run_id(),
        report.completion.samples,
        report.completion.ops_high_water,
        report.completion.files_high_water
    );

    Ok(())
}
