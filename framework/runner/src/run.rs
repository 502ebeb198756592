use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use purge_tunnel_core::prelude::{ConfigStore, MdsAdmin, StatsSource, TunnelError, WorkloadDriver};
use purge_tunnel_instruments::ReportConfig;
use purge_tunnel_summary_model::{append_run_summary, RunOutcome, RunSummary};

use crate::cli::PurgeTunnelCli;
use crate::context::RunnerContext;
use crate::definition::ScenarioDefinitionBuilder;
use crate::executor::Executor;
use crate::progress::ProgressReportCollector;

/// Environment variable name to set a custom run summary file path
pub const RUN_SUMMARY_PATH_ENV: &str = "RUN_SUMMARY_PATH";
/// Default path for the run summary file
const DEFAULT_RUN_SUMMARY_PATH: &str = "run_summary.jsonl";

/// Run every selected test of the scenario, one after the other.
///
/// A failing test does not stop the ones after it. Each test gets its own reporter and its own
/// line in the run summary file. Returns the number of tests run, or an error naming how many
/// of them failed.
pub fn run<M, W>(definition: ScenarioDefinitionBuilder<M, W>) -> anyhow::Result<usize>
where
    M: StatsSource + ConfigStore + MdsAdmin,
    W: WorkloadDriver,
{
    let definition = definition.build()?;

    log::info!("Running scenario: {}", definition.name);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let executor = Arc::new(Executor::new(runtime));

    let (mds, workload) = (definition.backend_fn)(&definition.cli)
        .context("Failed to connect to the system under test")?;

    let run_id = definition
        .cli
        .run_id
        .clone()
        .unwrap_or_else(|| nanoid::nanoid!());
    let settings = definition.cli.scenario_settings();
    let expected_strays = settings.shape.total_objects();
    let timeout_s = settings.timeout.as_secs();
    let summary_path = run_summary_path(&definition.cli);

    let mut runner_context = RunnerContext::new(
        executor,
        Arc::new(ReportConfig::default().init()),
        mds,
        workload,
        settings,
        run_id.clone(),
    );

    let total = definition.tests.len();
    let mut failed = 0;
    for (test_name, test) in &definition.tests {
        log::info!("Running test: {test_name}");

        let mut report_config = ReportConfig::default().enable_summary();
        if !definition.cli.no_progress {
            report_config =
                report_config.with_collector(ProgressReportCollector::new(expected_strays));
        }
        runner_context.start_test(Arc::new(report_config.init()));

        let mut summary = RunSummary::new(
            run_id.clone(),
            definition.name.clone(),
            test_name.clone(),
            chrono::Utc::now().timestamp(),
            timeout_s,
            env!("CARGO_PKG_VERSION").to_string(),
        );

        let result = test(&mut runner_context);
        runner_context.reporter().finalize();

        let progress = runner_context.take_progress();
        if let Some(limits) = progress.limits {
            summary.set_limits(limits.max_purge_ops, limits.max_purge_files);
        }
        if let Some(completion) = progress.completion {
            summary.set_completion(
                completion.elapsed.as_secs(),
                completion.ops_high_water,
                completion.files_high_water,
            );
        }

        match result {
            Ok(()) => {
                log::info!("Test {test_name} passed");
                summary.set_outcome(RunOutcome::Passed, None);
            }
            Err(e) => {
                failed += 1;
                let outcome = match e.downcast_ref::<TunnelError>() {
                    Some(TunnelError::HeuristicViolation { .. }) => RunOutcome::Inconclusive,
                    _ => RunOutcome::Failed,
                };
                log::error!("Test {test_name} failed: {e:?}");
                summary.set_outcome(outcome, Some(format!("{e:#}")));
            }
        }

        if let Err(e) = append_run_summary(summary, summary_path.clone()) {
            log::error!(
                "Failed to write run summary to {}: {e:?}",
                summary_path.display()
            );
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} throttle tests failed");
    }

    Ok(total)
}

fn run_summary_path(cli: &PurgeTunnelCli) -> PathBuf {
    cli.summary_path.clone().unwrap_or_else(|| {
        std::env::var(RUN_SUMMARY_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RUN_SUMMARY_PATH))
    })
}
