use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::monitor::BoundCheck;
use crate::scenario::ScenarioSettings;

#[derive(Debug, Clone, Parser)]
#[command(about, long_about = None)]
pub struct PurgeTunnelCli {
    /// The MDS daemon to query through its admin socket, for example `mds.a`
    #[clap(long, default_value = "mds.a")]
    pub mds: String,

    /// Path to a CephFS mount served by the MDS. The workload is written and deleted here.
    #[clap(long)]
    pub mount: PathBuf,

    /// Run only the named test. Specify the flag multiple times to run several, for example
    /// `--test=ops_throttle --test=files_throttle`.
    ///
    /// If not specified then every test defined by the scenario is run, in name order.
    #[clap(long)]
    pub test: Vec<String>,

    /// The number of seconds the purge may take before the test fails
    #[clap(long, default_value = "600")]
    pub timeout: u64,

    /// Milliseconds between polls of the MDS stray counters
    #[clap(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Which in-flight counter is held against which limit while polling.
    ///
    /// `as-observed` holds `num_strays_purging` against `mds_max_purge_files` for both throttles.
    /// `per-kind` holds `num_purge_ops` against `mds_max_purge_ops` when testing the ops throttle.
    #[clap(long, value_enum, default_value_t = BoundCheck::AsObserved)]
    pub bound_check: BoundCheck,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// Identifier recorded in the run summary. A random one is generated if not set.
    #[clap(long)]
    pub run_id: Option<String>,

    /// File to append run summaries to. Falls back to `RUN_SUMMARY_PATH`, then to
    /// `run_summary.jsonl` in the working directory.
    #[clap(long)]
    pub summary_path: Option<PathBuf>,
}

impl PurgeTunnelCli {
    pub fn scenario_settings(&self) -> ScenarioSettings {
        ScenarioSettings {
            timeout: Duration::from_secs(self.timeout),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            bound_check: self.bound_check,
            ..Default::default()
        }
    }
}
