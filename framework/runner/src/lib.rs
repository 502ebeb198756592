mod cli;
mod common;
mod config_override;
mod context;
mod definition;
mod executor;
mod init;
mod monitor;
mod progress;
mod run;
mod scenario;
mod types;

pub mod prelude {
    /// Common operations for purge throttle scenarios.
    pub use crate::common::*;

    pub use crate::cli::PurgeTunnelCli;
    pub use crate::config_override::ConfigOverride;
    pub use crate::context::RunnerContext;
    pub use crate::definition::{BackendHook, HookResult, ScenarioDefinitionBuilder, TestHook};
    pub use crate::executor::Executor;
    pub use crate::monitor::{BoundCheck, PurgeCompletion, ThrottleMonitor, DEFAULT_POLL_INTERVAL};
    pub use crate::progress::ProgressReportCollector;
    pub use crate::run::{run, RUN_SUMMARY_PATH_ENV};
    pub use crate::scenario::{
        check_final_state, check_high_water, read_limits, ScenarioProgress, ScenarioReport, ScenarioSettings,
        ThrottleScenario, DEFAULT_PURGE_TIMEOUT,
    };
    pub use crate::types::PurgeTunnelResult;

    /// Re-export of the `purge_tunnel_core` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your scenarios.
    pub use purge_tunnel_core::prelude::*;

    /// Re-export of the instruments for reading samples back in tests.
    pub use purge_tunnel_instruments::{InMemoryCollector, ReportConfig, Reporter, SampleRecord};
}
