mod report;

use std::time::Duration;

use purge_tunnel_core::prelude::StatsSnapshot;

pub use report::{
    InMemoryCollector, ReportCollector, ReportConfig, Reporter, SummaryReportCollector,
};

/// One poll of the stats source, stamped with the time since the run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRecord {
    pub elapsed: Duration,
    pub snapshot: StatsSnapshot,
}

impl SampleRecord {
    pub fn new(elapsed: Duration, snapshot: StatsSnapshot) -> Self {
        Self { elapsed, snapshot }
    }
}
