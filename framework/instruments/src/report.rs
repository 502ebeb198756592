mod in_memory_reporter;
mod summary_report;

use parking_lot::Mutex;

use crate::SampleRecord;

pub use in_memory_reporter::InMemoryCollector;
pub use summary_report::SummaryReportCollector;

pub trait ReportCollector {
    fn add_sample(&mut self, record: &SampleRecord);

    /// Called once when the run is over, successful or not.
    fn finalize(&self);
}

/// Choose which collectors a [Reporter] fans samples out to.
#[derive(Default)]
pub struct ReportConfig {
    enable_summary: bool,
    collectors: Vec<Box<dyn ReportCollector + Send>>,
}

impl ReportConfig {
    /// Print a table of counter extremes when the run is finalized.
    pub fn enable_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn with_collector(mut self, collector: impl ReportCollector + Send + 'static) -> Self {
        self.collectors.push(Box::new(collector));
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors: Vec<Mutex<Box<dyn ReportCollector + Send>>> =
            Vec::with_capacity(self.collectors.len() + 1);
        if self.enable_summary {
            collectors.push(Mutex::new(Box::new(SummaryReportCollector::new())));
        }
        collectors.extend(self.collectors.into_iter().map(Mutex::new));

        Reporter { collectors }
    }
}

pub struct Reporter {
    collectors: Vec<Mutex<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn add_sample(&self, record: &SampleRecord) {
        for collector in &self.collectors {
            collector.lock().add_sample(record);
        }
    }

    pub fn finalize(&self) {
        log::debug!("Finalizing {} report collectors", self.collectors.len());
        for collector in &self.collectors {
            collector.lock().finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use purge_tunnel_core::prelude::StatsSnapshot;

    use super::*;

    #[test]
    fn fan_out_to_every_collector() {
        let first = InMemoryCollector::default();
        let second = InMemoryCollector::default();
        let reporter = ReportConfig::default()
            .enable_summary()
            .with_collector(first.clone())
            .with_collector(second.clone())
            .init();

        for i in 0..3 {
            reporter.add_sample(&SampleRecord::new(
                Duration::from_secs(i),
                StatsSnapshot {
                    strays_purged: i,
                    ..Default::default()
                },
            ));
        }
        reporter.finalize();

        assert_eq!(3, first.samples().len());
        assert_eq!(first.samples(), second.samples());
        assert_eq!(2, first.samples()[2].snapshot.strays_purged);
    }
}
