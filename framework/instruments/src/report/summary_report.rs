mod counters_table;

use purge_tunnel_core::prelude::StatsSnapshot;
use tabled::settings::Style;
use tabled::Table;

use crate::report::summary_report::counters_table::CounterRow;
use crate::report::ReportCollector;
use crate::SampleRecord;

type CounterFn = fn(&StatsSnapshot) -> u64;

const COUNTERS: [(&str, CounterFn); 6] = [
    ("num_strays", |s| s.num_strays),
    ("num_strays_purging", |s| s.num_strays_purging),
    ("num_strays_delayed", |s| s.num_strays_delayed),
    ("num_purge_ops", |s| s.num_purge_ops),
    ("strays_created", |s| s.strays_created),
    ("strays_purged", |s| s.strays_purged),
];

pub struct SummaryReportCollector {
    sample_records: Vec<SampleRecord>,
}

impl Default for SummaryReportCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self {
            sample_records: Vec::new(),
        }
    }

    fn rows(&self) -> Vec<CounterRow> {
        COUNTERS
            .iter()
            .map(|(counter, value)| {
                let values = self.sample_records.iter().map(|r| value(&r.snapshot));
                CounterRow {
                    counter: *counter,
                    min: values.clone().min().unwrap_or_default(),
                    max: values.clone().max().unwrap_or_default(),
                    last: values.last().unwrap_or_default(),
                }
            })
            .collect()
    }

    fn print_summary_of_samples(&self) {
        let elapsed = self
            .sample_records
            .last()
            .map(|r| r.elapsed.as_secs())
            .unwrap_or_default();
        println!(
            "\nSummary of {} samples over {}s",
            self.sample_records.len(),
            elapsed
        );

        let mut table = Table::new(self.rows());
        table.with(Style::modern());

        println!("{table}");
    }
}

impl ReportCollector for SummaryReportCollector {
    fn add_sample(&mut self, record: &SampleRecord) {
        self.sample_records.push(*record);
    }

    fn finalize(&self) {
        self.print_summary_of_samples();
    }
}
