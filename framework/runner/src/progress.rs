use indicatif::{ProgressBar, ProgressStyle};
use purge_tunnel_instruments::{ReportCollector, SampleRecord};

/// Shows how many of the expected strays have been purged while the monitor is polling.
pub struct ProgressReportCollector {
    pb: ProgressBar,
}

impl ProgressReportCollector {
    pub fn new(expected_strays: u64) -> Self {
        let pb = ProgressBar::new(expected_strays);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} strays purged [{elapsed_precise}] {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);

        Self { pb }
    }
}

impl ReportCollector for ProgressReportCollector {
    fn add_sample(&mut self, record: &SampleRecord) {
        let snapshot = &record.snapshot;
        self.pb.set_position(snapshot.strays_purged.min(self.pb.length().unwrap_or(u64::MAX)));
        self.pb.set_message(format!(
            "purging {} ops {}",
            snapshot.num_strays_purging, snapshot.num_purge_ops
        ));
    }

    fn finalize(&self) {
        log::trace!("Progress bar finishing");
        self.pb.finish_and_clear();
    }
}
