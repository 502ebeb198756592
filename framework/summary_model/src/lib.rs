use serde::{Deserialize, Serialize};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// How a single throttle test ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The purge drained, every bound held and the limit under test was exercised.
    Passed,
    /// A bound was broken, the purge stalled or the stats source failed.
    Failed,
    /// Everything held but the limit under test was never approached.
    Inconclusive,
}

/// Summary of one throttle test
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Shared by every test executed in one invocation.
    pub run_id: String,
    /// The name of the scenario that was run
    pub scenario_name: String,
    /// The named test within the scenario, for example `files_throttle`
    pub test_name: String,
    /// The time the test started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// The deadline the purge had to finish within, in seconds
    pub timeout_s: u64,
    /// The throttle limits read from the MDS, if the test got far enough to read them
    pub max_purge_ops: Option<u64>,
    pub max_purge_files: Option<u64>,
    /// Seconds from the first poll until the purge completed
    ///
    /// Only set if the purge completed.
    pub elapsed_s: Option<u64>,
    /// Highest `num_purge_ops` observed while polling
    pub ops_high_water: Option<u64>,
    /// Highest `num_strays_purging` observed while polling
    pub files_high_water: Option<u64>,
    pub outcome: RunOutcome,
    /// The failure message, if the test did not pass
    pub error: Option<String>,
    /// The version of Purge Tunnel that was used for this run
    pub purge_tunnel_version: String,
}

impl RunSummary {
    /// Create a new run summary, initially marked as failed until results are recorded
    pub fn new(
        run_id: String,
        scenario_name: String,
        test_name: String,
        started_at: i64,
        timeout_s: u64,
        purge_tunnel_version: String,
    ) -> Self {
        Self {
            run_id,
            scenario_name,
            test_name,
            started_at,
            timeout_s,
            max_purge_ops: None,
            max_purge_files: None,
            elapsed_s: None,
            ops_high_water: None,
            files_high_water: None,
            outcome: RunOutcome::Failed,
            error: None,
            purge_tunnel_version,
        }
    }

    /// Record the limits that were in force for the test
    pub fn set_limits(&mut self, max_purge_ops: u64, max_purge_files: u64) {
        self.max_purge_ops = Some(max_purge_ops);
        self.max_purge_files = Some(max_purge_files);
    }

    /// Record what the monitor saw when the purge completed
    pub fn set_completion(&mut self, elapsed_s: u64, ops_high_water: u64, files_high_water: u64) {
        self.elapsed_s = Some(elapsed_s);
        self.ops_high_water = Some(ops_high_water);
        self.files_high_water = Some(files_high_water);
    }

    pub fn set_outcome(&mut self, outcome: RunOutcome, error: Option<String>) {
        self.outcome = outcome;
        self.error = error;
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: RunSummary, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all("\n".as_bytes())?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, &run_summary)?;
    Ok(())
}

/// Load a run summary from a reader
pub fn load_run_summary<R: Read>(reader: R) -> anyhow::Result<RunSummary> {
    let reader = std::io::BufReader::new(reader);
    let run_summary: RunSummary = serde_json::from_reader(reader)?;
    Ok(run_summary)
}

/// Load run summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_summary].
pub fn load_summary_runs(path: PathBuf) -> anyhow::Result<Vec<RunSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let run: RunSummary = serde_json::from_str(&line)?;
        runs.push(run);
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_summary(test_name: &str) -> RunSummary {
        let mut summary = RunSummary::new(
            "run-1".to_string(),
            "purge_throttle".to_string(),
            test_name.to_string(),
            1_700_000_000,
            600,
            "0.1.0".to_string(),
        );
        summary.set_limits(8192, 64);
        summary
    }

    #[test]
    fn append_then_load_all_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_summary.jsonl");

        let mut passed = sample_summary("files_throttle");
        passed.set_completion(42, 110, 64);
        passed.set_outcome(RunOutcome::Passed, None);
        let failed = sample_summary("ops_throttle");

        append_run_summary(passed.clone(), path.clone()).unwrap();
        append_run_summary(failed.clone(), path.clone()).unwrap();

        assert_eq!(vec![passed, failed], load_summary_runs(path).unwrap());
    }

    #[test]
    fn outcome_is_snake_case() {
        let mut summary = sample_summary("files_throttle");
        summary.set_outcome(
            RunOutcome::Inconclusive,
            Some("Files in flight high water is unexpectedly low (3 / 10)".to_string()),
        );

        let mut out = Vec::new();
        store_run_summary(summary.clone(), &mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains(r#""outcome":"inconclusive""#));

        assert_eq!(summary, load_run_summary(out.as_slice()).unwrap());
    }
}
