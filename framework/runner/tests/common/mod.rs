#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use purge_tunnel_runner::prelude::{
    ConfigStore, MdsAdmin, StatsSnapshot, StatsSource, TunnelError, WorkloadDriver, WorkloadShape,
    MDS_COMPONENT, MDS_MAX_PURGE_FILES, MDS_MAX_PURGE_OPS,
};

/// Knobs for how the simulated purge queue misbehaves.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub max_purge_ops: u64,
    pub max_purge_files: u64,
    /// Purge operations needed per stray.
    pub ops_per_stray: u64,
    /// Never start more than this many strays per step, whatever the throttles allow.
    pub stall_cap: Option<u64>,
    /// Start this many strays per step, ignoring both throttles.
    pub burst: Option<u64>,
    /// Strays enqueued on top of the workload, as if something else was deleted at the same time.
    pub extra_strays: u64,
    /// Stats become unavailable after this many samples.
    pub fail_stats_after: Option<u64>,
    /// Report one stray as delayed once the queue has drained.
    pub leave_delayed: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            max_purge_ops: 16,
            max_purge_files: 8,
            ops_per_stray: 2,
            stall_cap: None,
            burst: None,
            extra_strays: 0,
            fail_stats_after: None,
            leave_delayed: false,
        }
    }
}

#[derive(Default)]
struct SimState {
    queued: u64,
    purging: u64,
    created: u64,
    purged: u64,
    samples: u64,
}

struct Inner {
    options: SimOptions,
    state: Mutex<SimState>,
    config: Mutex<HashMap<String, String>>,
    events: Mutex<Vec<String>>,
}

/// An MDS purge queue that advances one step every time its stats are sampled.
///
/// Each step finishes every stray that was purging and starts as many queued strays as the two
/// throttles allow.
#[derive(Clone)]
pub struct SimulatedMds {
    inner: Arc<Inner>,
}

impl SimulatedMds {
    pub fn new(options: SimOptions) -> Self {
        let mut config = HashMap::new();
        config.insert(
            MDS_MAX_PURGE_OPS.to_string(),
            options.max_purge_ops.to_string(),
        );
        config.insert(
            MDS_MAX_PURGE_FILES.to_string(),
            options.max_purge_files.to_string(),
        );

        Self {
            inner: Arc::new(Inner {
                options,
                state: Mutex::new(SimState::default()),
                config: Mutex::new(config),
                events: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn workload(&self) -> SimulatedWorkload {
        SimulatedWorkload { mds: self.clone() }
    }

    pub fn config_value(&self, key: &str) -> String {
        self.inner.config.lock().get(key).cloned().unwrap_or_default()
    }

    /// Overwrite a config value without recording it as an event.
    pub fn put_config(&self, key: &str, value: &str) {
        self.inner
            .config
            .lock()
            .insert(key.to_string(), value.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.events.lock().clone()
    }

    fn record(&self, event: String) {
        self.inner.events.lock().push(event);
    }

    fn limit(&self, key: &str) -> u64 {
        self.config_value(key).parse().unwrap_or(0)
    }

    fn enqueue(&self, strays: u64) {
        let mut state = self.inner.state.lock();
        state.queued += strays;
        state.created += strays;
    }

    fn step(&self) -> StatsSnapshot {
        let options = &self.inner.options;
        let files_limit = self.limit(MDS_MAX_PURGE_FILES);
        let ops_limit = self.limit(MDS_MAX_PURGE_OPS);

        let mut state = self.inner.state.lock();
        state.purged += state.purging;

        let allowed = match options.burst {
            Some(burst) => burst,
            None => files_limit
                .min(ops_limit / options.ops_per_stray.max(1))
                .min(options.stall_cap.unwrap_or(u64::MAX)),
        };
        let start = state.queued.min(allowed);
        state.queued -= start;
        state.purging = start;
        let drained = state.created > 0 && state.purged == state.created;

        StatsSnapshot {
            num_strays: state.queued + state.purging,
            num_strays_purging: state.purging,
            num_strays_delayed: u64::from(options.leave_delayed && drained),
            num_purge_ops: state.purging * options.ops_per_stray,
            strays_created: state.created,
            strays_purged: state.purged,
        }
    }
}

impl StatsSource for SimulatedMds {
    async fn sample(&self) -> Result<StatsSnapshot, TunnelError> {
        let samples = {
            let mut state = self.inner.state.lock();
            state.samples += 1;
            state.samples
        };
        if let Some(limit) = self.inner.options.fail_stats_after {
            if samples > limit {
                return Err(TunnelError::Unavailable(
                    "admin socket connection refused".to_string(),
                ));
            }
        }
        if samples == 1 {
            self.record("sample".to_string());
        }

        Ok(self.step())
    }
}

impl ConfigStore for SimulatedMds {
    async fn get_config(&self, component: &str, key: &str) -> Result<String, TunnelError> {
        if component != MDS_COMPONENT {
            return Err(TunnelError::Configuration {
                key: key.to_string(),
                reason: format!("unknown component {component}"),
            });
        }
        self.inner
            .config
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| TunnelError::Configuration {
                key: key.to_string(),
                reason: "no such option".to_string(),
            })
    }

    async fn set_config(&self, component: &str, key: &str, value: &str) -> Result<(), TunnelError> {
        if component != MDS_COMPONENT {
            return Err(TunnelError::Configuration {
                key: key.to_string(),
                reason: format!("unknown component {component}"),
            });
        }
        self.record(format!("set {key}={value}"));
        self.inner
            .config
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl MdsAdmin for SimulatedMds {
    async fn flush_journal(&self) -> Result<(), TunnelError> {
        self.record("flush".to_string());
        Ok(())
    }
}

/// Turns the workload into strays on the simulated MDS when it is removed.
#[derive(Clone)]
pub struct SimulatedWorkload {
    mds: SimulatedMds,
}

impl WorkloadDriver for SimulatedWorkload {
    async fn create_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()> {
        self.mds
            .record(format!("create {} files", shape.files().count()));
        Ok(())
    }

    async fn remove_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()> {
        self.mds.record(format!("remove {}", shape.dir_name));
        self.mds
            .enqueue(shape.total_objects() + self.mds.inner.options.extra_strays);
        Ok(())
    }
}
