mod config;
mod error;
mod kind;
mod stats;
mod workload;

pub mod prelude {
    pub use crate::config::{get_config_u64, ConfigStore, MDS_COMPONENT, UNBOUNDED_LIMIT};
    pub use crate::error::{TunnelError, Violation};
    pub use crate::kind::{ThrottleKind, MDS_MAX_PURGE_FILES, MDS_MAX_PURGE_OPS};
    pub use crate::stats::{Limits, MdsAdmin, StatsSnapshot, StatsSource};
    pub use crate::workload::{WorkloadDriver, WorkloadShape};
}
