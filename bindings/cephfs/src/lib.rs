mod admin;
mod ceph_path;
mod workload;

pub mod prelude {
    pub use crate::admin::{parse_config_value, parse_perf_dump, CephAdminClient};
    pub use crate::ceph_path::{ceph_path, PT_CEPH_PATH_ENV};
    pub use crate::workload::MountWorkload;
}
