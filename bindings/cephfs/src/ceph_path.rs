use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

/// Environment variable to override the path to the `ceph` binary used to reach the admin socket.
pub const PT_CEPH_PATH_ENV: &str = "PT_CEPH_PATH";

/// Get the path to the `ceph` binary.
///
/// If [`PT_CEPH_PATH_ENV`] is set, its value is used as the path to the binary. Otherwise the
/// binary is looked up in the user's `PATH`.
pub fn ceph_path() -> anyhow::Result<PathBuf> {
    match env::var(PT_CEPH_PATH_ENV).ok().as_deref() {
        Some("") => {
            bail!("'{PT_CEPH_PATH_ENV}' set to empty string");
        }
        Some("ceph") | None => {
            log::debug!("'{PT_CEPH_PATH_ENV}' is not a path so looking in user's 'PATH'");
            which::which("ceph").with_context(|| {
                format!(
                    "ceph binary not found in PATH. Please install ceph-common or set '{PT_CEPH_PATH_ENV}' to the correct path."
                )
            })
        }
        Some(path) => {
            let ceph_path = PathBuf::from(path);
            if !ceph_path.exists() {
                bail!(
                    "Path to ceph binary overwritten with '{PT_CEPH_PATH_ENV}={path}' but that path doesn't exist",
                    path = ceph_path.display()
                );
            }
            Ok(ceph_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    // One test so the env var is never set from two threads at once.
    #[test]
    fn ceph_path_from_env() {
        env::set_var(PT_CEPH_PATH_ENV, "/non/existent/path/to/ceph");
        assert!(ceph_path().is_err());

        env::set_var(PT_CEPH_PATH_ENV, "");
        assert!(ceph_path().is_err());

        let temp = NamedTempFile::new().unwrap();
        env::set_var(PT_CEPH_PATH_ENV, temp.path());
        assert_eq!(temp.path(), ceph_path().unwrap());

        env::remove_var(PT_CEPH_PATH_ENV);
    }
}
