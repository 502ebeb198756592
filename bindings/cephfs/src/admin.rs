use std::path::PathBuf;

use purge_tunnel_core::prelude::{
    ConfigStore, MdsAdmin, StatsSnapshot, StatsSource, TunnelError,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use crate::ceph_path::ceph_path;

/// Talks to one MDS daemon through its admin socket by running `ceph daemon <mds> ...`.
///
/// Must run on the host of the daemon, since the admin socket is a local unix socket.
#[derive(Debug, Clone)]
pub struct CephAdminClient {
    ceph_path: PathBuf,
    daemon: String,
}

/// Status fields some admin socket commands reply with.
#[derive(Debug, Deserialize)]
struct CommandStatus {
    #[serde(default)]
    return_code: i64,
    #[serde(default)]
    message: String,
}

impl CephAdminClient {
    /// Connect to `daemon`, for example `mds.a`, using the `ceph` binary from [ceph_path].
    pub fn connect(daemon: &str) -> anyhow::Result<Self> {
        Ok(Self::with_ceph_path(ceph_path()?, daemon))
    }

    pub fn with_ceph_path(ceph_path: PathBuf, daemon: &str) -> Self {
        Self {
            ceph_path,
            daemon: daemon.to_string(),
        }
    }

    pub fn daemon(&self) -> &str {
        &self.daemon
    }

    /// The config component this daemon answers for, `mds` for `mds.a`.
    pub fn daemon_type(&self) -> &str {
        self.daemon
            .split_once('.')
            .map_or(self.daemon.as_str(), |(daemon_type, _)| daemon_type)
    }

    async fn daemon_command(&self, args: &[&str]) -> Result<Value, TunnelError> {
        let command = format!("ceph daemon {} {}", self.daemon, args.join(" "));
        log::debug!("Running '{command}'");

        let output = Command::new(&self.ceph_path)
            .arg("daemon")
            .arg(&self.daemon)
            .args(args)
            .output()
            .await
            .map_err(|e| TunnelError::Unavailable(format!("Failed to run '{command}': {e}")))?;

        if !output.status.success() {
            return Err(TunnelError::Unavailable(format!(
                "'{command}' failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&stdout).map_err(|e| {
            TunnelError::Unavailable(format!("'{command}' did not return valid JSON: {e}"))
        })
    }

    fn check_component(&self, component: &str, key: &str) -> Result<(), TunnelError> {
        if component != self.daemon_type() {
            return Err(TunnelError::Configuration {
                key: key.to_string(),
                reason: format!(
                    "component [{component}] can't be configured through {}",
                    self.daemon
                ),
            });
        }

        Ok(())
    }
}

impl StatsSource for CephAdminClient {
    async fn sample(&self) -> Result<StatsSnapshot, TunnelError> {
        let dump = self.daemon_command(&["perf", "dump"]).await?;
        parse_perf_dump(&dump)
    }
}

impl MdsAdmin for CephAdminClient {
    async fn flush_journal(&self) -> Result<(), TunnelError> {
        let response = self.daemon_command(&["flush", "journal"]).await?;
        check_command_status("flush journal", response)
    }
}

impl ConfigStore for CephAdminClient {
    async fn get_config(&self, component: &str, key: &str) -> Result<String, TunnelError> {
        self.check_component(component, key)?;
        let response = self.daemon_command(&["config", "get", key]).await?;
        parse_config_value(&response, key)
    }

    async fn set_config(&self, component: &str, key: &str, value: &str) -> Result<(), TunnelError> {
        self.check_component(component, key)?;
        let response = self.daemon_command(&["config", "set", key, value]).await?;
        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(TunnelError::Configuration {
                key: key.to_string(),
                reason: error.to_string(),
            });
        }

        log::info!("Set {key}={value} on {}", self.daemon);
        Ok(())
    }
}

/// Pull the stray counters out of the `mds_cache` section of a `perf dump`.
pub fn parse_perf_dump(dump: &Value) -> Result<StatsSnapshot, TunnelError> {
    let cache = dump
        .get("mds_cache")
        .ok_or_else(|| TunnelError::Unavailable("perf dump has no mds_cache section".to_string()))?;

    serde_json::from_value(cache.clone()).map_err(|e| {
        TunnelError::Unavailable(format!("mds_cache is missing stray counters: {e}"))
    })
}

/// Read `key` from a `config get` reply. The admin socket reports every value as a string, but
/// plain numbers are accepted too.
pub fn parse_config_value(response: &Value, key: &str) -> Result<String, TunnelError> {
    match response.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(other) => Err(TunnelError::Configuration {
            key: key.to_string(),
            reason: format!("unexpected value {other}"),
        }),
        None => Err(TunnelError::Configuration {
            key: key.to_string(),
            reason: format!("not present in config get reply {response}"),
        }),
    }
}

fn check_command_status(command: &str, response: Value) -> Result<(), TunnelError> {
    let status = serde_json::from_value::<Option<CommandStatus>>(response).map_err(|e| {
        TunnelError::Unavailable(format!("Unexpected reply to '{command}': {e}"))
    })?;

    match status {
        Some(CommandStatus {
            return_code,
            message,
        }) if return_code != 0 => Err(TunnelError::Unavailable(format!(
            "'{command}' returned {return_code}: {message}"
        ))),
        _ => Ok(()),
    }
}
