use crate::error::TunnelError;

/// The config component that owns the purge throttles.
pub const MDS_COMPONENT: &str = "mds";

/// Value used to take a throttle out of play while the other one is under test.
pub const UNBOUNDED_LIMIT: u64 = 100_000_000;

/// Live configuration of the system under test.
///
/// Values are strings because that is how the admin interface reports them, callers parse what
/// they need.
#[allow(async_fn_in_trait)]
pub trait ConfigStore {
    async fn get_config(&self, component: &str, key: &str) -> Result<String, TunnelError>;

    async fn set_config(&self, component: &str, key: &str, value: &str) -> Result<(), TunnelError>;
}

/// Read a config value and parse it as an unsigned integer.
pub async fn get_config_u64<C: ConfigStore>(
    config: &C,
    component: &str,
    key: &str,
) -> Result<u64, TunnelError> {
    let value = config.get_config(component, key).await?;
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| TunnelError::Configuration {
            key: key.to_string(),
            reason: format!("value [{value}] is not an unsigned integer: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FixedConfig(HashMap<&'static str, &'static str>);

    impl ConfigStore for FixedConfig {
        async fn get_config(&self, _component: &str, key: &str) -> Result<String, TunnelError> {
            self.0
                .get(key)
                .map(|v| v.to_string())
                .ok_or_else(|| TunnelError::Configuration {
                    key: key.to_string(),
                    reason: "no such option".to_string(),
                })
        }

        async fn set_config(
            &self,
            _component: &str,
            _key: &str,
            _value: &str,
        ) -> Result<(), TunnelError> {
            Ok(())
        }
    }

    fn config() -> FixedConfig {
        FixedConfig(HashMap::from([
            ("mds_max_purge_ops", " 8192\n"),
            ("mds_max_purge_files", "lots"),
            ("mds_max_purge_ops_per_pg", "-1"),
        ]))
    }

    #[tokio::test]
    async fn parse_trims_whitespace() {
        assert_eq!(
            8192,
            get_config_u64(&config(), MDS_COMPONENT, "mds_max_purge_ops")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn non_integer_is_a_configuration_error() {
        for key in ["mds_max_purge_files", "mds_max_purge_ops_per_pg"] {
            let err = get_config_u64(&config(), MDS_COMPONENT, key)
                .await
                .unwrap_err();

            match err {
                TunnelError::Configuration {
                    key: err_key,
                    reason,
                } => {
                    assert_eq!(key, err_key);
                    assert!(reason.contains("is not an unsigned integer"), "{reason}");
                }
                other => panic!("expected a configuration error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn missing_key_is_passed_through() {
        let err = get_config_u64(&config(), MDS_COMPONENT, "mds_max_purge_bytes")
            .await
            .unwrap_err();

        assert!(matches!(err, TunnelError::Configuration { .. }));
    }
}
