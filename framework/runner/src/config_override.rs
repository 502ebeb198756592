use purge_tunnel_core::prelude::{ConfigStore, TunnelError};

/// A config value that has been changed for the duration of a run.
///
/// The value that was in place beforehand is captured on [ConfigOverride::apply] and written
/// back by [ConfigOverride::restore]. Restoring is async so it can't happen on drop, callers must
/// restore on both the success and the failure path.
#[must_use = "the previous value is lost unless the override is restored"]
#[derive(Debug)]
pub struct ConfigOverride {
    component: String,
    key: String,
    previous: String,
}

impl ConfigOverride {
    pub async fn apply<C: ConfigStore>(
        config: &C,
        component: &str,
        key: &str,
        value: &str,
    ) -> Result<Self, TunnelError> {
        let previous = config.get_config(component, key).await?;
        config.set_config(component, key, value).await?;
        log::info!("Set {component} config {key}={value}, was {previous}");

        Ok(Self {
            component: component.to_string(),
            key: key.to_string(),
            previous,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value that will be written back on restore.
    pub fn previous(&self) -> &str {
        &self.previous
    }

    pub async fn restore<C: ConfigStore>(self, config: &C) -> Result<(), TunnelError> {
        config
            .set_config(&self.component, &self.key, &self.previous)
            .await?;
        log::debug!(
            "Restored {} config {}={}",
            self.component,
            self.key,
            self.previous
        );
        Ok(())
    }
}
