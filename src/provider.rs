use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::alert::{AlertDefinition, CheckResult, Endpoint};
use crate::client::AlertmanagerClient;
use crate::config::{Config, Override};
use crate::errors::{AlertmanagerError, Result};
use crate::payload;
use crate::transport::{HttpClientFactory, ReqwestClientFactory};

/// A destination the health-check loop hands alerts to
#[async_trait]
pub trait AlertingProvider: Send + Sync {
    /// Validate the provider's own configuration
    fn validate(&self) -> Result<()>;

    /// Deliver one alert for `endpoint`, firing or resolved
    async fn send(
        &self,
        endpoint: &Endpoint,
        alert: &AlertDefinition,
        result: &CheckResult,
        resolved: bool,
    ) -> Result<()>;

    /// Alert settings applied to endpoint alerts that leave fields unset
    fn default_alert(&self) -> Option<&AlertDefinition>;

    /// Check that the group override and the alert's provider override
    /// resolve to a valid configuration
    fn validate_overrides(&self, group: &str, alert: &AlertDefinition) -> Result<()>;
}

/// Configuration necessary for sending alerts to Alertmanager
///
/// Read-only once loaded: resolution works on copies, so one provider can
/// serve concurrent deliveries without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertProvider {
    #[serde(flatten)]
    pub default_config: Config,

    /// Default alert configuration for endpoints with an alert of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_alert: Option<AlertDefinition>,

    /// Group overrides, first match wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Override>,

    #[serde(skip, default = "default_client_factory")]
    client_factory: Arc<dyn HttpClientFactory>,
}

fn default_client_factory() -> Arc<dyn HttpClientFactory> {
    Arc::new(ReqwestClientFactory::new())
}

impl Default for AlertProvider {
    fn default() -> Self {
        Self {
            default_config: Config::default(),
            default_alert: None,
            overrides: Vec::new(),
            client_factory: default_client_factory(),
        }
    }
}

impl AlertProvider {
    pub fn new(default_config: Config) -> Self {
        Self {
            default_config,
            ..Self::default()
        }
    }

    /// Load a provider from its YAML configuration block
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn with_default_alert(mut self, alert: AlertDefinition) -> Self {
        self.default_alert = Some(alert);
        self
    }

    pub fn with_override(mut self, group: &str, config: Config) -> Self {
        self.overrides.push(Override {
            group: group.to_string(),
            config,
        });
        self
    }

    /// Use `factory` to build the HTTP client for every delivery
    pub fn with_client_factory(mut self, factory: Arc<dyn HttpClientFactory>) -> Self {
        self.client_factory = factory;
        self
    }

    /// Resolve the effective configuration for one delivery.
    ///
    /// Layers the defaults, the first override matching `group` and the
    /// alert's provider override, then validates the result. The provider
    /// itself is never modified.
    pub fn get_config(&self, group: &str, alert: &AlertDefinition) -> Result<Config> {
        let mut cfg = self.default_config.clone();

        if let Some(group_override) = self.overrides.iter().find(|o| o.group == group) {
            cfg.merge(&group_override.config);
        }

        if let Some(mapping) = alert.provider_override.as_ref().filter(|m| !m.is_empty()) {
            // round-trip through YAML text so scalars are read by the Config schema
            let yaml = serde_yaml::to_string(mapping).map_err(AlertmanagerError::ParseOverride)?;
            let alert_override: Config =
                serde_yaml::from_str(&yaml).map_err(AlertmanagerError::ParseOverride)?;
            cfg.merge(&alert_override);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[async_trait]
impl AlertingProvider for AlertProvider {
    fn validate(&self) -> Result<()> {
        self.default_config.clone().validate()
    }

    #[instrument(
        name = "AlertProvider::send",
        skip_all,
        fields(endpoint = %endpoint.name, group = %endpoint.group, resolved = resolved)
    )]
    async fn send(
        &self,
        endpoint: &Endpoint,
        alert: &AlertDefinition,
        result: &CheckResult,
        resolved: bool,
    ) -> Result<()> {
        let cfg = self.get_config(&endpoint.group, alert)?;
        let payload = payload::build_alert(&cfg, endpoint, alert, result, resolved);

        debug!(severity = %cfg.default_severity, "Sending alert to Alertmanager");

        AlertmanagerClient::from_config(&cfg, self.client_factory.as_ref())?
            .push_alerts(vec![payload])
            .await
    }

    fn default_alert(&self) -> Option<&AlertDefinition> {
        self.default_alert.as_ref()
    }

    fn validate_overrides(&self, group: &str, alert: &AlertDefinition) -> Result<()> {
        self.get_config(group, alert).map(|_| ())
    }
}
