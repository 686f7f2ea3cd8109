//! Descriptors handed to the provider by the health-check loop.

use serde::{Deserialize, Serialize};

/// The endpoint whose health changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    /// Routing group, empty when the endpoint is ungrouped
    #[serde(default)]
    pub group: String,
}

/// Outcome of the latest health check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// An alert attached to an endpoint
///
/// Unset fields fall back to the provider's default alert through
/// [`AlertDefinition::with_defaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Consecutive failures before the alert fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,

    /// Consecutive successes before the alert resolves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_on_resolved: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Provider-specific settings taking precedence over every other layer.
    /// Parsed by the provider into its own config shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_override: Option<serde_yaml::Mapping>,
}

impl AlertDefinition {
    /// The description, or an empty string when unset
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Whether the alert carries a non-empty provider override
    pub fn has_provider_override(&self) -> bool {
        self.provider_override
            .as_ref()
            .is_some_and(|mapping| !mapping.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn is_sending_on_resolved(&self) -> bool {
        self.send_on_resolved.unwrap_or(false)
    }

    /// Fill every unset field from `default`.
    pub fn with_defaults(mut self, default: &AlertDefinition) -> Self {
        if self.enabled.is_none() {
            self.enabled = default.enabled;
        }
        if self.failure_threshold.is_none() {
            self.failure_threshold = default.failure_threshold;
        }
        if self.success_threshold.is_none() {
            self.success_threshold = default.success_threshold;
        }
        if self.send_on_resolved.is_none() {
            self.send_on_resolved = default.send_on_resolved;
        }
        if self.description.is_none() {
            self.description.clone_from(&default.description);
        }
        if self.provider_override.is_none() {
            self.provider_override.clone_from(&default.provider_override);
        }
        self
    }
}
