//! # Alertmanager Provider
//!
//! An alerting provider that turns endpoint health transitions into
//! [Prometheus Alertmanager](https://prometheus.io/docs/alerting/latest/alertmanager/)
//! alerts and pushes them to the v2 alerts API.
//!
//! ## Features
//!
//! - Layered configuration: provider defaults, per-group overrides and
//!   per-alert provider overrides
//! - Firing and resolved alerts with Prometheus-style labels and annotations
//! - Pluggable HTTP client construction through [`HttpClientFactory`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use alertmanager_provider::{
//!     AlertDefinition, AlertProvider, AlertingProvider, CheckResult, Endpoint,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlertProvider::from_yaml_str(
//!         "url: http://localhost:9093\ndefault-severity: warning\n",
//!     )?;
//!     provider.validate()?;
//!
//!     let endpoint = Endpoint {
//!         name: "API".to_string(),
//!         url: "https://api.example.com/health".to_string(),
//!         group: "production".to_string(),
//!     };
//!     let result = CheckResult {
//!         success: false,
//!         errors: vec!["connection timeout".to_string()],
//!     };
//!
//!     provider
//!         .send(&endpoint, &AlertDefinition::default(), &result, false)
//!         .await?;
//!     Ok(())
//! }
//! ```

mod alert;
mod client;
mod config;
mod errors;
mod payload;
mod provider;
mod transport;
mod types;

pub use alert::{AlertDefinition, CheckResult, Endpoint};
pub use client::{alerts_url, AlertmanagerClient, ALERTS_PATH};
pub use config::{Config, Override, DEFAULT_SEVERITY, DEFAULT_TIMEOUT};
pub use errors::{AlertmanagerError, Result};
pub use payload::{build_alert, build_alert_at, ALERT_NAME, JOB};
pub use provider::{AlertProvider, AlertingProvider};
pub use transport::{ClientConfig, HttpClientFactory, ReqwestClientFactory};
pub use types::AlertmanagerAlert;
