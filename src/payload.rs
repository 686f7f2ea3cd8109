use chrono::{DateTime, Utc};

use crate::alert::{AlertDefinition, CheckResult, Endpoint};
use crate::config::Config;
use crate::types::AlertmanagerAlert;

/// Value of the `alertname` label on every alert
pub const ALERT_NAME: &str = "GatusEndpointDown";

/// Value of the `job` label on every alert
pub const JOB: &str = "gatus";

/// Build the payload for one health transition, starting now.
pub fn build_alert(
    cfg: &Config,
    endpoint: &Endpoint,
    alert: &AlertDefinition,
    result: &CheckResult,
    resolved: bool,
) -> AlertmanagerAlert {
    build_alert_at(cfg, endpoint, alert, result, resolved, Utc::now())
}

/// Build the payload for one health transition at a fixed instant.
///
/// Extra labels and annotations from `cfg` are applied last and may replace
/// any of the fixed keys.
pub fn build_alert_at(
    cfg: &Config,
    endpoint: &Endpoint,
    alert: &AlertDefinition,
    result: &CheckResult,
    resolved: bool,
    now: DateTime<Utc>,
) -> AlertmanagerAlert {
    let mut payload = AlertmanagerAlert::starting_at(now)
        .with_label("alertname", ALERT_NAME)
        .with_label("instance", &endpoint.url)
        .with_label("job", JOB)
        .with_label("severity", &cfg.default_severity)
        .with_label("endpoint", &endpoint.name);
    if !endpoint.group.is_empty() {
        payload = payload.with_label("group", &endpoint.group);
    }
    payload = payload.with_labels(&cfg.extra_labels);

    payload = if resolved {
        payload
            .with_summary(&format!("Endpoint {} is now healthy", endpoint.name))
            .with_description(&format!(
                "Endpoint {} ({}) has recovered and is now passing health checks",
                endpoint.name, endpoint.url
            ))
            .with_ends_at(now)
    } else {
        let mut description = format!(
            "Endpoint {} ({}) has failed health checks",
            endpoint.name, endpoint.url
        );
        if !result.errors.is_empty() {
            description.push_str(". Errors: ");
            description.push_str(&result.errors.join(", "));
        }
        payload
            .with_summary(&format!("Endpoint {} is down", endpoint.name))
            .with_description(&description)
    };

    if !alert.description().is_empty() {
        payload = payload.with_annotation("alert_description", alert.description());
    }

    payload.with_annotations(&cfg.extra_annotations)
}
