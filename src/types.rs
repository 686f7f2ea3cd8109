use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alertmanager API v2 alert payload
///
/// Alerts are identified by their labels. Two alerts with identical labels
/// are considered the same alert by Alertmanager and will be deduplicated.
///
/// See: <https://prometheus.io/docs/alerting/latest/clients/>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertmanagerAlert {
    /// Labels identify the alert (used for deduplication and routing)
    pub labels: HashMap<String, String>,

    /// Annotations contain additional information (not used for dedup)
    pub annotations: HashMap<String, String>,

    /// Start time of the alert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,

    /// End time, set only once the alert is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl AlertmanagerAlert {
    /// Create an empty alert starting at `starts_at`
    pub fn starting_at(starts_at: DateTime<Utc>) -> Self {
        Self {
            starts_at: Some(starts_at),
            ..Self::default()
        }
    }

    /// Add a label to the alert
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Add an annotation
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    /// Add summary annotation
    pub fn with_summary(self, summary: &str) -> Self {
        self.with_annotation("summary", summary)
    }

    /// Add description annotation
    pub fn with_description(self, description: &str) -> Self {
        self.with_annotation("description", description)
    }

    /// Set end time to resolve the alert
    pub fn with_ends_at(mut self, time: DateTime<Utc>) -> Self {
        self.ends_at = Some(time);
        self
    }

    /// Overlay every entry of `labels`, replacing existing keys
    pub fn with_labels<'a, I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Overlay every entry of `annotations`, replacing existing keys
    pub fn with_annotations<'a, I>(mut self, annotations: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.annotations
            .extend(annotations.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Whether the alert marks a recovery
    pub fn is_resolved(&self) -> bool {
        self.ends_at.is_some()
    }

    /// Get the alertname label
    pub fn alertname(&self) -> Option<&str> {
        self.labels.get("alertname").map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_alert_creation() {
        let now = Utc::now();
        let alert = AlertmanagerAlert::starting_at(now)
            .with_label("alertname", "TestAlert")
            .with_label("severity", "warning")
            .with_description("Test description");

        assert_eq!(alert.alertname(), Some("TestAlert"));
        assert_eq!(alert.labels.get("severity"), Some(&"warning".to_string()));
        assert_eq!(
            alert.annotations.get("description"),
            Some(&"Test description".to_string())
        );
        assert_eq!(alert.starts_at, Some(now));
        assert!(!alert.is_resolved());
    }

    #[test]
    fn test_firing_alert_serialization_omits_ends_at() {
        let starts_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let alert = AlertmanagerAlert::starting_at(starts_at)
            .with_label("alertname", "TestAlert")
            .with_summary("down");

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["labels"]["alertname"], "TestAlert");
        assert_eq!(json["annotations"]["summary"], "down");
        assert_eq!(json["startsAt"], "2024-05-01T12:00:00Z");
        assert!(json.get("endsAt").is_none());
    }

    #[test]
    fn test_resolved_alert_serialization() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let alert = AlertmanagerAlert::starting_at(at).with_ends_at(at);

        assert!(alert.is_resolved());
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"endsAt\":\"2024-05-01T12:00:00Z\""));
    }

    #[test]
    fn test_overlay_replaces_existing_keys() {
        let extra: HashMap<String, String> =
            [("severity".to_string(), "info".to_string())].into();
        let alert = AlertmanagerAlert::default()
            .with_label("severity", "critical")
            .with_labels(&extra);

        assert_eq!(alert.labels.get("severity"), Some(&"info".to_string()));
    }
}
