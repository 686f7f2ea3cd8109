use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AlertmanagerError, Result};
use crate::transport::ClientConfig;

/// Timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Severity label applied when none is configured
pub const DEFAULT_SEVERITY: &str = "critical";

/// Settings of one Alertmanager provider
///
/// The same shape is used for the provider defaults, for group overrides and
/// for alert-level overrides. Unset fields are the zero value: an empty
/// string, [`Duration::ZERO`], an empty map or `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Alertmanager base URL, or the full `/api/v2/alerts` URL
    #[serde(default)]
    pub url: String,

    /// Timeout for HTTP requests to Alertmanager
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub timeout: Duration,

    /// Value of the `severity` label
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_severity: String,

    /// Additional labels added to every alert
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub extra_labels: HashMap<String, String>,

    /// Additional annotations added to every alert
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub extra_annotations: HashMap<String, String>,

    /// Transport settings, shared rather than copied between resolutions
    #[serde(
        default,
        rename = "client",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_config: Option<Arc<ClientConfig>>,
}

impl Config {
    /// Check the URL is set and fill in the timeout and severity defaults.
    ///
    /// Mutates `self`, so call it on an effective copy, never on stored
    /// provider defaults.
    pub fn validate(&mut self) -> Result<()> {
        if self.url.is_empty() {
            return Err(AlertmanagerError::UrlNotSet);
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.default_severity.is_empty() {
            self.default_severity = DEFAULT_SEVERITY.to_string();
        }
        Ok(())
    }

    /// Apply every field set in `other` on top of `self`.
    ///
    /// Scalars are replaced, the label and annotation maps are unioned with
    /// `other` winning on key collisions, and the client config is replaced
    /// wholesale.
    pub fn merge(&mut self, other: &Config) {
        if let Some(client_config) = &other.client_config {
            self.client_config = Some(Arc::clone(client_config));
        }
        if !other.url.is_empty() {
            self.url.clone_from(&other.url);
        }
        if !other.timeout.is_zero() {
            self.timeout = other.timeout;
        }
        if !other.default_severity.is_empty() {
            self.default_severity.clone_from(&other.default_severity);
        }
        merge_map(&mut self.extra_labels, &other.extra_labels);
        merge_map(&mut self.extra_annotations, &other.extra_annotations);
    }
}

/// A YAML scalar of any type, read as its string form.
#[derive(PartialEq, Eq, Hash)]
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Scalar, E> {
                Ok(Scalar(String::new()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// Read a string map whose keys and values may be any YAML scalar,
/// including when buffered by `#[serde(flatten)]`.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<Scalar, Scalar>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k.0, v.0)).collect())
}

fn merge_map(into: &mut HashMap<String, String>, from: &HashMap<String, String>) {
    into.extend(from.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// A case under which the default configuration is overridden for one
/// routing group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub group: String,

    #[serde(flatten)]
    pub config: Config,
}
