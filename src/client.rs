use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::errors::{AlertmanagerError, Result};
use crate::transport::HttpClientFactory;
use crate::types::AlertmanagerAlert;

/// Path of the Alertmanager v2 alerts API
pub const ALERTS_PATH: &str = "/api/v2/alerts";

/// Derive the alerts endpoint from a configured URL.
///
/// One trailing slash is trimmed and [`ALERTS_PATH`] is appended unless the
/// URL already ends with it.
pub fn alerts_url(base: &str) -> String {
    let trimmed = base.strip_suffix('/').unwrap_or(base);
    if trimmed.ends_with(ALERTS_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{ALERTS_PATH}")
    }
}

/// Client for pushing alerts to one Alertmanager alerts endpoint
#[derive(Clone)]
pub struct AlertmanagerClient {
    client: ClientWithMiddleware,
    api_url: Url,
    timeout: Duration,
}

impl AlertmanagerClient {
    /// Create a client for an effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the alerts URL cannot be parsed or the factory
    /// cannot build an HTTP client.
    pub fn from_config(cfg: &Config, factory: &dyn HttpClientFactory) -> Result<Self> {
        let url = alerts_url(&cfg.url);
        let api_url =
            Url::parse(&url).map_err(|source| AlertmanagerError::InvalidUrl { url, source })?;
        let client = factory.client(cfg.client_config.as_deref())?;

        Ok(Self::with_client(client, api_url, cfg.timeout))
    }

    /// Create a new client with a custom reqwest middleware client
    ///
    /// `api_url` is used as-is and `timeout` is applied to every request.
    pub fn with_client(client: ClientWithMiddleware, api_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            api_url,
            timeout,
        }
    }

    /// Push one or more alerts to Alertmanager
    ///
    /// Makes exactly one attempt. The response body is consumed on every path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The alerts cannot be serialized
    /// - The HTTP request fails
    /// - Alertmanager returns a non-success status code
    #[instrument(
        name = "AlertmanagerClient::push_alerts",
        skip_all,
        fields(alert_count = alerts.len(), url = %self.api_url)
    )]
    pub async fn push_alerts(&self, alerts: Vec<AlertmanagerAlert>) -> Result<()> {
        if alerts.is_empty() {
            debug!("No alerts to push");
            return Ok(());
        }

        let body = serde_json::to_vec(&alerts).map_err(AlertmanagerError::Serialize)?;

        debug!("Pushing alerts to Alertmanager");

        let mut request = self
            .client
            .post(self.api_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if !self.timeout.is_zero() {
            request = request.timeout(self.timeout);
        }

        let response = request.send().await.map_err(AlertmanagerError::Request)?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AlertmanagerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // drain so the connection goes back to the pool
        if let Err(err) = response.bytes().await {
            debug!(error = %err, "Failed to drain response body");
        }

        debug!(status = status.as_u16(), "Alerts pushed successfully");
        Ok(())
    }

    /// Push a single alert
    pub async fn push_alert(&self, alert: AlertmanagerAlert) -> Result<()> {
        self.push_alerts(vec![alert]).await
    }

    /// Get the alerts API URL
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReqwestClientFactory;
    use chrono::Utc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> Config {
        Config {
            url: url.to_string(),
            timeout: Duration::from_secs(10),
            ..Config::default()
        }
    }

    fn client(url: &str) -> AlertmanagerClient {
        AlertmanagerClient::from_config(&config(url), &ReqwestClientFactory::new()).unwrap()
    }

    #[test]
    fn test_alerts_url() {
        assert_eq!(alerts_url("http://am:9093"), "http://am:9093/api/v2/alerts");
        assert_eq!(alerts_url("http://am:9093/"), "http://am:9093/api/v2/alerts");
        assert_eq!(
            alerts_url("http://am:9093/api/v2/alerts"),
            "http://am:9093/api/v2/alerts"
        );
        assert_eq!(
            alerts_url("http://am:9093/api/v2/alerts/"),
            "http://am:9093/api/v2/alerts"
        );
        assert_eq!(
            alerts_url("http://proxy/alertmanager"),
            "http://proxy/alertmanager/api/v2/alerts"
        );
    }

    #[test]
    fn test_invalid_url() {
        let result =
            AlertmanagerClient::from_config(&config("not a url"), &ReqwestClientFactory::new());
        assert!(matches!(
            result,
            Err(AlertmanagerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_api_url_getter() {
        let client = client("http://localhost:9093/");
        assert_eq!(
            client.api_url().as_str(),
            "http://localhost:9093/api/v2/alerts"
        );
    }

    #[tokio::test]
    async fn test_push_alert_success() {
        let mock_server = MockServer::start().await;
        let alert = AlertmanagerAlert::starting_at(Utc::now()).with_label("alertname", "Test");

        Mock::given(method("POST"))
            .and(path("/api/v2/alerts"))
            .and(header("content-type", "application/json"))
            .and(body_json(vec![alert.clone()]))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri()).push_alert(alert).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_alert_to_full_alerts_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/alerts"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/api/v2/alerts/", mock_server.uri());
        let result = client(&url)
            .push_alert(AlertmanagerAlert::default())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_alert_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/alerts"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad request"))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .push_alert(AlertmanagerAlert::default())
            .await;

        if let Err(AlertmanagerError::Api { status, message }) = result {
            assert_eq!(status, 400);
            assert_eq!(message, "Bad request");
        } else {
            panic!("Expected Api error");
        }
    }

    #[tokio::test]
    async fn test_push_empty_alerts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri()).push_alerts(vec![]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_multiple_alerts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/alerts"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let alerts = vec![
            AlertmanagerAlert::default().with_label("alertname", "Alert1"),
            AlertmanagerAlert::default().with_label("alertname", "Alert2"),
        ];

        let result = client(&mock_server.uri()).push_alerts(alerts).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_alert_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let cfg = Config {
            timeout: Duration::from_millis(100),
            ..config(&mock_server.uri())
        };
        let client = AlertmanagerClient::from_config(&cfg, &ReqwestClientFactory::new()).unwrap();

        let err = client
            .push_alert(AlertmanagerAlert::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertmanagerError::Request(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // bind then drop so nothing is listening on the port
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let uri = format!("http://127.0.0.1:{port}");

        let err = client(&uri)
            .push_alert(AlertmanagerAlert::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertmanagerError::Request(_)));
    }
}
