use parking_lot::RwLock;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::time::Duration;
use tracing::debug;

use crate::errors::{AlertmanagerError, Result};

/// Transport settings for the HTTP client used to reach Alertmanager
///
/// The provider treats this as opaque: it is handed to the
/// [`HttpClientFactory`] untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Do not follow redirects
    #[serde(default)]
    pub ignore_redirect: bool,

    /// Client-wide timeout. A provider timeout takes precedence per request.
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Proxy every request through this URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

/// Builds the HTTP client used for a delivery
///
/// Implement this to share a connection pool between providers or to add
/// `reqwest_middleware` layers (tracing, auth).
pub trait HttpClientFactory: Send + Sync + Debug {
    /// Return a client configured from `config`, or a default client when
    /// no transport settings were given.
    fn client(&self, config: Option<&ClientConfig>) -> Result<ClientWithMiddleware>;
}

/// Factory building `reqwest` clients, one per distinct [`ClientConfig`]
///
/// Built clients are cached so deliveries with the same transport settings
/// share one connection pool.
#[derive(Default)]
pub struct ReqwestClientFactory {
    clients: RwLock<HashMap<Option<ClientConfig>, ClientWithMiddleware>>,
}

impl ReqwestClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct clients built so far
    pub fn cached_clients(&self) -> usize {
        self.clients.read().len()
    }
}

impl Debug for ReqwestClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClientFactory")
            .field("cached_clients", &self.cached_clients())
            .finish()
    }
}

impl HttpClientFactory for ReqwestClientFactory {
    fn client(&self, config: Option<&ClientConfig>) -> Result<ClientWithMiddleware> {
        let key = config.cloned();
        if let Some(client) = self.clients.read().get(&key) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write();
        // another delivery may have built it while we waited for the lock
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }
        let client = build_client(config)?;
        clients.insert(key, client.clone());
        Ok(client)
    }
}

fn build_client(config: Option<&ClientConfig>) -> Result<ClientWithMiddleware> {
    let mut builder = Client::builder();

    if let Some(config) = config {
        #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if config.ignore_redirect {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy_url) = &config.proxy_url {
            let proxy =
                reqwest::Proxy::all(proxy_url).map_err(AlertmanagerError::BuildHttpClient)?;
            builder = builder.proxy(proxy);
        }
    }

    let client = builder
        .build()
        .map_err(AlertmanagerError::BuildHttpClient)?;

    debug!(configured = config.is_some(), "Built HTTP client");
    Ok(ClientBuilder::new(client).build())
}
