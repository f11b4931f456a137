//! Shared reqwest client for log transports.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::{Error, HttpConfig, Result, TRACING_TARGET};

struct HttpClientInner {
    http: Client,
    config: HttpConfig,
}

/// Thin JSON-posting client shared by [`HttpSink`](super::HttpSink) and
/// [`WebhookNotifier`](super::WebhookNotifier).
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let timeout = config.effective_timeout();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis() as u64,
            "Creating HTTP log client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpClientInner { http, config }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.inner.config
    }

    /// POSTs `body` as JSON and fails on a non-2xx status.
    pub(crate) async fn post_json<T>(&self, url: &Url, body: &T) -> Result<u16>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;

        let response = self
            .inner
            .http
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        tracing::trace!(
            target: TRACING_TARGET,
            url = %url,
            status = status.as_u16(),
            "Log transport request completed"
        );

        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(Error::Status(status.as_u16()))
        }
    }
}
