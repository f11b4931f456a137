//! Authenticated HTTP reachability checks for third-party APIs.

use std::time::Duration;

use beacon_core::{Error, ErrorKind};
use reqwest::Client;
use url::Url;

use super::Connectivity;

/// Base URL of the source-control REST API.
const GITHUB_API: &str = "https://api.github.com";

/// Endpoint listing the email provider's sending domains.
const RESEND_DOMAINS: &str = "https://api.resend.com/domains";

#[derive(Debug, Clone)]
enum Target {
    Ready { url: Url, token: Option<String> },
    Unconfigured(String),
}

/// Connectivity check issuing an authenticated GET.
///
/// Any 2xx answer counts as reachable. A missing credential makes the check
/// fail with a configuration error without touching the network.
#[derive(Debug, Clone)]
pub struct HttpConnectivity {
    client: Client,
    target: Target,
    kind: ErrorKind,
}

impl HttpConnectivity {
    /// Builds the client shared by connectivity checks.
    pub fn build_client(timeout: Duration) -> beacon_core::Result<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(format!("beacon/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration("failed to build HTTP client").with_source(e))
    }

    /// Checks `url` without credentials, reporting failures as `kind`.
    pub fn new(client: Client, url: Url, kind: ErrorKind) -> Self {
        Self {
            client,
            target: Target::Ready { url, token: None },
            kind,
        }
    }

    /// Sends `token` as a bearer credential.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        if let Target::Ready { token: slot, .. } = &mut self.target {
            *slot = Some(token.into());
        }
        self
    }

    /// Reads the configured repository through the source-control API.
    pub fn github(client: Client, repo: Option<&str>, token: Option<&str>) -> Self {
        let target = match (repo.filter(|r| !r.is_empty()), token.filter(|t| !t.is_empty())) {
            (Some(repo), Some(token)) => match Url::parse(&format!("{GITHUB_API}/repos/{repo}")) {
                Ok(url) => Target::Ready {
                    url,
                    token: Some(token.to_owned()),
                },
                Err(e) => Target::Unconfigured(format!("GITHUB_REPO is invalid: {e}")),
            },
            (None, _) => Target::Unconfigured("GITHUB_REPO not configured".to_owned()),
            (_, None) => Target::Unconfigured("GITHUB_TOKEN not configured".to_owned()),
        };

        Self {
            client,
            target,
            kind: ErrorKind::GithubApiError,
        }
    }

    /// Lists sending domains through the email provider API.
    pub fn resend(client: Client, api_key: Option<&str>) -> Self {
        let target = match (api_key.filter(|k| !k.is_empty()), Url::parse(RESEND_DOMAINS)) {
            (Some(key), Ok(url)) => Target::Ready {
                url,
                token: Some(key.to_owned()),
            },
            (None, _) => Target::Unconfigured("RESEND_API_KEY not configured".to_owned()),
            (_, Err(e)) => Target::Unconfigured(format!("invalid email provider URL: {e}")),
        };

        Self {
            client,
            target,
            kind: ErrorKind::EmailServiceError,
        }
    }
}

#[async_trait::async_trait]
impl Connectivity for HttpConnectivity {
    async fn test_connection(&self) -> beacon_core::Result<()> {
        let (url, token) = match &self.target {
            Target::Ready { url, token } => (url, token),
            Target::Unconfigured(reason) => return Err(Error::configuration(reason.clone())),
        };

        let mut request = self
            .client
            .get(url.as_str())
            .header("Accept", "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("{url} timed out"))
                    .with_code("ETIMEDOUT")
                    .with_source(e)
            } else {
                Error::network(format!("{url} unreachable")).with_source(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(Error::new(self.kind, format!("{url} responded with {status}"))
            .with_status(status.as_u16())
            .with_retryable(status.is_server_error() || status.as_u16() == 429))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        HttpConnectivity::build_client(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_a_configuration_error() {
        let probe = HttpConnectivity::github(client(), Some("beacon-dev/site"), None);
        let error = probe.test_connection().await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ConfigurationError);
        assert_eq!(error.message(), "GITHUB_TOKEN not configured");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        let probe = HttpConnectivity::resend(client(), Some(""));
        let error = probe.test_connection().await.unwrap_err();

        assert_eq!(error.message(), "RESEND_API_KEY not configured");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() -> anyhow::Result<()> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let url = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
        drop(listener);

        let probe = HttpConnectivity::new(client(), url, ErrorKind::ExternalServiceError);
        let error = probe.test_connection().await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NetworkError);
        Ok(())
    }
}
