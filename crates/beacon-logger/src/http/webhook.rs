//! Best-effort forwarding of log records to an external webhook.

use beacon_core::{Environment, RetryPolicy, retry};
use serde::Serialize;
use url::Url;

use super::{HttpClient, TRACING_TARGET};
use crate::LogRecord;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    record: &'a LogRecord,
    service: &'a str,
    environment: Environment,
}

/// Forwards records to an external error-collection webhook.
///
/// [`notify`](Self::notify) spawns a detached task that retries under
/// [`RetryPolicy::api`]; its outcome is only visible through local tracing.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: HttpClient,
    url: Url,
    service: String,
    environment: Environment,
    retry_policy: RetryPolicy,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url`.
    pub fn new(
        client: HttpClient,
        url: Url,
        service: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            client,
            url,
            service: service.into(),
            environment,
            retry_policy: RetryPolicy::api(),
        }
    }

    /// Replaces the policy detached deliveries are retried under.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Returns the webhook URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Posts the record together with the service name and environment tag.
    pub async fn deliver(&self, record: &LogRecord) -> beacon_core::Result<()> {
        let payload = WebhookPayload {
            record,
            service: &self.service,
            environment: self.environment,
        };

        self.client.post_json(&self.url, &payload).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            record_id = %record.id,
            "Forwarded log record to webhook"
        );

        Ok(())
    }

    /// Spawns delivery on the current runtime and returns immediately.
    ///
    /// Outside a tokio runtime the record is dropped with a warning.
    pub fn notify(&self, record: LogRecord) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                target: TRACING_TARGET,
                record_id = %record.id,
                "No async runtime, webhook forwarding skipped"
            );
            return;
        };

        let notifier = self.clone();
        runtime.spawn(async move {
            let delivery = retry("webhook", &notifier.retry_policy, || {
                notifier.deliver(&record)
            });
            if let Err(error) = delivery.await {
                tracing::warn!(
                    target: TRACING_TARGET,
                    record_id = %record.id,
                    url = %notifier.url,
                    error = %error,
                    "Failed to forward log record to webhook"
                );
            }
        });
    }
}
