//! Publishes job state signals to an HTTP task intake endpoint.

use std::time::Duration;

use error_stack::Report;
use error_stack::ResultExt;
use reqwest::Url;
use tracing::debug;

use crate::domain::JobStateSignal;
use crate::domain::PublishError;
use crate::domain::SignalPublisher;

/// POSTs every signal as JSON to a fixed endpoint.
///
/// A non-2xx response counts as a failed delivery. No retry is attempted.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpPublisher {
    /// # Errors
    ///
    /// - [`PublishError::SetupFailed`] if `endpoint` is not an absolute URL
    ///   or the HTTP client cannot be built
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, Report<PublishError>> {
        let setup_failed = |message: &str| PublishError::SetupFailed {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        };

        let endpoint_url =
            Url::parse(endpoint).change_context_lazy(|| setup_failed("invalid endpoint URL"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .change_context_lazy(|| setup_failed("failed to build HTTP client"))?;

        Ok(Self {
            client,
            endpoint: endpoint_url,
        })
    }
}

#[async_trait::async_trait]
impl SignalPublisher for HttpPublisher {
    async fn publish(&self, signal: JobStateSignal) -> Result<(), Report<PublishError>> {
        let delivery_failed = |message: String| PublishError::DeliveryFailed {
            job_id: signal.job_id.clone(),
            message,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&signal)
            .send()
            .await
            .change_context_lazy(|| delivery_failed(format!("POST {} failed", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Report::new(delivery_failed(format!(
                "POST {} returned {status}",
                self.endpoint
            ))));
        }

        debug!(job_id = %signal.job_id, %status, "Signal delivered");
        Ok(())
    }
}
