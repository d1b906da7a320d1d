//! Event watch loop.
//!
//! Consumes one pod event stream strictly in order. Each event is classified
//! and, when it carries a job transition, the registry is updated and the
//! signal published before the next event is pulled. The loop never
//! reconnects on its own: it returns when the stream ends or fails and the
//! caller decides whether to subscribe again.

use std::sync::Arc;

use error_stack::Report;
use futures::Stream;
use futures::StreamExt;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::domain::classifier::Classification;
use crate::domain::classifier::IgnoreReason;
use crate::domain::classifier::JobStateClassifier;
use crate::domain::error::WatchError;
use crate::domain::event::PodEvent;
use crate::domain::job_type::JobType;
use crate::domain::registry_updater::ContainerRegistryUpdater;
use crate::domain::traits::ContainerRegistry;
use crate::domain::traits::SignalPublisher;

/// Why [`WatchLoop::run`] returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Cancelled,
    StreamEnded,
}

/// Counters accumulated over every run of a loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub received: usize,
    pub published: usize,
    pub skipped: usize,
    pub registry_failures: usize,
    pub publish_failures: usize,
}

pub struct WatchLoop {
    classifier: JobStateClassifier,
    updater: ContainerRegistryUpdater,
    publisher: Arc<dyn SignalPublisher>,
    stats: WatchStats,
}

impl WatchLoop {
    pub fn new(
        job_type: JobType,
        registry: Arc<dyn ContainerRegistry>,
        publisher: Arc<dyn SignalPublisher>,
    ) -> Self {
        let updater = ContainerRegistryUpdater::new(registry, &job_type);
        Self {
            classifier: JobStateClassifier::new(job_type),
            updater,
            publisher,
            stats: WatchStats::default(),
        }
    }

    pub fn stats(&self) -> WatchStats {
        self.stats
    }

    /// Drives the loop until the stream ends, fails, or `cancellation_token`
    /// fires.
    ///
    /// Cancellation is only observed while waiting for the next event; an
    /// event that has been pulled from the stream is always processed to
    /// completion.
    ///
    /// # Errors
    ///
    /// - [`WatchError::StreamFailed`] if the stream reports a fatal error;
    ///   the error item is returned as is
    pub async fn run<S>(
        &mut self,
        mut events: S,
        cancellation_token: &CancellationToken,
    ) -> Result<WatchOutcome, Report<WatchError>>
    where
        S: Stream<Item = Result<PodEvent, Report<WatchError>>> + Unpin + Send,
    {
        loop {
            let next = select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    info!("Watch loop cancelled");
                    return Ok(WatchOutcome::Cancelled);
                }
                next = events.next() => next,
            };

            match next {
                None => return Ok(WatchOutcome::StreamEnded),
                Some(Ok(event)) => self.handle_event(event).await,
                Some(Err(report)) => match report.current_context() {
                    WatchError::MalformedEvent { .. } => {
                        warn!("Skipping malformed pod event: {report:?}");
                        self.stats.skipped += 1;
                    }
                    _ => return Err(report),
                },
            }
        }
    }

    /// Classifies one event and, for a job transition, records the running
    /// container and publishes the signal.
    pub async fn handle_event(&mut self, event: PodEvent) {
        self.stats.received += 1;
        debug!(kind = %event.kind, pod = ?event.pod.name, "Received pod event");

        let signal = match self.classifier.classify(&event) {
            Classification::Signal(signal) => signal,
            Classification::Ignored(IgnoreReason::MissingJobId) => {
                warn!(
                    pod = ?event.pod.name,
                    namespace = ?event.pod.namespace,
                    "Skipping malformed pod event: {}",
                    IgnoreReason::MissingJobId
                );
                self.stats.skipped += 1;
                return;
            }
            Classification::Ignored(reason) => {
                debug!(pod = ?event.pod.name, "Ignoring pod event: {reason}");
                return;
            }
        };

        let outcome = self.updater.update(&event.pod).await;
        self.stats.registry_failures += outcome.failed;

        info!(job_id = %signal.job_id, status = %signal.status, "Publishing job state");
        match self.publisher.publish(signal).await {
            Ok(()) => self.stats.published += 1,
            Err(e) => {
                error!("Failed to publish job state: {e:?}");
                self.stats.publish_failures += 1;
            }
        }
    }
}
