use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::domain::ContainerRegistry;
use crate::domain::JobType;
use crate::domain::PodEventSource;
use crate::domain::SignalPublisher;
use crate::domain::WatchLoop;
use crate::domain::WatchOutcome;
use crate::domain::WatchStats;

/// Delay before subscribing again after a failed subscription or stream.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Watches the pods of one job type.
///
/// Owns the subscription for the job type's label selector and hands every
/// stream it opens to a [`WatchLoop`]. When a stream ends the watcher
/// subscribes again right away; when subscribing or streaming fails it waits
/// `retry_delay` first.
pub struct PodWatcher {
    source: Arc<dyn PodEventSource>,
    job_type: JobType,
    registry: Arc<dyn ContainerRegistry>,
    publisher: Arc<dyn SignalPublisher>,
    retry_delay: Duration,
}

impl PodWatcher {
    pub fn new(
        source: Arc<dyn PodEventSource>,
        job_type: JobType,
        registry: Arc<dyn ContainerRegistry>,
        publisher: Arc<dyn SignalPublisher>,
    ) -> Self {
        Self {
            source,
            job_type,
            registry,
            publisher,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn job_type(&self) -> &JobType {
        &self.job_type
    }

    /// Start watching pods for changes.
    ///
    /// Runs until `cancellation_token` is cancelled and returns the counters
    /// accumulated over every stream it consumed.
    #[tracing::instrument(
        skip_all,
        fields(
            job_type = %self.job_type.job_type,
            selector = %self.job_type.effective_label_selector(),
        )
    )]
    pub async fn run(&self, cancellation_token: CancellationToken) -> WatchStats {
        info!("Starting pod watcher");
        let selector = self.job_type.effective_label_selector();
        let mut watch_loop = WatchLoop::new(
            self.job_type.clone(),
            self.registry.clone(),
            self.publisher.clone(),
        );

        loop {
            let subscription = select! {
                _ = cancellation_token.cancelled() => break,
                subscription = self.source.subscribe(&selector) => subscription,
            };

            let result = match subscription {
                Ok(events) => watch_loop.run(events, &cancellation_token).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(WatchOutcome::Cancelled) => break,
                Ok(WatchOutcome::StreamEnded) => {
                    warn!("Pod watch stream ended, resubscribing");
                    continue;
                }
                Err(e) => {
                    error!("Pod watch failed: {e:?}");
                }
            }

            select! {
                _ = cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }

        let stats = watch_loop.stats();
        info!(
            received = stats.received,
            published = stats.published,
            skipped = stats.skipped,
            "Pod watcher stopped"
        );
        stats
    }
}
