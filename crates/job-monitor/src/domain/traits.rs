//! Seams between the monitoring core and the systems it feeds.

use error_stack::Report;
use futures::stream::BoxStream;

use crate::domain::error::PublishError;
use crate::domain::error::RegistryError;
use crate::domain::error::WatchError;
use crate::domain::event::PodEvent;
use crate::domain::registry_updater::JobContainerBinding;
use crate::domain::signal::JobStateSignal;

/// Keyed store of which job a running container belongs to.
///
/// Implementations are shared by every watch loop in the process, so each
/// upsert must be atomic on its own and safe to repeat with the same binding.
#[async_trait::async_trait]
pub trait ContainerRegistry: Send + Sync {
    async fn upsert(&self, binding: &JobContainerBinding) -> Result<(), Report<RegistryError>>;
}

/// Hands job state signals to the downstream task pipeline.
///
/// Delivery is at-least-once; retrying a failed publish is the transport's
/// concern, not the caller's.
#[async_trait::async_trait]
pub trait SignalPublisher: Send + Sync {
    async fn publish(&self, signal: JobStateSignal) -> Result<(), Report<PublishError>>;
}

/// Live, non-restartable sequence of pod events.
///
/// Item-level [`WatchError::MalformedEvent`] errors leave the stream usable;
/// any other error, or the end of the stream, means it is finished.
pub type PodEventStream = BoxStream<'static, Result<PodEvent, Report<WatchError>>>;

/// Opens pod event subscriptions scoped by label selector.
#[async_trait::async_trait]
pub trait PodEventSource: Send + Sync {
    async fn subscribe(&self, label_selector: &str) -> Result<PodEventStream, Report<WatchError>>;
}
