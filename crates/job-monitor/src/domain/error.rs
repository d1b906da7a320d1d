use core::error::Error;

/// Errors raised by container registry backends.
#[derive(Debug, derive_more::Display)]
pub enum RegistryError {
    #[display("Failed to connect to container registry: {message}")]
    ConnectionFailed { message: String },
    #[display("Failed to record container {container_id} for job {job_id}")]
    UpsertFailed {
        container_id: String,
        job_id: String,
    },
}

impl Error for RegistryError {}

/// Errors raised while handing a signal to the downstream pipeline.
#[derive(Debug, derive_more::Display)]
pub enum PublishError {
    #[display("Failed to set up publisher for {endpoint}: {message}")]
    SetupFailed { endpoint: String, message: String },
    #[display("Failed to deliver signal for job {job_id}: {message}")]
    DeliveryFailed { job_id: String, message: String },
    #[display("Signal consumer for job {job_id} is gone")]
    ConsumerClosed { job_id: String },
}

impl Error for PublishError {}

/// Errors carried by the pod event stream.
///
/// `MalformedEvent` is item-level: the stream is still usable and the loop
/// skips the item. Every other variant means the stream is finished.
#[derive(Debug, derive_more::Display)]
pub enum WatchError {
    #[display("Malformed pod event: {message}")]
    MalformedEvent { message: String },
    #[display("Failed to subscribe to pod events: {message}")]
    SubscribeFailed { message: String },
    #[display("Pod watch stream failed: {message}")]
    StreamFailed { message: String },
}

impl Error for WatchError {}
