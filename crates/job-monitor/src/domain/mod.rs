//! Monitoring core: event model, classification, registry updates and the
//! watch loop. Nothing in here talks to Kubernetes, Redis or HTTP directly.

pub mod classifier;
pub mod container_id;
pub mod error;
pub mod event;
pub mod job_type;
pub mod registry_updater;
pub mod signal;
pub mod traits;
pub mod watch_loop;

pub use classifier::Classification;
pub use classifier::IgnoreReason;
pub use classifier::JobStateClassifier;
pub use container_id::CanonicalContainerId;
pub use error::PublishError;
pub use error::RegistryError;
pub use error::WatchError;
pub use event::ContainerState;
pub use event::ContainerStatus;
pub use event::PodEvent;
pub use event::PodEventKind;
pub use event::PodPhase;
pub use event::PodSnapshot;
pub use job_type::JobType;
pub use registry_updater::ContainerRegistryUpdater;
pub use registry_updater::JobContainerBinding;
pub use signal::JobStateSignal;
pub use signal::JobStatus;
pub use traits::ContainerRegistry;
pub use traits::PodEventSource;
pub use traits::PodEventStream;
pub use traits::SignalPublisher;
pub use watch_loop::WatchLoop;
pub use watch_loop::WatchOutcome;
pub use watch_loop::WatchStats;
