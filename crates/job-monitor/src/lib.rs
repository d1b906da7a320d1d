//! Job status monitor.
//!
//! Watches the pods of configured job types, turns container lifecycle
//! changes into [`domain::JobStateSignal`]s, records running main containers
//! in a shared registry and publishes the signals downstream.

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use domain::CanonicalContainerId;
pub use domain::JobStateClassifier;
pub use domain::JobStateSignal;
pub use domain::JobType;
pub use domain::WatchLoop;
pub use infrastructure::k8s::PodWatcher;
