//! Kubernetes integration.
//!
//! - [`KubePodSource`]: opens pod watch streams and converts their events
//! - [`PodWatcher`]: keeps one job type's subscription alive until shutdown
//! - [`client::connect`]: builds the API client

pub mod client;
pub mod pod_event;
pub mod pod_watcher;
pub mod subscription;
pub mod types;

pub use pod_watcher::PodWatcher;
pub use subscription::KubePodSource;
pub use types::KubernetesError;
