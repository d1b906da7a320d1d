use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::JobStateSignal;
use crate::infrastructure::k8s::PodWatcher;

/// Application dependencies. The watchers share one registry and one
/// publisher.
pub struct ApplicationServices {
    pub pod_watchers: Vec<Arc<PodWatcher>>,
    /// Consumer side of the channel publisher, when signals stay in-process.
    pub signal_receiver: Option<mpsc::Receiver<JobStateSignal>>,
}
