use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::domain::container_id::CanonicalContainerId;
use crate::domain::event::PodSnapshot;
use crate::domain::job_type::JobType;
use crate::domain::traits::ContainerRegistry;

/// A running main container and the job it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobContainerBinding {
    pub container_id: CanonicalContainerId,
    pub job_id: String,
}

/// Result of one registry update pass over a pod.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub recorded: usize,
    pub failed: usize,
}

/// Records running main containers in the shared container registry.
#[derive(Clone)]
pub struct ContainerRegistryUpdater {
    registry: Arc<dyn ContainerRegistry>,
    main_container: String,
    job_id_label: String,
}

impl ContainerRegistryUpdater {
    pub fn new(registry: Arc<dyn ContainerRegistry>, job_type: &JobType) -> Self {
        Self {
            registry,
            main_container: job_type.main_container.clone(),
            job_id_label: job_type.job_id_label.clone(),
        }
    }

    /// Upserts a binding for every running main container whose id resolves.
    ///
    /// Containers that are not running yet, or have no id, are skipped. A
    /// failed upsert is logged and the remaining containers are still tried.
    pub async fn update(&self, pod: &PodSnapshot) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        let Some(job_id) = pod.label(&self.job_id_label) else {
            debug!(pod = ?pod.name, "Pod has no job id label, skipping registry update");
            return outcome;
        };

        for status in pod.containers_named(&self.main_container) {
            let Some(container_id) = CanonicalContainerId::resolve(status.container_id.as_deref())
            else {
                continue;
            };
            if !status.state.is_running() {
                continue;
            }

            let binding = JobContainerBinding {
                container_id,
                job_id: job_id.to_string(),
            };

            match self.registry.upsert(&binding).await {
                Ok(()) => {
                    info!(
                        container_id = %binding.container_id,
                        job_id = %binding.job_id,
                        "Monitoring job container"
                    );
                    outcome.recorded += 1;
                }
                Err(e) => {
                    warn!("Failed to record job container: {e:?}");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}
