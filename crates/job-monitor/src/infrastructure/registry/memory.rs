//! Process-local container registry.

use dashmap::DashMap;
use error_stack::Report;

use crate::domain::CanonicalContainerId;
use crate::domain::ContainerRegistry;
use crate::domain::JobContainerBinding;
use crate::domain::RegistryError;

/// Container registry kept in memory, keyed by canonical container id.
#[derive(Debug, Default)]
pub struct InMemoryContainerRegistry {
    bindings: DashMap<CanonicalContainerId, String>,
}

impl InMemoryContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Job the container is bound to, if any.
    pub fn job_for(&self, container_id: &str) -> Option<String> {
        CanonicalContainerId::resolve(Some(container_id))
            .and_then(|id| self.bindings.get(&id).map(|job_id| job_id.value().clone()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[async_trait::async_trait]
impl ContainerRegistry for InMemoryContainerRegistry {
    async fn upsert(&self, binding: &JobContainerBinding) -> Result<(), Report<RegistryError>> {
        self.bindings
            .insert(binding.container_id.clone(), binding.job_id.clone());
        Ok(())
    }
}
