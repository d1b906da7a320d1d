//! Strongly typed pod event model.
//!
//! These types are the monitor's view of a pod watch event. They are built
//! from the orchestrator payload once, at the subscription boundary, so the
//! rest of the pipeline never probes optional fields ad hoc.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Kind of change reported by the watch stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum PodEventKind {
    #[display("added")]
    Added,
    #[display("modified")]
    Modified,
    #[display("deleted")]
    Deleted,
}

/// Pod lifecycle phase as reported in `status.phase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn parse(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// State of a single container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContainerState {
    Waiting {
        reason: Option<String>,
        message: Option<String>,
    },
    Running {
        started_at: Option<DateTime<Utc>>,
    },
    Terminated {
        exit_code: i32,
        signal: Option<i32>,
        reason: Option<String>,
        message: Option<String>,
        finished_at: Option<DateTime<Utc>>,
    },
    /// The orchestrator reported no state for this container yet.
    Unknown,
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Status of one container inside a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub name: String,
    /// Runtime-prefixed reference, e.g. `docker://<id>`.
    pub container_id: Option<String>,
    pub state: ContainerState,
}

/// Immutable snapshot of a pod as carried by one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSnapshot {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub phase: Option<PodPhase>,
    pub node_name: Option<String>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
    pub container_statuses: Vec<ContainerStatus>,
}

impl PodSnapshot {
    /// Label value, treating an empty value as absent.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Statuses of every container named `name`.
    pub fn containers_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ContainerStatus> + 'a {
        self.container_statuses
            .iter()
            .filter(move |status| status.name == name)
    }
}

/// One event delivered by the pod watch stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodEvent {
    pub kind: PodEventKind,
    pub pod: PodSnapshot,
}

impl PodEvent {
    pub fn new(kind: PodEventKind, pod: PodSnapshot) -> Self {
        Self { kind, pod }
    }

    /// Whether the pod is going away, either because the event says so or
    /// because a deletion timestamp has been set.
    pub fn is_deletion(&self) -> bool {
        self.kind == PodEventKind::Deleted || self.pod.deletion_timestamp.is_some()
    }
}
