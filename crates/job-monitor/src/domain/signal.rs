use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::container_id::CanonicalContainerId;
use crate::domain::event::ContainerState;
use crate::domain::event::PodEventKind;
use crate::domain::event::PodPhase;

/// Normalized job status derived from the main container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[display("running")]
    Running,
    #[display("succeeded")]
    Succeeded,
    #[display("failed")]
    Failed,
    #[display("stopped")]
    Stopped,
}

/// Main container details carried in a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDetails {
    pub name: String,
    pub container_id: Option<CanonicalContainerId>,
    #[serde(flatten)]
    pub state: ContainerState,
}

/// Pod context a signal was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStateDetails {
    pub event_kind: PodEventKind,
    pub pod_name: Option<String>,
    pub namespace: Option<String>,
    pub phase: Option<PodPhase>,
    pub node_name: Option<String>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
    pub main_container: ContainerDetails,
}

/// Job state transition handed to the downstream pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStateSignal {
    pub job_id: String,
    pub job_type: String,
    pub status: JobStatus,
    pub message: Option<String>,
    pub details: PodStateDetails,
}
