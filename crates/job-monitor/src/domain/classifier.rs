//! Decides whether a pod event is a job lifecycle transition.
//!
//! Classification only looks at the event it is given. Delivering the same
//! event twice yields the same [`Classification`], and two different
//! snapshots delivered out of order yield their transitions out of order;
//! downstream consumers are expected to tolerate both.

use crate::domain::container_id::CanonicalContainerId;
use crate::domain::event::ContainerState;
use crate::domain::event::ContainerStatus;
use crate::domain::event::PodEvent;
use crate::domain::job_type::JobType;
use crate::domain::signal::ContainerDetails;
use crate::domain::signal::JobStateSignal;
use crate::domain::signal::JobStatus;
use crate::domain::signal::PodStateDetails;

/// Why an event produced no signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IgnoreReason {
    /// The pod does not carry this job type's label value.
    #[display("pod is not of this job type")]
    OutOfScope,
    /// The pod is in scope but has no job identifier label.
    #[display("pod has no job identifier label")]
    MissingJobId,
    /// Only sidecar or init containers reported a status.
    #[display("main container has no status")]
    NoMainContainer,
    /// The main container is waiting or its state is unknown.
    #[display("main container is not in a lifecycle milestone")]
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Signal(JobStateSignal),
    Ignored(IgnoreReason),
}

impl Classification {
    pub fn into_signal(self) -> Option<JobStateSignal> {
        match self {
            Classification::Signal(signal) => Some(signal),
            Classification::Ignored(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobStateClassifier {
    job_type: JobType,
}

impl JobStateClassifier {
    pub fn new(job_type: JobType) -> Self {
        Self { job_type }
    }

    pub fn classify(&self, event: &PodEvent) -> Classification {
        let pod = &event.pod;

        if pod.label(&self.job_type.job_type_label) != Some(self.job_type.job_type.as_str()) {
            return Classification::Ignored(IgnoreReason::OutOfScope);
        }

        let Some(job_id) = pod.label(&self.job_type.job_id_label) else {
            return Classification::Ignored(IgnoreReason::MissingJobId);
        };

        let Some(main) = pod.containers_named(&self.job_type.main_container).next() else {
            return Classification::Ignored(IgnoreReason::NoMainContainer);
        };

        let Some((status, message)) = Self::decide(event, main) else {
            return Classification::Ignored(IgnoreReason::NotReady);
        };

        Classification::Signal(JobStateSignal {
            job_id: job_id.to_string(),
            job_type: self.job_type.job_type.clone(),
            status,
            message,
            details: PodStateDetails {
                event_kind: event.kind,
                pod_name: pod.name.clone(),
                namespace: pod.namespace.clone(),
                phase: pod.phase.clone(),
                node_name: pod.node_name.clone(),
                deletion_timestamp: pod.deletion_timestamp,
                main_container: ContainerDetails {
                    name: main.name.clone(),
                    container_id: CanonicalContainerId::resolve(main.container_id.as_deref()),
                    state: main.state.clone(),
                },
            },
        })
    }

    /// Maps the main container's state to a job status. A terminated
    /// container reports its outcome even when the pod is being deleted.
    fn decide(event: &PodEvent, main: &ContainerStatus) -> Option<(JobStatus, Option<String>)> {
        if let ContainerState::Terminated {
            exit_code,
            signal,
            reason,
            message,
            ..
        } = &main.state
        {
            let status = if *exit_code == 0 {
                JobStatus::Succeeded
            } else {
                JobStatus::Failed
            };
            return Some((
                status,
                termination_message(*exit_code, *signal, reason.as_deref(), message.as_deref()),
            ));
        }

        if event.is_deletion() {
            let message = match event.pod.deletion_timestamp {
                Some(at) => format!("pod deleted at {}", at.to_rfc3339()),
                None => "pod deleted".to_string(),
            };
            return Some((JobStatus::Stopped, Some(message)));
        }

        match main.state {
            ContainerState::Running { .. } => Some((JobStatus::Running, None)),
            _ => None,
        }
    }
}

fn termination_message(
    exit_code: i32,
    signal: Option<i32>,
    reason: Option<&str>,
    message: Option<&str>,
) -> Option<String> {
    if exit_code == 0 && message.is_none() {
        return None;
    }

    let mut parts = Vec::new();
    if let Some(reason) = reason {
        parts.push(reason.to_string());
    }
    parts.push(format!("exit code {exit_code}"));
    if let Some(signal) = signal {
        parts.push(format!("signal {signal}"));
    }
    if let Some(message) = message {
        parts.push(message.to_string());
    }
    Some(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use chrono::Utc;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::domain::event::PodEventKind;
    use crate::domain::event::PodSnapshot;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn container(name: &str, container_id: Option<&str>, state: ContainerState) -> ContainerStatus {
        ContainerStatus {
            name: name.to_string(),
            container_id: container_id.map(str::to_string),
            state,
        }
    }

    fn running() -> ContainerState {
        ContainerState::Running { started_at: None }
    }

    fn train_event(kind: PodEventKind, containers: Vec<ContainerStatus>) -> PodEvent {
        PodEvent::new(
            kind,
            PodSnapshot {
                name: Some("train-j-42".to_string()),
                namespace: Some("jobs".to_string()),
                labels: labels(&[("job_id", "j-42"), ("job-type", "train")]),
                container_statuses: containers,
                ..Default::default()
            },
        )
    }

    fn classifier() -> JobStateClassifier {
        JobStateClassifier::new(JobType::new("train", "main"))
    }

    #[test]
    fn running_main_container_is_running() {
        let event = train_event(
            PodEventKind::Modified,
            vec![container("main", Some("docker://cid1"), running())],
        );

        let signal = classifier()
            .classify(&event)
            .into_signal()
            .expect("running main container should produce a signal");

        assert_eq!(signal.job_id, "j-42");
        assert_eq!(signal.job_type, "train");
        assert_eq!(signal.status, JobStatus::Running);
        assert_eq!(signal.message, None);
        assert_eq!(
            signal.details.main_container.container_id,
            CanonicalContainerId::resolve(Some("cid1"))
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let event = train_event(
            PodEventKind::Modified,
            vec![container("main", Some("docker://cid1"), running())],
        );
        let classifier = classifier();

        assert_eq!(classifier.classify(&event), classifier.classify(&event));
    }

    #[test]
    fn other_job_type_is_out_of_scope() {
        let mut event = train_event(
            PodEventKind::Added,
            vec![container("main", Some("docker://cid1"), running())],
        );
        event
            .pod
            .labels
            .insert("job-type".to_string(), "notebook".to_string());

        assert_eq!(
            classifier().classify(&event),
            Classification::Ignored(IgnoreReason::OutOfScope)
        );
    }

    #[test]
    fn missing_job_id_is_ignored() {
        let mut event = train_event(
            PodEventKind::Added,
            vec![container("main", Some("docker://cid1"), running())],
        );
        event.pod.labels.remove("job_id");

        assert_eq!(
            classifier().classify(&event),
            Classification::Ignored(IgnoreReason::MissingJobId)
        );
    }

    #[test]
    fn sidecar_only_produces_nothing() {
        let states = [
            running(),
            ContainerState::Terminated {
                exit_code: 1,
                signal: None,
                reason: Some("Error".to_string()),
                message: None,
                finished_at: None,
            },
        ];
        for state in states {
            let event = train_event(
                PodEventKind::Modified,
                vec![container("sidecar", Some("docker://side"), state)],
            );
            assert_eq!(
                classifier().classify(&event),
                Classification::Ignored(IgnoreReason::NoMainContainer)
            );
        }
    }

    #[test]
    fn waiting_main_container_is_not_ready() {
        let event = train_event(
            PodEventKind::Modified,
            vec![container(
                "main",
                Some("docker://cid1"),
                ContainerState::Waiting {
                    reason: Some("ContainerCreating".to_string()),
                    message: None,
                },
            )],
        );

        assert_eq!(
            classifier().classify(&event),
            Classification::Ignored(IgnoreReason::NotReady)
        );
    }

    #[test]
    fn exit_code_decides_outcome() {
        let terminated = |exit_code| ContainerState::Terminated {
            exit_code,
            signal: None,
            reason: Some(if exit_code == 0 { "Completed" } else { "Error" }.to_string()),
            message: None,
            finished_at: None,
        };

        let succeeded = classifier()
            .classify(&train_event(
                PodEventKind::Modified,
                vec![container("main", Some("docker://cid1"), terminated(0))],
            ))
            .into_signal()
            .expect("terminated container should produce a signal");
        assert_eq!(succeeded.status, JobStatus::Succeeded);
        assert_eq!(succeeded.message, None);

        let failed = classifier()
            .classify(&train_event(
                PodEventKind::Modified,
                vec![container("main", Some("docker://cid1"), terminated(137))],
            ))
            .into_signal()
            .expect("terminated container should produce a signal");
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("Error, exit code 137"));
    }

    #[test]
    fn deleted_pod_is_stopped() {
        let event = train_event(
            PodEventKind::Deleted,
            vec![container("main", Some("docker://cid1"), running())],
        );

        let signal = classifier()
            .classify(&event)
            .into_signal()
            .expect("deleted pod should produce a signal");
        assert_eq!(signal.status, JobStatus::Stopped);
        assert_eq!(signal.message.as_deref(), Some("pod deleted"));
    }

    #[test]
    fn terminating_pod_reports_deletion_time() {
        let mut event = train_event(
            PodEventKind::Modified,
            vec![container("main", Some("docker://cid1"), running())],
        );
        let at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        event.pod.deletion_timestamp = Some(at);

        let signal = classifier()
            .classify(&event)
            .into_signal()
            .expect("terminating pod should produce a signal");
        assert_eq!(signal.status, JobStatus::Stopped);
        assert_eq!(
            signal.message.as_deref(),
            Some("pod deleted at 2024-05-01T12:00:00+00:00")
        );
    }

    #[test]
    fn terminated_outcome_wins_over_deletion() {
        let event = train_event(
            PodEventKind::Deleted,
            vec![container(
                "main",
                Some("docker://cid1"),
                ContainerState::Terminated {
                    exit_code: 0,
                    signal: None,
                    reason: Some("Completed".to_string()),
                    message: None,
                    finished_at: None,
                },
            )],
        );

        let signal = classifier()
            .classify(&event)
            .into_signal()
            .expect("terminated container should produce a signal");
        assert_eq!(signal.status, JobStatus::Succeeded);
    }

    #[test]
    fn custom_label_keys() {
        let mut job_type = JobType::new("experiment", "worker");
        job_type.job_id_label = "experiment-uuid".to_string();
        job_type.job_type_label = "role".to_string();
        let classifier = JobStateClassifier::new(job_type);

        let event = PodEvent::new(
            PodEventKind::Added,
            PodSnapshot {
                labels: labels(&[("experiment-uuid", "e-1"), ("role", "experiment")]),
                container_statuses: vec![container("worker", Some("cid9"), running())],
                ..Default::default()
            },
        );

        let signal = classifier
            .classify(&event)
            .into_signal()
            .expect("custom labels should be honored");
        assert_eq!(signal.job_id, "e-1");
    }
}
