//! Conversion from Kubernetes API objects into the monitor's event model.

use k8s_openapi::api::core::v1::ContainerState as K8sContainerState;
use k8s_openapi::api::core::v1::ContainerStatus as K8sContainerStatus;
use k8s_openapi::api::core::v1::Pod;

use crate::domain::ContainerState;
use crate::domain::ContainerStatus;
use crate::domain::PodEvent;
use crate::domain::PodEventKind;
use crate::domain::PodPhase;
use crate::domain::PodSnapshot;

pub fn pod_event(kind: PodEventKind, pod: Pod) -> PodEvent {
    PodEvent::new(kind, pod_snapshot(pod))
}

pub fn pod_snapshot(pod: Pod) -> PodSnapshot {
    let metadata = pod.metadata;
    let status = pod.status.unwrap_or_default();

    PodSnapshot {
        name: metadata.name,
        namespace: metadata.namespace,
        labels: metadata.labels.unwrap_or_default(),
        phase: status.phase.as_deref().map(PodPhase::parse),
        node_name: pod.spec.and_then(|spec| spec.node_name),
        deletion_timestamp: metadata.deletion_timestamp.map(|time| time.0),
        container_statuses: status
            .container_statuses
            .unwrap_or_default()
            .into_iter()
            .map(container_status)
            .collect(),
    }
}

fn container_status(status: K8sContainerStatus) -> ContainerStatus {
    ContainerStatus {
        name: status.name,
        container_id: status.container_id,
        state: status.state.map_or(ContainerState::Unknown, container_state),
    }
}

/// Only one of the three fields is set in practice; a terminated state wins
/// if the API ever reports more than one.
fn container_state(state: K8sContainerState) -> ContainerState {
    if let Some(terminated) = state.terminated {
        return ContainerState::Terminated {
            exit_code: terminated.exit_code,
            signal: terminated.signal,
            reason: terminated.reason,
            message: terminated.message,
            finished_at: terminated.finished_at.map(|time| time.0),
        };
    }
    if let Some(running) = state.running {
        return ContainerState::Running {
            started_at: running.started_at.map(|time| time.0),
        };
    }
    if let Some(waiting) = state.waiting {
        return ContainerState::Waiting {
            reason: waiting.reason,
            message: waiting.message,
        };
    }
    ContainerState::Unknown
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use chrono::Utc;
    use k8s_openapi::api::core::v1::ContainerStateRunning;
    use k8s_openapi::api::core::v1::ContainerStateTerminated;
    use k8s_openapi::api::core::v1::ContainerStateWaiting;
    use k8s_openapi::api::core::v1::PodSpec;
    use k8s_openapi::api::core::v1::PodStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use similar_asserts::assert_eq;

    use super::*;

    fn k8s_status(
        name: &str,
        container_id: Option<&str>,
        state: Option<K8sContainerState>,
    ) -> K8sContainerStatus {
        K8sContainerStatus {
            name: name.to_string(),
            container_id: container_id.map(str::to_string),
            state,
            ..Default::default()
        }
    }

    fn create_test_pod(statuses: Vec<K8sContainerStatus>) -> Pod {
        let mut labels = BTreeMap::new();
        labels.insert("job_id".to_string(), "j-42".to_string());
        labels.insert("job-type".to_string(), "train".to_string());

        Pod {
            metadata: ObjectMeta {
                name: Some("train-j-42".to_string()),
                namespace: Some("jobs".to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(PodSpec {
                node_name: Some("node-a".to_string()),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                container_statuses: Some(statuses),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn converts_metadata_and_running_container() {
        let started = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let pod = create_test_pod(vec![k8s_status(
            "main",
            Some("docker://cid1"),
            Some(K8sContainerState {
                running: Some(ContainerStateRunning {
                    started_at: Some(Time(started)),
                }),
                ..Default::default()
            }),
        )]);

        let event = pod_event(PodEventKind::Added, pod);

        assert_eq!(event.kind, PodEventKind::Added);
        assert_eq!(event.pod.name.as_deref(), Some("train-j-42"));
        assert_eq!(event.pod.namespace.as_deref(), Some("jobs"));
        assert_eq!(event.pod.node_name.as_deref(), Some("node-a"));
        assert_eq!(event.pod.phase, Some(PodPhase::Running));
        assert_eq!(event.pod.label("job_id"), Some("j-42"));
        assert_eq!(
            event.pod.container_statuses,
            vec![ContainerStatus {
                name: "main".to_string(),
                container_id: Some("docker://cid1".to_string()),
                state: ContainerState::Running {
                    started_at: Some(started),
                },
            }]
        );
    }

    #[test]
    fn converts_terminated_and_waiting_states() {
        let pod = create_test_pod(vec![
            k8s_status(
                "main",
                Some("docker://cid1"),
                Some(K8sContainerState {
                    terminated: Some(ContainerStateTerminated {
                        exit_code: 2,
                        reason: Some("Error".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            ),
            k8s_status(
                "sidecar",
                None,
                Some(K8sContainerState {
                    waiting: Some(ContainerStateWaiting {
                        reason: Some("ImagePullBackOff".to_string()),
                        message: None,
                    }),
                    ..Default::default()
                }),
            ),
            k8s_status("init", None, None),
        ]);

        let snapshot = pod_snapshot(pod);

        let states: Vec<_> = snapshot
            .container_statuses
            .into_iter()
            .map(|status| status.state)
            .collect();
        assert_eq!(
            states,
            vec![
                ContainerState::Terminated {
                    exit_code: 2,
                    signal: None,
                    reason: Some("Error".to_string()),
                    message: None,
                    finished_at: None,
                },
                ContainerState::Waiting {
                    reason: Some("ImagePullBackOff".to_string()),
                    message: None,
                },
                ContainerState::Unknown,
            ]
        );
    }

    #[test]
    fn pod_without_status_has_no_containers() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("bare".to_string()),
                ..Default::default()
            },
            spec: None,
            status: None,
        };

        let snapshot = pod_snapshot(pod);

        assert!(snapshot.container_statuses.is_empty());
        assert!(snapshot.labels.is_empty());
        assert_eq!(snapshot.phase, None);
    }
}
