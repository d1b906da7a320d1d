//! Pod watch subscription backed by the Kubernetes watch API.

use error_stack::Report;
use futures::future;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::WatchEvent;
use kube::api::WatchParams;
use kube::Api;
use kube::Client;

use crate::domain::PodEvent;
use crate::domain::PodEventKind;
use crate::domain::PodEventSource;
use crate::domain::PodEventStream;
use crate::domain::WatchError;
use crate::infrastructure::k8s::pod_event::pod_event;

/// Resource version meaning "any": the server starts the watch with an
/// `ADDED` event for every pod that currently matches.
const WATCH_FROM_ANY_VERSION: &str = "0";

/// Pod subscriptions in one namespace.
#[derive(Clone)]
pub struct KubePodSource {
    api: Api<Pod>,
    namespace: String,
}

impl KubePodSource {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PodEventSource for KubePodSource {
    async fn subscribe(&self, label_selector: &str) -> Result<PodEventStream, Report<WatchError>> {
        let params = WatchParams::default().labels(label_selector);

        let stream = self
            .api
            .watch(&params, WATCH_FROM_ANY_VERSION)
            .await
            .map_err(|e| {
                Report::new(WatchError::SubscribeFailed {
                    message: format!(
                        "watch pods in {} with selector `{label_selector}`",
                        self.namespace
                    ),
                })
                .attach_printable(format!("Kubernetes API error: {e}"))
            })?;

        Ok(stream
            .filter_map(|item| future::ready(watch_item(item)))
            .boxed())
    }
}

/// Maps one raw watch item. Bookmarks are dropped, undecodable items become
/// item-level errors and API error events end the stream.
fn watch_item(
    item: kube::Result<WatchEvent<Pod>>,
) -> Option<Result<PodEvent, Report<WatchError>>> {
    match item {
        Ok(WatchEvent::Added(pod)) => Some(Ok(pod_event(PodEventKind::Added, pod))),
        Ok(WatchEvent::Modified(pod)) => Some(Ok(pod_event(PodEventKind::Modified, pod))),
        Ok(WatchEvent::Deleted(pod)) => Some(Ok(pod_event(PodEventKind::Deleted, pod))),
        Ok(WatchEvent::Bookmark(_)) => None,
        Ok(WatchEvent::Error(response)) => Some(Err(Report::new(WatchError::StreamFailed {
            message: format!(
                "{} ({}): {}",
                response.reason, response.code, response.message
            ),
        }))),
        Err(kube::Error::SerdeError(e)) => Some(Err(Report::new(WatchError::MalformedEvent {
            message: e.to_string(),
        }))),
        Err(e) => Some(Err(Report::new(WatchError::StreamFailed {
            message: e.to_string(),
        }))),
    }
}
