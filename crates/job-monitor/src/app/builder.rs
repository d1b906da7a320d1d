use std::sync::Arc;

use anyhow::Result;
use error_stack::Report;
use tokio::sync::mpsc;

use crate::app::services::ApplicationServices;
use crate::app::Application;
use crate::config::DaemonArgs;
use crate::domain::ContainerRegistry;
use crate::domain::JobStateSignal;
use crate::domain::JobType;
use crate::domain::PodEventSource;
use crate::domain::SignalPublisher;
use crate::infrastructure::k8s::client;
use crate::infrastructure::k8s::KubePodSource;
use crate::infrastructure::k8s::PodWatcher;
use crate::infrastructure::publisher::ChannelPublisher;
use crate::infrastructure::publisher::HttpPublisher;
use crate::infrastructure::registry::InMemoryContainerRegistry;
use crate::infrastructure::registry::RedisContainerRegistry;

type SignalReceiver = Option<mpsc::Receiver<JobStateSignal>>;

/// error-stack reports carry their context chain in the Debug output.
fn into_anyhow<C>(report: Report<C>) -> anyhow::Error {
    anyhow::anyhow!("{report:?}")
}

/// Application builder
pub struct ApplicationBuilder {
    daemon_args: DaemonArgs,
}

impl ApplicationBuilder {
    pub fn new(daemon_args: DaemonArgs) -> Self {
        Self { daemon_args }
    }

    /// Build complete application
    pub async fn build(self) -> Result<Application> {
        tracing::info!("Building application components...");

        let job_types = self.daemon_args.job_types.load()?;

        let kube_client = client::connect(self.daemon_args.kubeconfig.as_deref())
            .await
            .map_err(into_anyhow)?;
        let source: Arc<dyn PodEventSource> = Arc::new(KubePodSource::new(
            kube_client,
            &self.daemon_args.namespace,
        ));

        let registry = self.create_registry().await?;
        let (publisher, signal_receiver) = self.create_publisher()?;
        let pod_watchers = self.create_pod_watchers(&job_types, source, &registry, &publisher);

        let services = ApplicationServices {
            pod_watchers,
            signal_receiver,
        };

        Ok(Application::new(services, self.daemon_args))
    }

    async fn create_registry(&self) -> Result<Arc<dyn ContainerRegistry>> {
        match &self.daemon_args.redis_url {
            Some(redis_url) => {
                let registry = RedisContainerRegistry::connect(
                    redis_url,
                    &self.daemon_args.redis_key_prefix,
                )
                .await
                .map_err(into_anyhow)?;
                Ok(Arc::new(registry))
            }
            None => {
                tracing::warn!("No Redis URL configured, container registry is process-local");
                Ok(Arc::new(InMemoryContainerRegistry::new()))
            }
        }
    }

    fn create_publisher(&self) -> Result<(Arc<dyn SignalPublisher>, SignalReceiver)> {
        match &self.daemon_args.publish_endpoint {
            Some(endpoint) => {
                tracing::info!("Publishing job state signals to {endpoint}");
                let publisher = HttpPublisher::new(endpoint, self.daemon_args.publish_timeout())
                    .map_err(into_anyhow)?;
                Ok((Arc::new(publisher), None))
            }
            None => {
                tracing::info!("No publish endpoint configured, job state signals are logged");
                let (sender, receiver) = mpsc::channel(self.daemon_args.signal_buffer.max(1));
                Ok((Arc::new(ChannelPublisher::new(sender)), Some(receiver)))
            }
        }
    }

    fn create_pod_watchers(
        &self,
        job_types: &[JobType],
        source: Arc<dyn PodEventSource>,
        registry: &Arc<dyn ContainerRegistry>,
        publisher: &Arc<dyn SignalPublisher>,
    ) -> Vec<Arc<PodWatcher>> {
        job_types
            .iter()
            .map(|job_type| {
                tracing::info!(
                    job_type = %job_type.job_type,
                    main_container = %job_type.main_container,
                    selector = %job_type.effective_label_selector(),
                    "Configured job type"
                );
                Arc::new(
                    PodWatcher::new(
                        source.clone(),
                        job_type.clone(),
                        registry.clone(),
                        publisher.clone(),
                    )
                    .with_retry_delay(self.daemon_args.retry_delay()),
                )
            })
            .collect()
    }
}
