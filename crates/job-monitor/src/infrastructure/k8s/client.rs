use std::path::Path;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;
use tracing::info;

use crate::infrastructure::k8s::KubernetesError;

fn connection_failed(message: String) -> KubernetesError {
    KubernetesError::ConnectionFailed { message }
}

async fn config_from_file(path: &Path) -> Result<Config, Report<KubernetesError>> {
    let kubeconfig = Kubeconfig::read_from(path).change_context_lazy(|| {
        connection_failed(format!("Failed to read kubeconfig file: {}", path.display()))
    })?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .change_context_lazy(|| {
            connection_failed(format!(
                "Failed to create config from kubeconfig: {}",
                path.display()
            ))
        })
}

/// Connects with an explicit kubeconfig, or infers the configuration
/// (in-cluster service account, then `~/.kube/config`) when none is given.
pub async fn connect(kubeconfig: Option<&Path>) -> Result<Client, Report<KubernetesError>> {
    let config = match kubeconfig {
        Some(path) => config_from_file(path).await?,
        None => Config::infer()
            .await
            .change_context_lazy(|| {
                connection_failed("Failed to infer cluster config".to_string())
            })?,
    };

    info!(cluster_url = %config.cluster_url, "Connecting to Kubernetes API");
    Client::try_from(config)
        .change_context_lazy(|| connection_failed("Failed to create Kubernetes client".to_string()))
}
