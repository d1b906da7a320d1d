use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::job_types::JobTypeArgs;
use crate::infrastructure::registry::redis::DEFAULT_KEY_PREFIX;

#[derive(Parser, Clone, Debug)]
pub struct DaemonArgs {
    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to a kubeconfig file; the in-cluster config is used when omitted"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "JOB_MONITOR_NAMESPACE",
        default_value = "default",
        help = "Kubernetes namespace whose pods are watched"
    )]
    pub namespace: String,

    #[command(flatten)]
    pub job_types: JobTypeArgs,

    #[arg(
        long,
        env = "JOB_MONITOR_REDIS_URL",
        help = "Redis URL for the container registry, e.g. redis://redis:6379; \
                an in-memory registry is used when omitted"
    )]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = "JOB_MONITOR_REDIS_KEY_PREFIX",
        default_value = DEFAULT_KEY_PREFIX,
        help = "Prefix for every registry key written to Redis"
    )]
    pub redis_key_prefix: String,

    #[arg(
        long,
        env = "JOB_MONITOR_PUBLISH_ENDPOINT",
        help = "HTTP endpoint job state signals are POSTed to; signals are logged when omitted"
    )]
    pub publish_endpoint: Option<String>,

    #[arg(
        long,
        env = "JOB_MONITOR_PUBLISH_TIMEOUT_SECS",
        default_value = "10",
        help = "Timeout in seconds for one signal delivery"
    )]
    pub publish_timeout_secs: u64,

    #[arg(
        long,
        default_value = "256",
        help = "Capacity of the in-process signal channel used when no endpoint is set"
    )]
    pub signal_buffer: usize,

    #[arg(
        long,
        env = "JOB_MONITOR_RETRY_DELAY_SECS",
        default_value = "5",
        help = "Seconds to wait before re-subscribing after a failed pod watch"
    )]
    pub retry_delay_secs: u64,

    #[arg(
        long,
        env = "JOB_MONITOR_LOG_FILE",
        value_hint = clap::ValueHint::FilePath,
        help = "Also write logs to this daily rolling file, e.g. /logs/job-monitor.log"
    )]
    pub log_file: Option<PathBuf>,
}

impl DaemonArgs {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
