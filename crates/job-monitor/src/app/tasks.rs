use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::services::ApplicationServices;
use crate::domain::JobStateSignal;
use crate::infrastructure::publisher::channel::log_signals;

/// How long running tasks get to finish after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Task manager, responsible for starting and managing all background tasks
pub struct Tasks {
    pub tasks: Vec<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Tasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Start one watcher task per job type, plus the signal log drain when
    /// signals stay in-process.
    pub fn spawn_all_tasks(
        &mut self,
        services: &ApplicationServices,
        signal_receiver: Option<mpsc::Receiver<JobStateSignal>>,
    ) {
        for pod_watcher in &services.pod_watchers {
            let pod_watcher = pod_watcher.clone();
            let token = self.cancellation_token.clone();
            self.tasks.push(tokio::spawn(async move {
                let job_type = pod_watcher.job_type().job_type.clone();
                tracing::info!(%job_type, "Starting pod watcher task");
                let stats = pod_watcher.run(token).await;
                tracing::info!(
                    %job_type,
                    published = stats.published,
                    "Pod watcher task completed"
                );
            }));
        }

        if let Some(receiver) = signal_receiver {
            self.tasks.push(self.spawn_signal_log_task(receiver));
        }
    }

    fn spawn_signal_log_task(&self, receiver: mpsc::Receiver<JobStateSignal>) -> JoinHandle<()> {
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tracing::info!("Starting signal log task");
            let logged = log_signals(receiver, token).await;
            tracing::info!(logged, "Signal log task completed");
        })
    }

    /// wait for tasks to complete or receive shutdown signal
    pub async fn wait_for_completion(&mut self) -> Result<()> {
        if self.tasks.is_empty() {
            tracing::warn!("No tasks to run");
            return Ok(());
        }

        let signal_handler = {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                let mut sigint = signal(SignalKind::interrupt())?;

                tokio::spawn(async move {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown");
                        }
                        _ = sigint.recv() => {
                            tracing::info!("Received SIGINT, initiating graceful shutdown");
                        }
                    }
                })
            }
            #[cfg(not(unix))]
            {
                tokio::spawn(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl+C: {e}");
                        return;
                    }
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                })
            }
        };

        tokio::select! {
            _ = signal_handler => {
                tracing::info!("Shutdown signal received, cancelling all tasks");
                self.shutdown(SHUTDOWN_TIMEOUT).await;
            }
            result = futures::future::select_all(&mut self.tasks) => {
                let (result, index, remaining) = result;
                drop(remaining);
                // a finished JoinHandle must not be polled again
                self.tasks.remove(index);
                if let Err(e) = result {
                    tracing::error!("Task completed with error: {e}");
                    self.shutdown(SHUTDOWN_TIMEOUT).await;
                    return Err(e.into());
                }
                tracing::warn!("Task completed unexpectedly, shutting down");
                self.shutdown(SHUTDOWN_TIMEOUT).await;
            }
        }

        Ok(())
    }

    /// Cancel every task and wait for them, giving up after `timeout`.
    pub async fn shutdown(&mut self, timeout: Duration) {
        self.cancellation_token.cancel();
        tokio::time::timeout(timeout, async {
            for task in &mut self.tasks {
                if let Err(e) = task.await {
                    tracing::error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Task shutdown timed out after {:?}", timeout);
        });
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test(tokio::test)]
    async fn shutdown_cancels_running_tasks() {
        let mut tasks = Tasks::new();
        let token = tasks.cancellation_token();
        tasks.tasks.push(tokio::spawn(async move {
            token.cancelled().await;
        }));

        tokio::time::timeout(Duration::from_secs(5), tasks.shutdown(Duration::from_secs(1)))
            .await
            .expect("shutdown should finish");

        assert!(tasks.cancellation_token().is_cancelled());
        assert!(tasks.tasks.iter().all(|task| task.is_finished()));
    }

    #[test(tokio::test)]
    async fn finished_task_triggers_shutdown() {
        let mut tasks = Tasks::new();
        let token = tasks.cancellation_token();
        tasks.tasks.push(tokio::spawn(async {}));
        tasks.tasks.push(tokio::spawn(async move {
            token.cancelled().await;
        }));

        tokio::time::timeout(Duration::from_secs(5), tasks.wait_for_completion())
            .await
            .expect("should not hang")
            .expect("unexpected completion is not an error");

        assert!(tasks.cancellation_token().is_cancelled());
    }
}
