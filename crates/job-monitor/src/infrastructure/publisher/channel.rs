use error_stack::Report;
use tokio::sync::mpsc;

use crate::domain::JobStateSignal;
use crate::domain::PublishError;
use crate::domain::SignalPublisher;

/// Hands signals to an in-process consumer over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<JobStateSignal>,
}

impl ChannelPublisher {
    pub fn new(sender: mpsc::Sender<JobStateSignal>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl SignalPublisher for ChannelPublisher {
    async fn publish(&self, signal: JobStateSignal) -> Result<(), Report<PublishError>> {
        let job_id = signal.job_id.clone();
        self.sender
            .send(signal)
            .await
            .map_err(|_| Report::new(PublishError::ConsumerClosed { job_id }))
    }
}

/// Drains a signal channel into the log until every sender is dropped or the
/// token is cancelled, and returns how many signals were logged.
///
/// On cancellation the channel is closed and every signal already accepted by
/// a publisher is still logged before returning.
pub async fn log_signals(
    mut receiver: mpsc::Receiver<JobStateSignal>,
    cancellation_token: tokio_util::sync::CancellationToken,
) -> usize {
    let mut logged = 0;
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            signal = receiver.recv() => {
                let Some(signal) = signal else { return logged };
                log_signal(&signal);
                logged += 1;
            }
        }
    }

    receiver.close();
    while let Some(signal) = receiver.recv().await {
        log_signal(&signal);
        logged += 1;
    }
    logged
}

fn log_signal(signal: &JobStateSignal) {
    match serde_json::to_string(signal) {
        Ok(payload) => tracing::info!(
            job_id = %signal.job_id,
            status = %signal.status,
            payload = %payload,
            "Job state signal"
        ),
        Err(e) => tracing::warn!(
            job_id = %signal.job_id,
            "Failed to encode job state signal: {e}"
        ),
    }
}
