use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::agent::buffer::{Buffer, PushOutcome};
use crate::agent::builder::CollectorAgentBuilder;
use crate::report::{ErrorReport, ReportBatch};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("missing access token")]
    MissingToken,
    #[error("unable to instantiate the http client for report sending: {0}")]
    HttpClientCreationError(reqwest::Error),
}

/// Buffered, fire-and-forget client for the error collector.
///
/// Reports are queued in memory and shipped in batches, either when the
/// buffer overflows or on the periodic flush interval. Transport failures
/// are logged and swallowed; nothing in here ever propagates an error
/// back into a request path.
pub struct CollectorAgent {
    pub(crate) endpoint: String,
    pub(crate) token: String,
    pub(crate) buffer: Buffer<ErrorReport>,
    pub(crate) client: reqwest::Client,
    pub(crate) flush_interval: Duration,
}

impl CollectorAgent {
    pub fn builder() -> CollectorAgentBuilder {
        CollectorAgentBuilder::default()
    }

    /// Queue a report. Triggers an immediate send when the buffer is full.
    pub async fn enqueue(&self, report: ErrorReport) {
        match self.buffer.push(report).await {
            PushOutcome::Buffered => {}
            PushOutcome::Overflowed { backlog } => self.send(backlog).await,
        }
    }

    /// Drain the buffer and ship whatever is pending.
    pub async fn flush(&self) {
        let batch = self.buffer.drain().await;
        self.send(batch).await;
    }

    /// Flush on `flush_interval` until the token fires, then flush one
    /// last time so shutdown does not drop queued reports.
    pub async fn run_flush_loop(&self, token: CancellationToken) {
        let mut interval = tokio::time::interval(self.flush_interval);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    self.flush().await;
                    break;
                }
                _ = interval.tick() => {
                    self.flush().await;
                }
            }
        }
    }

    async fn send(&self, reports: Vec<ErrorReport>) {
        if reports.is_empty() {
            return;
        }

        let count = reports.len();
        let batch = ReportBatch { reports };
        let result = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&batch)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("shipped {} error report(s) to the collector", count);
            }
            Ok(response) => {
                warn!(
                    "collector rejected a batch of {} report(s): {}",
                    count,
                    response.status()
                );
            }
            Err(e) => {
                warn!("unable to reach the collector, dropping {} report(s): {}", count, e);
            }
        }
    }
}
