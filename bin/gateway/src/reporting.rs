use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use faultline_collector_sdk::agent::collector_agent::{AgentError, CollectorAgent};
use faultline_collector_sdk::report::ErrorReport;
use faultline_config::reporting::ReportingConfig;
use tokio_util::sync::CancellationToken;

use crate::background_tasks::{BackgroundTask, BackgroundTasksManager};
use crate::consts::GATEWAY_VERSION;
use crate::pipeline::classify::error_category;
use crate::pipeline::context::RequestContext;

/// Destination for reportable error records. Implementations must swallow
/// their own failures; nothing may propagate back into the request path.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn report(&self, report: ErrorReport);
}

/// Holds the sink for the lifetime of the process. Installed once during
/// startup; `reset` exists so tests can tear the sink down between cases.
pub struct ReportingRuntime {
    sink: ArcSwapOption<Box<dyn ReportSink>>,
}

impl ReportingRuntime {
    pub fn disabled() -> Self {
        Self {
            sink: ArcSwapOption::empty(),
        }
    }

    pub fn install(&self, sink: Box<dyn ReportSink>) {
        self.sink.store(Some(Arc::new(sink)));
    }

    pub fn reset(&self) {
        self.sink.store(None);
    }

    pub fn active(&self) -> Option<Arc<Box<dyn ReportSink>>> {
        self.sink.load_full()
    }
}

pub struct CollectorSink {
    agent: Arc<CollectorAgent>,
}

impl CollectorSink {
    pub fn new(agent: Arc<CollectorAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl ReportSink for CollectorSink {
    async fn report(&self, report: ErrorReport) {
        self.agent.enqueue(report).await;
    }
}

#[async_trait]
impl BackgroundTask for CollectorAgent {
    fn id(&self) -> &str {
        "collector-agent-flush"
    }

    async fn run(&self, token: CancellationToken) {
        self.run_flush_loop(token).await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportingSetupError {
    #[error("Access token is missing. Please provide it under 'reporting.access_token' in the configuration.")]
    MissingAccessToken,
    #[error("Failed to initialize collector agent: {0}")]
    AgentCreationError(#[from] AgentError),
}

pub fn init_collector_agent(
    bg_tasks_manager: &mut BackgroundTasksManager,
    reporting_config: &ReportingConfig,
) -> Result<Arc<CollectorAgent>, ReportingSetupError> {
    let access_token = reporting_config
        .access_token
        .as_deref()
        .ok_or(ReportingSetupError::MissingAccessToken)?;

    let agent = CollectorAgent::builder()
        .user_agent(format!("faultline-gateway/{}", GATEWAY_VERSION))
        .endpoint(reporting_config.endpoint.clone())
        .token(access_token.to_string())
        .buffer_size(reporting_config.buffer_size)
        .connect_timeout(reporting_config.connect_timeout)
        .request_timeout(reporting_config.request_timeout)
        .accept_invalid_certs(reporting_config.accept_invalid_certs)
        .flush_interval(reporting_config.flush_interval)
        .build()?;

    let agent = Arc::new(agent);
    bg_tasks_manager.register_task(agent.clone());
    Ok(agent)
}

/// Capture a failure as an immutable record, ready for the sink.
pub fn build_report(
    error: &anyhow::Error,
    ctx: &RequestContext,
    environment: Option<String>,
) -> ErrorReport {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    ErrorReport {
        category: error_category(error).to_string(),
        message: error.to_string(),
        causes: error.chain().skip(1).map(|cause| cause.to_string()).collect(),
        operation_name: ctx.operation_name().map(str::to_owned),
        method: ctx.method().as_str().to_string(),
        environment,
        timestamp,
    }
}
