use async_trait::async_trait;
use ntex::rt::Arbiter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[async_trait]
pub trait BackgroundTask: Send + Sync {
    fn id(&self) -> &str;
    async fn run(&self, token: CancellationToken);
}

/// Runs long-lived tasks (e.g. the collector flush loop) on a dedicated
/// arbiter, all tied to one cancellation token for shutdown.
pub struct BackgroundTasksManager {
    cancellation_token: CancellationToken,
    arbiter: Arbiter,
}

impl Default for BackgroundTasksManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundTasksManager {
    pub fn new() -> Self {
        Self {
            cancellation_token: CancellationToken::new(),
            arbiter: Arbiter::new(),
        }
    }

    pub fn register_task<T>(&mut self, task: Arc<T>)
    where
        T: BackgroundTask + 'static,
    {
        info!("registering background task: {}", task.id());
        let token = self.cancellation_token.clone();

        self.arbiter.handle().spawn(async move {
            task.run(token).await;
        });
    }

    pub fn shutdown(self) {
        info!("shutdown triggered, stopping all background tasks...");

        self.cancellation_token.cancel();
        self.arbiter.stop();
    }
}
