use std::sync::Arc;

use log::{debug, warn};

use crate::{
    ContentFetcher, ContentStatus, FetchOutcome, FetchTask, ManifestPersister, SchedulerState,
    TaskObserver,
};

/// A worker draining the shared task queue of a scheduler run
pub struct SchedulerWorker {
    fetcher: Arc<dyn ContentFetcher>,
    persister: Arc<dyn ManifestPersister>,
    observer: Arc<dyn TaskObserver>,
    state: Arc<SchedulerState>,
}

impl SchedulerWorker {
    /// Creates a new `SchedulerWorker` instance.
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        persister: Arc<dyn ManifestPersister>,
        observer: Arc<dyn TaskObserver>,
        state: Arc<SchedulerState>,
    ) -> Self {
        Self {
            fetcher,
            persister,
            observer,
            state,
        }
    }

    /// Executes tasks until the queue is empty.
    pub async fn run(&self) {
        while let Some(task) = self.state.pop_task().await {
            debug!("Processing task: {task}");
            let outcome = self.execute(task).await;
            let progress = self.state.record_outcome(outcome.clone()).await;
            self.observer.on_task_complete(&outcome, progress);
        }
    }

    /// Executes one task. Failures never escape: they become the task's outcome.
    async fn execute(&self, task: FetchTask) -> FetchOutcome {
        let response = match self.fetcher.fetch(&task).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fetch of {task} failed: {e:#}");
                return FetchOutcome::Failure {
                    task,
                    status: None,
                    message: format!("{e:#}"),
                };
            }
        };

        match response.into_status() {
            ContentStatus::Found(content) => match self.persister.persist(&task, &content).await {
                Ok(destination) => FetchOutcome::Success {
                    task,
                    destination,
                    bytes_written: content.len(),
                },
                Err(e) => {
                    warn!("Persisting {task} failed: {e:#}");
                    FetchOutcome::Failure {
                        task,
                        status: None,
                        message: format!("{e:#}"),
                    }
                }
            },
            ContentStatus::NotFound => FetchOutcome::NotFound { task },
            ContentStatus::Failed { status, message } => {
                warn!("Fetch of {task} answered HTTP {status}: {message}");
                FetchOutcome::Failure {
                    task,
                    status: Some(status),
                    message,
                }
            }
        }
    }
}
