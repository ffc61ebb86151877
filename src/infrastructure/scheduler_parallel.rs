use std::sync::Arc;

use anyhow::anyhow;
use log::info;

use crate::{
    ContentFetcher, FetchTask, HarvestError, HarvestReport, ManifestPersister, SchedulerState,
    SchedulerWorker, StdResult, TaskObserver, TaskScheduler,
};

/// The default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 4;

/// A scheduler running fetch tasks on a bounded pool of workers.
pub struct ParallelScheduler {
    fetcher: Arc<dyn ContentFetcher>,
    persister: Arc<dyn ManifestPersister>,
    observer: Arc<dyn TaskObserver>,

    /// The number of workers
    total_workers: usize,
}

impl ParallelScheduler {
    /// Creates a new `ParallelScheduler` instance.
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        persister: Arc<dyn ManifestPersister>,
        observer: Arc<dyn TaskObserver>,
        total_workers: usize,
    ) -> Self {
        Self {
            fetcher,
            persister,
            observer,
            total_workers,
        }
    }
}

#[async_trait::async_trait]
impl TaskScheduler for ParallelScheduler {
    async fn schedule(&self, tasks: Vec<FetchTask>) -> StdResult<HarvestReport> {
        if self.total_workers == 0 {
            return Err(anyhow!(HarvestError::Config(
                "At least one worker is required".to_string()
            )));
        }

        let state = Arc::new(SchedulerState::new(tasks));
        let total_workers = self.total_workers.min(state.total_tasks().max(1));
        info!(
            "Scheduling {} tasks on {total_workers} workers",
            state.total_tasks()
        );
        let mut handles = Vec::new();
        for _ in 0..total_workers {
            let worker = SchedulerWorker::new(
                self.fetcher.clone(),
                self.persister.clone(),
                self.observer.clone(),
                state.clone(),
            );
            handles.push(tokio::spawn(async move { worker.run().await }));
        }

        for handle in handles {
            handle.await?;
        }

        Ok(state.take_report().await)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use crate::{
        ContentResponse, ContentStatus, FetchOutcome, ManifestCatalog, MockContentFetcher,
        MockManifestPersister, MockTaskObserver, RepositoryRef,
    };

    use super::*;

    fn tasks(total_repositories: usize, catalog: &ManifestCatalog) -> Vec<FetchTask> {
        let repositories = (0..total_repositories)
            .map(|i| RepositoryRef::new(&format!("acme/repository-{i}")))
            .collect::<Vec<_>>();

        FetchTask::cartesian(&repositories, catalog)
    }

    fn silent_observer() -> MockTaskObserver {
        let mut observer = MockTaskObserver::new();
        observer.expect_on_task_complete().return_const(());

        observer
    }

    #[tokio::test]
    async fn schedule_without_workers_fails() {
        let scheduler = ParallelScheduler::new(
            Arc::new(MockContentFetcher::new()),
            Arc::new(MockManifestPersister::new()),
            Arc::new(silent_observer()),
            0,
        );

        let error = scheduler
            .schedule(vec![FetchTask::dummy()])
            .await
            .expect_err("Scheduler should fail without workers");

        assert!(matches!(
            error.downcast_ref::<HarvestError>(),
            Some(HarvestError::Config(_))
        ));
    }

    #[tokio::test]
    async fn schedule_without_tasks_returns_empty_report() {
        let scheduler = ParallelScheduler::new(
            Arc::new(MockContentFetcher::new()),
            Arc::new(MockManifestPersister::new()),
            Arc::new(silent_observer()),
            DEFAULT_WORKERS,
        );

        let report = scheduler.schedule(vec![]).await.unwrap();

        assert_eq!(HarvestReport::default(), report);
    }

    #[tokio::test]
    async fn schedule_records_exactly_one_outcome_per_task() {
        let catalog = ManifestCatalog::new(&["go.mod", "Cargo.lock", "pom.xml"]);
        let tasks = tasks(7, &catalog);
        let total_tasks = tasks.len();
        let fetcher = {
            let mut fetcher = MockContentFetcher::new();
            fetcher
                .expect_fetch()
                .returning(|task| {
                    let status = match task.relative_path() {
                        "go.mod" => ContentStatus::Found(b"go 1.22".to_vec()),
                        "Cargo.lock" => ContentStatus::NotFound,
                        _ => ContentStatus::Failed {
                            status: 500,
                            message: "Server Error".to_string(),
                        },
                    };
                    Ok(ContentResponse::new(status, None))
                })
                .times(total_tasks);

            fetcher
        };
        let persister = {
            let mut persister = MockManifestPersister::new();
            persister
                .expect_persist()
                .returning(|task, _| Ok(PathBuf::from(task.to_string())))
                .times(7);

            persister
        };
        let completed = Arc::new(AtomicUsize::new(0));
        let observer = {
            let completed = completed.clone();
            let mut observer = MockTaskObserver::new();
            observer
                .expect_on_task_complete()
                .returning(move |_, progress| {
                    assert_eq!(21, progress.total);
                    completed.fetch_add(1, Ordering::SeqCst);
                })
                .times(total_tasks);

            observer
        };
        let scheduler = ParallelScheduler::new(
            Arc::new(fetcher),
            Arc::new(persister),
            Arc::new(observer),
            DEFAULT_WORKERS,
        );

        let report = scheduler.schedule(tasks.clone()).await.unwrap();

        assert_eq!(21, report.total());
        assert_eq!(7, report.successes().len());
        assert_eq!(7, report.not_found().len());
        assert_eq!(7, report.failures().len());
        assert_eq!(21, completed.load(Ordering::SeqCst));
        let recorded_tasks = [report.successes(), report.not_found(), report.failures()]
            .concat()
            .iter()
            .map(|outcome| outcome.task().clone())
            .collect::<HashSet<_>>();
        assert_eq!(tasks.into_iter().collect::<HashSet<_>>(), recorded_tasks);
        assert!(
            report
                .not_found()
                .iter()
                .all(|outcome| matches!(outcome, FetchOutcome::NotFound { .. }))
        );
    }
}
