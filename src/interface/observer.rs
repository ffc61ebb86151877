use crate::{FetchOutcome, TaskProgress};

/// A hook notified each time a task completes.
#[cfg_attr(test, mockall::automock)]
pub trait TaskObserver: Sync + Send {
    /// Called once per task, right after its outcome is recorded.
    fn on_task_complete(&self, outcome: &FetchOutcome, progress: TaskProgress);
}
