use log::info;

use crate::{FetchOutcome, TaskObserver, TaskProgress};

/// Logs the progress of a run as tasks complete.
#[derive(Debug, Default)]
pub struct LogProgressObserver;

impl LogProgressObserver {
    /// Creates a new `LogProgressObserver` instance.
    pub fn new() -> Self {
        Self
    }

    /// Renders the progress line of an outcome.
    pub fn progress_line(outcome: &FetchOutcome, progress: TaskProgress) -> String {
        let class = match outcome {
            FetchOutcome::Success { .. } => "downloaded",
            FetchOutcome::NotFound { .. } => "not found",
            FetchOutcome::Failure { .. } => "failed",
        };

        format!("[{progress}] {} {class}", outcome.task())
    }
}

impl TaskObserver for LogProgressObserver {
    fn on_task_complete(&self, outcome: &FetchOutcome, progress: TaskProgress) {
        info!("{}", Self::progress_line(outcome, progress));
    }
}

#[cfg(test)]
mod tests {
    use crate::FetchTask;

    use super::*;

    #[test]
    fn progress_line_shows_counts_task_and_class() {
        let line = LogProgressObserver::progress_line(
            &FetchOutcome::NotFound {
                task: FetchTask::dummy(),
            },
            TaskProgress {
                completed: 3,
                total: 32,
            },
        );

        assert_eq!("[3/32] acme/a/go.mod not found", line);
    }
}
