use crate::{FetchTask, HarvestReport, StdResult};

/// A trait for executing a batch of fetch tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TaskScheduler: Sync + Send {
    /// Executes every task exactly once and returns their outcomes.
    async fn schedule(&self, tasks: Vec<FetchTask>) -> StdResult<HarvestReport>;
}
