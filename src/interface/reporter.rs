use crate::{HarvestReport, StdResult};

/// A trait for persisting the report of a run.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReportWriter: Sync + Send {
    /// Writes the report.
    async fn write(&self, report: &HarvestReport) -> StdResult<()>;
}
