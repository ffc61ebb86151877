use std::sync::Arc;

use log::info;

use crate::{
    FetchTask, HarvestReport, ManifestCatalog, ReportWriter, RepositoryLister, StdResult,
    TaskScheduler,
};

/// Harvests the manifests of every non-archived repository of an organization.
pub struct Harvester {
    lister: Arc<dyn RepositoryLister>,
    scheduler: Arc<dyn TaskScheduler>,
    report_writer: Arc<dyn ReportWriter>,
}

impl Harvester {
    /// Creates a new `Harvester` instance.
    pub fn new(
        lister: Arc<dyn RepositoryLister>,
        scheduler: Arc<dyn TaskScheduler>,
        report_writer: Arc<dyn ReportWriter>,
    ) -> Self {
        Self {
            lister,
            scheduler,
            report_writer,
        }
    }

    /// Lists the repositories, fetches every catalog entry of each, and writes the report.
    ///
    /// Fails only when listing or report writing fails; per manifest failures are part of the report.
    pub async fn run(
        &self,
        organization: &str,
        catalog: &ManifestCatalog,
    ) -> StdResult<HarvestReport> {
        let repositories = self.lister.list(organization).await?;
        let tasks = FetchTask::cartesian(&repositories, catalog);
        info!(
            "Fetching {} manifest files from {} repositories",
            tasks.len(),
            repositories.len()
        );
        let report = self.scheduler.schedule(tasks).await?;
        self.report_writer.write(&report).await?;
        info!(
            "Harvest completed: downloaded={}, not_found={}, failed={}",
            report.successes().len(),
            report.not_found().len(),
            report.failures().len()
        );

        Ok(report)
    }
}
