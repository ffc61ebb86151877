use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use tokio::fs;

use crate::{FetchOutcome, HarvestReport, ReportWriter, StdResult};

/// The report file listing downloaded manifests.
pub const SUCCESS_REPORT_FILE: &str = "success_list.txt";

/// The report file listing failed fetches.
pub const FAILURE_REPORT_FILE: &str = "failure_list.txt";

/// The report file listing manifests absent from their repository.
pub const NOT_FOUND_REPORT_FILE: &str = "non_existent_files.txt";

/// Writes one plain text file per outcome class, one line per outcome.
pub struct TextReportWriter {
    report_dir: PathBuf,
}

impl TextReportWriter {
    /// Creates a new `TextReportWriter` writing into the given directory.
    pub fn new(report_dir: &Path) -> Self {
        Self {
            report_dir: report_dir.to_path_buf(),
        }
    }

    fn render(outcomes: &[FetchOutcome]) -> String {
        outcomes
            .iter()
            .map(|outcome| format!("{}\n", outcome.report_line()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ReportWriter for TextReportWriter {
    async fn write(&self, report: &HarvestReport) -> StdResult<()> {
        for (file_name, outcomes) in [
            (SUCCESS_REPORT_FILE, report.successes()),
            (FAILURE_REPORT_FILE, report.failures()),
            (NOT_FOUND_REPORT_FILE, report.not_found()),
        ] {
            let path = self.report_dir.join(file_name);
            fs::write(&path, Self::render(outcomes))
                .await
                .with_context(|| format!("Failed to write report {}", path.display()))?;
        }
        info!("Reports written to {}", self.report_dir.display());

        Ok(())
    }
}
