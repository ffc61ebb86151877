use std::path::PathBuf;

use super::FetchTask;

/// The result of one fetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The manifest was downloaded and written to disk.
    Success {
        task: FetchTask,
        destination: PathBuf,
        bytes_written: usize,
    },

    /// The repository has no such manifest.
    NotFound { task: FetchTask },

    /// The manifest could not be retrieved or written.
    Failure {
        task: FetchTask,
        /// The HTTP status, if a response was received.
        status: Option<u16>,
        message: String,
    },
}

impl FetchOutcome {
    /// Retrieves the task this outcome belongs to.
    pub fn task(&self) -> &FetchTask {
        match self {
            FetchOutcome::Success { task, .. } => task,
            FetchOutcome::NotFound { task } => task,
            FetchOutcome::Failure { task, .. } => task,
        }
    }

    /// Renders the line written to the report file of this outcome's class.
    pub fn report_line(&self) -> String {
        match self {
            FetchOutcome::Success { destination, .. } => destination.display().to_string(),
            FetchOutcome::NotFound { task } => task.to_string(),
            FetchOutcome::Failure {
                task,
                status: Some(status),
                message,
            } => format!("{task} - HTTP {status}: {message}"),
            FetchOutcome::Failure {
                task,
                status: None,
                message,
            } => format!("{task} - {message}"),
        }
    }
}

/// Outcomes of a run, partitioned by class, each in completion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    successes: Vec<FetchOutcome>,
    not_found: Vec<FetchOutcome>,
    failures: Vec<FetchOutcome>,
}

impl HarvestReport {
    /// Appends an outcome to the list of its class.
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success { .. } => self.successes.push(outcome),
            FetchOutcome::NotFound { .. } => self.not_found.push(outcome),
            FetchOutcome::Failure { .. } => self.failures.push(outcome),
        }
    }

    pub fn successes(&self) -> &[FetchOutcome] {
        &self.successes
    }

    pub fn not_found(&self) -> &[FetchOutcome] {
        &self.not_found
    }

    pub fn failures(&self) -> &[FetchOutcome] {
        &self.failures
    }

    /// Returns the number of recorded outcomes.
    pub fn total(&self) -> usize {
        self.successes.len() + self.not_found.len() + self.failures.len()
    }
}
