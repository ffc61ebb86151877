use std::{
    collections::{HashSet, VecDeque},
    fmt::Display,
    ops::Deref,
};

use tokio::sync::Mutex;

use super::{FetchOutcome, HarvestReport};

/// The manifest files looked up in every repository when no catalog is configured.
pub const DEFAULT_MANIFEST_FILES: &[&str] = &[
    "requirements.txt",
    "Pipfile.lock",
    "pyproject.toml",
    "Gemfile.lock",
    "package-lock.json",
    "yarn.lock",
    "npm-shrinkwrap.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "go.mod",
    "Cargo.lock",
    "mix.lock",
    "Podfile.lock",
    "Cartfile.resolved",
];

/// The full name of a repository, e.g. `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(pub String);

impl Deref for RepositoryName {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository owned by the harvested organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    full_name: RepositoryName,
}

impl RepositoryRef {
    /// Creates a new `RepositoryRef` from its full name.
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: RepositoryName(full_name.to_string()),
        }
    }

    /// Retrieves the full name of the repository.
    pub fn full_name(&self) -> &RepositoryName {
        &self.full_name
    }
}

impl Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

/// A repository as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRepository {
    /// The listed repository.
    pub repository: RepositoryRef,

    /// Whether the repository is archived.
    pub archived: bool,
}

impl ListedRepository {
    /// Creates a new `ListedRepository` instance.
    pub fn new(full_name: &str, archived: bool) -> Self {
        Self {
            repository: RepositoryRef::new(full_name),
            archived,
        }
    }
}

/// The ordered set of manifest paths fetched from every repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCatalog(Vec<String>);

impl ManifestCatalog {
    /// Creates a catalog, dropping blank entries and duplicates while keeping the first occurrence.
    pub fn new<S: AsRef<str>>(files: &[S]) -> Self {
        let mut seen = HashSet::new();
        let files = files
            .iter()
            .map(|file| file.as_ref().trim())
            .filter(|file| !file.is_empty())
            .filter(|file| seen.insert(file.to_string()))
            .map(str::to_string)
            .collect();

        Self(files)
    }

    /// Retrieves the manifest paths.
    pub fn files(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of manifest paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the catalog has no entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ManifestCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILES)
    }
}

/// One manifest to fetch from one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTask {
    repository: RepositoryRef,
    relative_path: String,
}

impl FetchTask {
    /// Creates a new `FetchTask` instance.
    pub fn new(repository: RepositoryRef, relative_path: &str) -> Self {
        Self {
            repository,
            relative_path: relative_path.to_string(),
        }
    }

    /// Builds one task per repository and catalog entry, repository-major.
    pub fn cartesian(repositories: &[RepositoryRef], catalog: &ManifestCatalog) -> Vec<Self> {
        repositories
            .iter()
            .flat_map(|repository| {
                catalog
                    .files()
                    .iter()
                    .map(move |file| Self::new(repository.clone(), file))
            })
            .collect()
    }

    /// Retrieves the repository.
    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    /// Retrieves the path of the manifest inside the repository.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    #[cfg(test)]
    /// Creates a dummy `FetchTask` instance for testing purposes.
    pub fn dummy() -> Self {
        Self::new(RepositoryRef::new("acme/a"), "go.mod")
    }
}

impl Display for FetchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.repository, self.relative_path)
    }
}

/// How far a scheduler run has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    /// The number of tasks with a recorded outcome.
    pub completed: usize,

    /// The total number of tasks of the run.
    pub total: usize,
}

impl Display for TaskProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

/// The state shared by the workers of a scheduler run
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// Tasks not yet handed to a worker
    pending_tasks: Mutex<VecDeque<FetchTask>>,

    /// The total number of tasks of the run
    total_tasks: usize,

    /// Outcomes recorded so far, in completion order
    report: Mutex<HarvestReport>,
}

impl SchedulerState {
    /// Creates a new state holding the given tasks.
    pub fn new(tasks: Vec<FetchTask>) -> Self {
        Self {
            total_tasks: tasks.len(),
            pending_tasks: Mutex::new(tasks.into()),
            report: Mutex::new(HarvestReport::default()),
        }
    }

    /// Pops the next pending task.
    pub async fn pop_task(&self) -> Option<FetchTask> {
        let mut pending_tasks = self.pending_tasks.lock().await;

        pending_tasks.pop_front()
    }

    /// Records the outcome of a task and returns the progress of the run.
    pub async fn record_outcome(&self, outcome: FetchOutcome) -> TaskProgress {
        let mut report = self.report.lock().await;
        report.record(outcome);

        TaskProgress {
            completed: report.total(),
            total: self.total_tasks,
        }
    }

    /// Retrieves the total number of tasks.
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    /// Takes the report built so far, leaving an empty one.
    pub async fn take_report(&self) -> HarvestReport {
        let mut report = self.report.lock().await;

        std::mem::take(&mut *report)
    }
}
