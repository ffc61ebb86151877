use crate::{ContentResponse, FetchTask, PageRequest, RepositoryPage, StdResult};

/// A trait for fetching one page of an organization's repository listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryPageFetcher: Sync + Send {
    /// Fetches the requested page from the API.
    async fn fetch_page(&self, request: &PageRequest) -> StdResult<RepositoryPage>;
}

/// A trait for fetching the content of a manifest file from the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentFetcher: Sync + Send {
    /// Fetches the manifest designated by the task.
    ///
    /// An error means no usable answer was received; HTTP level failures are reported in the response.
    async fn fetch(&self, task: &FetchTask) -> StdResult<ContentResponse>;
}
