use super::{ListedRepository, PageRequest, RateLimitSnapshot};

/// One page of an organization's repository listing.
#[derive(Debug, PartialEq, Eq)]
pub struct RepositoryPage {
    /// Repositories of the page, in server order
    pub(crate) repositories: Vec<ListedRepository>,

    /// The request for the following page, if any
    pub(crate) next: Option<PageRequest>,

    /// The API rate limit information
    pub(crate) rate_limit: Option<RateLimitSnapshot>,

    /// The URL the page was fetched from
    pub(crate) url: Option<String>,
}

impl RepositoryPage {
    /// Creates a new `RepositoryPage` instance.
    pub fn new(
        repositories: Vec<ListedRepository>,
        next: Option<PageRequest>,
        rate_limit: Option<RateLimitSnapshot>,
    ) -> Self {
        Self {
            repositories,
            next,
            rate_limit,
            url: None,
        }
    }

    /// Records the URL the page was fetched from.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());

        self
    }

    /// Retrieves the repositories of the page.
    pub fn repositories(&self) -> &[ListedRepository] {
        &self.repositories
    }

    /// Retrieves the request for the following page.
    pub fn next(&self) -> Option<&PageRequest> {
        self.next.as_ref()
    }

    /// Retrieves the API rate limit information.
    pub fn rate_limit(&self) -> Option<&RateLimitSnapshot> {
        self.rate_limit.as_ref()
    }

    /// Retrieves the URL the page was fetched from.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// What the contents endpoint answered for one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    /// The decoded file content.
    Found(Vec<u8>),

    /// The file does not exist.
    NotFound,

    /// Any other answer.
    Failed { status: u16, message: String },
}

/// A response of the contents endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResponse {
    /// The classified answer
    pub(crate) status: ContentStatus,

    /// The API rate limit information
    pub(crate) rate_limit: Option<RateLimitSnapshot>,
}

impl ContentResponse {
    /// Creates a new `ContentResponse` instance.
    pub fn new(status: ContentStatus, rate_limit: Option<RateLimitSnapshot>) -> Self {
        Self { status, rate_limit }
    }

    /// Retrieves the classified answer.
    pub fn status(&self) -> &ContentStatus {
        &self.status
    }

    /// Consumes the response and returns the classified answer.
    pub fn into_status(self) -> ContentStatus {
        self.status
    }

    /// Retrieves the API rate limit information.
    pub fn rate_limit(&self) -> Option<&RateLimitSnapshot> {
        self.rate_limit.as_ref()
    }
}
