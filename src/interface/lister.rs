use crate::{RepositoryRef, StdResult};

/// A trait for enumerating the repositories of an organization.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryLister: Sync + Send {
    /// Lists the non-archived repositories of the organization, in listing order.
    async fn list(&self, organization: &str) -> StdResult<Vec<RepositoryRef>>;
}
