use std::sync::Arc;

use anyhow::anyhow;
use reqwest::{StatusCode, header::LINK};
use serde::Deserialize;

use crate::{
    GitHubClient, HarvestError, ListedRepository, PageRequest, RepositoryPage,
    RepositoryPageFetcher, StdResult, error_message, parse_next_link, rate_limit_from_headers,
};

#[derive(Deserialize, Debug)]
struct RepositoryEntry {
    full_name: String,
    #[serde(default)]
    archived: bool,
}

impl From<RepositoryEntry> for ListedRepository {
    fn from(entry: RepositoryEntry) -> Self {
        ListedRepository::new(&entry.full_name, entry.archived)
    }
}

/// Fetches pages of an organization's repository listing from the REST API.
pub struct GitHubPageFetcher {
    client: Arc<GitHubClient>,
}

impl GitHubPageFetcher {
    /// Creates a new `GitHubPageFetcher` instance with the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    fn page_url(&self, request: &PageRequest) -> String {
        match &request.url {
            Some(url) => url.to_owned(),
            None => self.client.url(&format!(
                "orgs/{}/repos?per_page={}",
                request.organization(),
                request.per_page
            )),
        }
    }
}

#[async_trait::async_trait]
impl RepositoryPageFetcher for GitHubPageFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> StdResult<RepositoryPage> {
        let url = self.page_url(request);
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| anyhow!(HarvestError::Transport(format!("GET {url}: {e}"))))?;
        let status = response.status();
        let rate_limit = rate_limit_from_headers(response.headers());
        let next = response
            .headers()
            .get(LINK)
            .and_then(|link| link.to_str().ok())
            .and_then(parse_next_link)
            .map(|next_url| request.next(&next_url));

        match status {
            StatusCode::OK => {
                let entries: Vec<RepositoryEntry> = response.json().await.map_err(|e| {
                    anyhow!(HarvestError::Transport(format!(
                        "Invalid repository listing at {url}: {e}"
                    )))
                })?;

                Ok(RepositoryPage::new(
                    entries.into_iter().map(Into::into).collect(),
                    next,
                    rate_limit,
                )
                .with_url(&url))
            }
            StatusCode::FORBIDDEN
                if rate_limit
                    .as_ref()
                    .is_some_and(|rate_limit| rate_limit.is_exceeded()) =>
            {
                Err(anyhow!(HarvestError::Transport(format!(
                    "Rate limit exceeded while listing repositories of {}",
                    request.organization()
                ))))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(anyhow!(HarvestError::Auth {
                status: status.as_u16(),
                message: error_message(response).await,
            })),
            StatusCode::NOT_FOUND => Err(anyhow!(HarvestError::OrganizationNotFound(
                request.organization().to_owned()
            ))),
            _ => Err(anyhow!(HarvestError::Transport(format!(
                "HTTP {} while listing repositories of {}: {}",
                status.as_u16(),
                request.organization(),
                error_message(response).await
            )))),
        }
    }
}
