use std::{collections::HashSet, sync::Arc};

use anyhow::anyhow;
use log::{debug, info};

use crate::{
    HarvestError, PageRequest, RepositoryLister, RepositoryPageFetcher, RepositoryRef, StdResult,
};

/// The default number of repositories requested per page.
pub const DEFAULT_PER_PAGE: u16 = 100;

/// Lists an organization's repositories by following the listing pages.
///
/// Any failing page aborts the listing: repositories gathered from earlier pages are discarded.
/// A repository listed on more than one page is kept once.
pub struct PaginatedLister {
    fetcher: Arc<dyn RepositoryPageFetcher>,
    per_page: u16,
}

impl PaginatedLister {
    /// Creates a new `PaginatedLister` instance with the given page fetcher.
    pub fn new(fetcher: Arc<dyn RepositoryPageFetcher>, per_page: u16) -> Self {
        Self { fetcher, per_page }
    }
}

#[async_trait::async_trait]
impl RepositoryLister for PaginatedLister {
    async fn list(&self, organization: &str) -> StdResult<Vec<RepositoryRef>> {
        let mut repositories = Vec::new();
        let mut listed_names = HashSet::new();
        let mut visited_urls = HashSet::new();
        let mut total_archived = 0;
        let mut next_request = Some(PageRequest::first(organization, self.per_page));
        while let Some(request) = next_request.take() {
            debug!("Processing request: {request}");
            let page = self.fetcher.fetch_page(&request).await?;
            if let Some(url) = page.url.clone().or_else(|| request.url.clone()) {
                visited_urls.insert(url);
            }
            for listed in page.repositories {
                if listed.archived {
                    debug!("Skipping archived repository {}", listed.repository);
                    total_archived += 1;
                } else if !listed_names.insert(listed.repository.full_name().to_string()) {
                    debug!("Skipping repository {} listed twice", listed.repository);
                } else {
                    repositories.push(listed.repository);
                }
            }
            if let Some(next) = page.next {
                let next_url = next.url.clone().unwrap_or_default();
                if visited_urls.contains(&next_url) {
                    return Err(anyhow!(HarvestError::Transport(format!(
                        "Pagination loop detected at {next_url}"
                    ))));
                }
                next_request = Some(next);
            }
        }
        info!(
            "Listed {} repositories of {organization} ({total_archived} archived skipped)",
            repositories.len()
        );

        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use crate::{ListedRepository, MockRepositoryPageFetcher, RepositoryPage};

    use super::*;

    fn page_request(page: u32) -> PageRequest {
        let first = PageRequest::first("acme", 100);
        match page {
            1 => first,
            page => first.next(&format!("https://api.test/organizations/1/repos?page={page}")),
        }
    }

    #[tokio::test]
    async fn list_follows_next_pages_in_order() {
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(1)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![
                            ListedRepository::new("acme/a", false),
                            ListedRepository::new("acme/b", true),
                        ],
                        Some(page_request(2)),
                        None,
                    ))
                })
                .times(1);
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(2)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![ListedRepository::new("acme/c", false)],
                        Some(page_request(3)),
                        None,
                    ))
                })
                .times(1);
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(3)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![
                            ListedRepository::new("acme/d", true),
                            ListedRepository::new("acme/e", false),
                        ],
                        None,
                        None,
                    ))
                })
                .times(1);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        let repositories = lister.list("acme").await.unwrap();

        assert_eq!(
            vec![
                RepositoryRef::new("acme/a"),
                RepositoryRef::new("acme/c"),
                RepositoryRef::new("acme/e"),
            ],
            repositories
        );
    }

    #[tokio::test]
    async fn list_with_only_archived_repositories_is_empty() {
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![ListedRepository::new("acme/old", true)],
                        None,
                        None,
                    ))
                })
                .times(1);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        let repositories = lister.list("acme").await.unwrap();

        assert!(repositories.is_empty());
    }

    #[tokio::test]
    async fn list_aborts_when_a_page_fails() {
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(1)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![ListedRepository::new("acme/a", false)],
                        Some(page_request(2)),
                        None,
                    ))
                })
                .times(1);
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(2)))
                .returning(|_| {
                    Err(anyhow!(HarvestError::Transport(
                        "HTTP 500 while listing repositories of acme".to_string()
                    )))
                })
                .times(1);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        let error = lister
            .list("acme")
            .await
            .expect_err("Listing should fail if a page fails");

        assert!(matches!(
            error.downcast_ref::<HarvestError>(),
            Some(HarvestError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn list_rejects_pagination_loop() {
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![ListedRepository::new("acme/a", false)],
                        Some(page_request(2)),
                        None,
                    ))
                })
                .times(2);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        lister
            .list("acme")
            .await
            .expect_err("Listing should fail on a pagination loop");
    }

    #[tokio::test]
    async fn list_rejects_next_link_back_to_first_page() {
        let first_url = "https://api.test/orgs/acme/repos?per_page=100";
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(1)))
                .returning(move |_| {
                    Ok(RepositoryPage::new(
                        vec![ListedRepository::new("acme/a", false)],
                        Some(page_request(1).next(first_url)),
                        None,
                    )
                    .with_url(first_url))
                })
                .times(1);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        let error = lister
            .list("acme")
            .await
            .expect_err("Listing should fail when the next page is the first page");

        assert!(matches!(
            error.downcast_ref::<HarvestError>(),
            Some(HarvestError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn list_skips_repositories_repeated_across_pages() {
        let fetcher = {
            let mut fetcher = MockRepositoryPageFetcher::new();
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(1)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![
                            ListedRepository::new("acme/a", false),
                            ListedRepository::new("acme/b", false),
                        ],
                        Some(page_request(2)),
                        None,
                    ))
                })
                .times(1);
            fetcher
                .expect_fetch_page()
                .with(eq(page_request(2)))
                .returning(|_| {
                    Ok(RepositoryPage::new(
                        vec![
                            ListedRepository::new("acme/b", false),
                            ListedRepository::new("acme/c", false),
                        ],
                        None,
                        None,
                    ))
                })
                .times(1);

            fetcher
        };
        let lister = PaginatedLister::new(Arc::new(fetcher), 100);

        let repositories = lister.list("acme").await.unwrap();

        assert_eq!(
            vec![
                RepositoryRef::new("acme/a"),
                RepositoryRef::new("acme/b"),
                RepositoryRef::new("acme/c"),
            ],
            repositories
        );
    }
}
