use std::sync::Arc;

use log::debug;

use crate::{
    ContentFetcher, ContentResponse, FetchTask, PageRequest, RateLimiter, RepositoryPage,
    RepositoryPageFetcher, StdResult,
};

/// This struct is responsible for enforcing rate limits on content requests.
pub struct ContentFetcherRateLimitEnforcer {
    /// The fetcher to be rate limited.
    fetcher: Arc<dyn ContentFetcher>,

    /// The limiter shared by every fetcher of the process.
    rate_limiter: Arc<RateLimiter>,
}

impl ContentFetcherRateLimitEnforcer {
    /// Creates a new `ContentFetcherRateLimitEnforcer` instance with the given fetcher.
    pub fn new(fetcher: Arc<dyn ContentFetcher>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            fetcher,
            rate_limiter,
        }
    }
}

#[async_trait::async_trait]
impl ContentFetcher for ContentFetcherRateLimitEnforcer {
    /// Waits for quota before fetching, then refreshes the quota from the response.
    async fn fetch(&self, task: &FetchTask) -> StdResult<ContentResponse> {
        self.rate_limiter.acquire().await;
        let response = self.fetcher.fetch(task).await?;
        if let Some(rate_limit) = response.rate_limit() {
            debug!("{task}: {rate_limit}");
            self.rate_limiter.update(rate_limit).await;
        }

        Ok(response)
    }
}

/// This struct is responsible for enforcing rate limits on listing requests.
pub struct PageFetcherRateLimitEnforcer {
    /// The fetcher to be rate limited.
    fetcher: Arc<dyn RepositoryPageFetcher>,

    /// The limiter shared by every fetcher of the process.
    rate_limiter: Arc<RateLimiter>,
}

impl PageFetcherRateLimitEnforcer {
    /// Creates a new `PageFetcherRateLimitEnforcer` instance with the given fetcher.
    pub fn new(fetcher: Arc<dyn RepositoryPageFetcher>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            fetcher,
            rate_limiter,
        }
    }
}

#[async_trait::async_trait]
impl RepositoryPageFetcher for PageFetcherRateLimitEnforcer {
    async fn fetch_page(&self, request: &PageRequest) -> StdResult<RepositoryPage> {
        self.rate_limiter.acquire().await;
        let page = self.fetcher.fetch_page(request).await?;
        if let Some(rate_limit) = page.rate_limit() {
            self.rate_limiter.update(rate_limit).await;
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;
    use chrono::Utc;

    use crate::{
        ContentStatus, ListedRepository, MockContentFetcher, MockRepositoryPageFetcher,
        RateLimitSnapshot, RateLimitState,
    };

    use super::*;

    #[tokio::test]
    async fn fetch_updates_rate_limit_from_response() {
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_millis(10)));
        let enforcer = ContentFetcherRateLimitEnforcer::new(
            Arc::new({
                let mut mock_fetcher = MockContentFetcher::new();
                mock_fetcher
                    .expect_fetch()
                    .returning(|_| {
                        Ok(ContentResponse::new(
                            ContentStatus::NotFound,
                            Some(RateLimitSnapshot::dummy()),
                        ))
                    })
                    .times(1);

                mock_fetcher
            }),
            rate_limiter.clone(),
        );

        let response = enforcer.fetch(&FetchTask::dummy()).await.unwrap();

        assert_eq!(&ContentStatus::NotFound, response.status());
        assert_eq!(
            RateLimitState {
                remaining: Some(4999),
                reset_at: Some(RateLimitSnapshot::dummy().reset_at),
            },
            rate_limiter.current_state().await
        );
    }

    #[tokio::test]
    async fn fetch_waits_for_reset_when_quota_exhausted() {
        let rate_limiter = Arc::new(RateLimiter::new(5, Duration::from_millis(10)));
        let reset_at = Utc::now() + chrono::Duration::seconds(1);
        rate_limiter
            .update(&RateLimitSnapshot {
                limit: 5000,
                remaining: 0,
                used: 5000,
                reset_at,
            })
            .await;
        let enforcer = ContentFetcherRateLimitEnforcer::new(
            Arc::new({
                let mut mock_fetcher = MockContentFetcher::new();
                mock_fetcher
                    .expect_fetch()
                    .returning(|_| Ok(ContentResponse::new(ContentStatus::NotFound, None)))
                    .times(1);

                mock_fetcher
            }),
            rate_limiter,
        );

        enforcer.fetch(&FetchTask::dummy()).await.unwrap();

        assert!(reset_at <= Utc::now());
    }

    #[tokio::test]
    async fn fetch_propagates_fetcher_error() {
        let enforcer = ContentFetcherRateLimitEnforcer::new(
            Arc::new({
                let mut mock_fetcher = MockContentFetcher::new();
                mock_fetcher
                    .expect_fetch()
                    .returning(|_| Err(anyhow!("connection refused")))
                    .times(1);

                mock_fetcher
            }),
            Arc::new(RateLimiter::default()),
        );

        enforcer
            .fetch(&FetchTask::dummy())
            .await
            .expect_err("Fetcher error should be propagated");
    }

    #[tokio::test]
    async fn fetch_page_updates_rate_limit_from_page() {
        let rate_limiter = Arc::new(RateLimiter::default());
        let enforcer = PageFetcherRateLimitEnforcer::new(
            Arc::new({
                let mut mock_fetcher = MockRepositoryPageFetcher::new();
                mock_fetcher
                    .expect_fetch_page()
                    .returning(|_| {
                        Ok(RepositoryPage::new(
                            vec![ListedRepository::new("acme/a", false)],
                            None,
                            Some(RateLimitSnapshot::dummy()),
                        ))
                    })
                    .times(1);

                mock_fetcher
            }),
            rate_limiter.clone(),
        );

        let page = enforcer.fetch_page(&PageRequest::dummy()).await.unwrap();

        assert_eq!(1, page.repositories().len());
        assert_eq!(Some(4999), rate_limiter.current_state().await.remaining);
    }
}
