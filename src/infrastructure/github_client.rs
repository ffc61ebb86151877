use std::time::Duration;

use anyhow::{Context, anyhow};
use log::debug;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;

use crate::{HarvestError, RateLimitSnapshot, StdResult};

/// The REST production endpoint for GitHub.
pub const GITHUB_API_ENDPOINT: &str = "https://api.github.com";

/// The environment variable holding the personal access token.
pub const GITHUB_AUTH_TOKEN_ENV: &str = "GITHUB_AUTH_TOKEN";

const USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Validates the personal access token read from the environment.
pub fn resolve_token(value: Option<String>) -> StdResult<String> {
    match value {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(anyhow!(HarvestError::Config(format!(
            "Missing {GITHUB_AUTH_TOKEN_ENV} environment variable"
        )))),
    }
}

#[derive(Deserialize, Debug)]
struct RateLimitBody {
    rate: RateLimitResource,
}

#[derive(Deserialize, Debug)]
struct RateLimitResource {
    limit: u32,
    remaining: u32,
    #[serde(default)]
    used: u32,
    reset: i64,
}

/// An authenticated client for the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` sending the token with every request.
    pub fn try_new(base_url: &str, token: &str, timeout: Duration) -> StdResult<Self> {
        let mut authorization = HeaderValue::from_str(&format!("token {token}"))
            .with_context(|| "Invalid characters in authorization token")?;
        authorization.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds an absolute URL from a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an authenticated GET request to an absolute URL.
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        debug!("GET {url}");
        self.client.get(url).send().await
    }

    /// Fetches the core rate limit from the dedicated endpoint, which consumes no quota.
    pub async fn fetch_rate_limit(&self) -> StdResult<RateLimitSnapshot> {
        let response = self
            .get(&self.url("rate_limit"))
            .await
            .with_context(|| "Failed to query the rate limit endpoint")?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(anyhow!(
                "Rate limit endpoint answered HTTP {}: {}",
                status.as_u16(),
                error_message(response).await
            ));
        }
        let body: RateLimitBody = response
            .json()
            .await
            .with_context(|| "Failed to parse the rate limit response")?;

        RateLimitSnapshot::from_epoch(
            body.rate.limit,
            body.rate.remaining,
            body.rate.used,
            body.rate.reset,
        )
        .ok_or_else(|| anyhow!("Invalid rate limit reset time: {}", body.rate.reset))
    }
}

/// Reads the `x-ratelimit-*` headers of a response.
pub fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers.get(name)?.to_str().ok()?.trim().parse().ok()
    }

    let remaining: u32 = header(headers, "x-ratelimit-remaining")?;
    let reset = header(headers, "x-ratelimit-reset")?;
    let limit = header(headers, "x-ratelimit-limit").unwrap_or(remaining);
    let used = header(headers, "x-ratelimit-used").unwrap_or(limit.saturating_sub(remaining));

    RateLimitSnapshot::from_epoch(limit, remaining, used, reset)
}

/// Extracts the `rel="next"` target of a `Link` header.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        target
            .strip_prefix('<')
            .and_then(|target| target.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Reads the error message of a failed response, preferring the JSON `message` field.
pub async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("No error message available")
                .to_string()
        })
}
