use std::sync::Arc;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::STANDARD};
use log::debug;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde::{Deserialize, de::IgnoredAny};

use crate::{
    ContentFetcher, ContentResponse, ContentStatus, FetchTask, GitHubClient, StdResult,
    error_message, rate_limit_from_headers,
};

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ContentsBody {
    Directory(Vec<IgnoredAny>),
    File(FileEntry),
}

#[derive(Deserialize, Debug)]
struct FileEntry {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// Fetches manifest files through the repository contents endpoint.
pub struct GitHubContentFetcher {
    client: Arc<GitHubClient>,
}

impl GitHubContentFetcher {
    /// Creates a new `GitHubContentFetcher` instance with the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    fn contents_url(&self, task: &FetchTask) -> String {
        self.client.url(&format!(
            "repos/{}/contents/{}",
            task.repository().full_name(),
            task.relative_path()
        ))
    }

    async fn decode_file(&self, entry: FileEntry) -> StdResult<ContentStatus> {
        match entry.encoding.as_deref() {
            Some("base64") => {
                let encoded = entry
                    .content
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect::<String>();
                Ok(match STANDARD.decode(encoded) {
                    Ok(content) => ContentStatus::Found(content),
                    Err(e) => ContentStatus::Failed {
                        status: StatusCode::OK.as_u16(),
                        message: format!("Invalid base64 content: {e}"),
                    },
                })
            }
            _ => match entry.download_url {
                // Files above 1 MB come without inline content.
                Some(download_url) => self.download_raw(&download_url).await,
                None => Ok(ContentStatus::Failed {
                    status: StatusCode::OK.as_u16(),
                    message: format!(
                        "Unsupported content encoding: {}",
                        entry.encoding.unwrap_or_default()
                    ),
                }),
            },
        }
    }

    async fn download_raw(&self, download_url: &str) -> StdResult<ContentStatus> {
        let response = self
            .client
            .get(download_url)
            .await
            .with_context(|| format!("GET {download_url}"))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(ContentStatus::Failed {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }
        let content = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read {download_url}"))?;

        Ok(ContentStatus::Found(content.to_vec()))
    }
}

#[async_trait::async_trait]
impl ContentFetcher for GitHubContentFetcher {
    async fn fetch(&self, task: &FetchTask) -> StdResult<ContentResponse> {
        let url = self.contents_url(task);
        let response = self
            .client
            .get(&url)
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        let rate_limit = rate_limit_from_headers(response.headers());
        debug!("{task}: HTTP {}", status.as_u16());

        let content_status = match status {
            StatusCode::OK => {
                let is_json = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|content_type| content_type.to_str().ok())
                    .is_some_and(|content_type| content_type.contains("json"));
                let body = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read {url}"))?;
                if is_json {
                    match serde_json::from_slice::<ContentsBody>(&body) {
                        Ok(ContentsBody::File(entry)) => self.decode_file(entry).await?,
                        Ok(ContentsBody::Directory(entries)) => ContentStatus::Failed {
                            status: status.as_u16(),
                            message: format!("Path is a directory of {} entries", entries.len()),
                        },
                        Err(e) => ContentStatus::Failed {
                            status: status.as_u16(),
                            message: format!("Invalid contents response: {e}"),
                        },
                    }
                } else {
                    ContentStatus::Found(body.to_vec())
                }
            }
            StatusCode::NOT_FOUND => ContentStatus::NotFound,
            _ => ContentStatus::Failed {
                status: status.as_u16(),
                message: error_message(response).await,
            },
        };

        Ok(ContentResponse::new(content_status, rate_limit))
    }
}
