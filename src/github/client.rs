//! GitHub REST adapter implementing [`ReleaseApi`].
//!
//! Status codes are classified here and nowhere else: 404 becomes `NotFound`,
//! 422 `Unprocessable`, 429 (or 403 with an exhausted quota) `RateLimited`, and
//! everything else `Unknown`.

use super::models::{
    AssetInfo, BranchResponse, ErrorBody, NewRelease, RefResponse, ReleaseDescriptor,
    ReleaseUpdate, UpdateRefRequest,
};
use super::{ReleaseApi, Repository};
use crate::error::{ApiError, ApiResult, ConfigError, Result};
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{SystemTime, UNIX_EPOCH};

/// Public GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("kodegen_release_upload/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const ASSET_CONTENT_TYPE: &str = "binary/octet-stream";
const PER_PAGE: usize = 100;

/// Authenticated GitHub API client, built once and shared by reference
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: Url,
}

impl GitHubClient {
    /// Create a client for api.github.com
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client for a specific API endpoint (GitHub Enterprise, tests)
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidValue {
                input: "GITHUB_API_URL".to_string(),
                reason: format!("'{api_base}' is not an http(s) URL"),
            })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            ConfigError::InvalidValue {
                input: "github_token".to_string(),
                reason: "contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Unknown {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, api_base })
    }

    /// `{api_base}/repos/{owner}/{repo}/{segments...}`, each segment percent-encoded
    fn repo_url<'a>(&self, repo: &Repository, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_base.clone();
        // cannot-be-a-base URLs are rejected in `with_api_base`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
                .extend(segments);
        }
        url
    }

    /// Fetch every page of a list endpoint
    async fn get_all<T: DeserializeOwned>(&self, url: Url) -> ApiResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let batch: Vec<T> = self
                .send_json(self.http.get(url.clone()).query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]))
                .await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| ApiError::Unknown {
            status: None,
            message: e.to_string(),
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| ApiError::Unknown {
            status: Some(status.as_u16()),
            message: format!("unexpected response body: {e}"),
        })
    }

    async fn get_ref_object(&self, url: Url) -> ApiResult<RefResponse> {
        self.send_json(self.http.get(url)).await
    }
}

impl ReleaseApi for GitHubClient {
    async fn get_release_by_tag(&self, repo: &Repository, tag: &str) -> ApiResult<ReleaseDescriptor> {
        let url = self.repo_url(repo, ["releases", "tags"].into_iter().chain(ref_segments(tag)));
        self.send_json(self.http.get(url)).await
    }

    async fn list_releases(&self, repo: &Repository) -> ApiResult<Vec<ReleaseDescriptor>> {
        self.get_all(self.repo_url(repo, ["releases"])).await
    }

    async fn create_release(
        &self,
        repo: &Repository,
        release: &NewRelease,
    ) -> ApiResult<ReleaseDescriptor> {
        let url = self.repo_url(repo, ["releases"]);
        self.send_json(self.http.post(url).json(release)).await
    }

    async fn update_release(
        &self,
        repo: &Repository,
        release_id: u64,
        update: &ReleaseUpdate,
    ) -> ApiResult<ReleaseDescriptor> {
        let id = release_id.to_string();
        let url = self.repo_url(repo, ["releases", id.as_str()]);
        self.send_json(self.http.patch(url).json(update)).await
    }

    async fn delete_release(&self, repo: &Repository, release_id: u64) -> ApiResult<()> {
        let id = release_id.to_string();
        let url = self.repo_url(repo, ["releases", id.as_str()]);
        self.send(self.http.delete(url)).await.map(|_| ())
    }

    async fn list_assets(&self, repo: &Repository, release_id: u64) -> ApiResult<Vec<AssetInfo>> {
        let id = release_id.to_string();
        self.get_all(self.repo_url(repo, ["releases", id.as_str(), "assets"]))
            .await
    }

    async fn delete_asset(&self, repo: &Repository, asset_id: u64) -> ApiResult<()> {
        let id = asset_id.to_string();
        let url = self.repo_url(repo, ["releases", "assets", id.as_str()]);
        self.send(self.http.delete(url)).await.map(|_| ())
    }

    async fn upload_asset(
        &self,
        upload_url: &str,
        asset_name: &str,
        content: Bytes,
    ) -> ApiResult<AssetInfo> {
        let request = self
            .http
            .post(upload_endpoint(upload_url))
            .query(&[("name", asset_name)])
            .header(CONTENT_TYPE, ASSET_CONTENT_TYPE)
            .header(CONTENT_LENGTH, content.len())
            .body(content);
        self.send_json(request).await
    }

    async fn get_branch_commit(&self, repo: &Repository, branch: &str) -> ApiResult<String> {
        let url = self.repo_url(repo, ["branches"].into_iter().chain(ref_segments(branch)));
        let branch: BranchResponse = self.send_json(self.http.get(url)).await?;
        Ok(branch.commit.sha)
    }

    async fn update_tag_ref(&self, repo: &Repository, tag: &str, sha: &str) -> ApiResult<()> {
        let url = self.repo_url(repo, ["git", "refs", "tags"].into_iter().chain(ref_segments(tag)));
        let body = UpdateRefRequest { sha, force: false };
        self.send(self.http.patch(url).json(&body)).await.map(|_| ())
    }

    async fn get_tag_commit(&self, repo: &Repository, tag: &str) -> ApiResult<String> {
        let url = self.repo_url(repo, ["git", "ref", "tags"].into_iter().chain(ref_segments(tag)));
        let reference = self.get_ref_object(url).await?;

        // Annotated tags point at a tag object; peel it to the commit.
        if reference.object.kind == "tag" {
            let tag_object = self
                .get_ref_object(self.repo_url(repo, ["git", "tags", reference.object.sha.as_str()]))
                .await?;
            return Ok(tag_object.object.sha);
        }

        Ok(reference.object.sha)
    }
}

/// Split a ref name into path segments; `/` stays a separator, everything else is encoded
fn ref_segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('/')
}

/// Strip the `{?name,label}` URI template suffix GitHub puts on `upload_url`
fn upload_endpoint(upload_url: &str) -> &str {
    upload_url.split('{').next().unwrap_or(upload_url)
}

async fn classify_response(response: Response) -> ApiError {
    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if text.trim().is_empty() => status.canonical_reason().unwrap_or_default().to_string(),
        Err(_) => text,
    };

    classify_status(status, &headers, message)
}

fn classify_status(status: StatusCode, headers: &HeaderMap, message: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        StatusCode::UNPROCESSABLE_ENTITY => ApiError::Unprocessable { message },
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
            retry_after_seconds: retry_after(headers),
        },
        StatusCode::FORBIDDEN if quota_exhausted(headers) => ApiError::RateLimited {
            retry_after_seconds: retry_after(headers),
        },
        _ => ApiError::Unknown {
            status: Some(status.as_u16()),
            message,
        },
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn quota_exhausted(headers: &HeaderMap) -> bool {
    header_u64(headers, "x-ratelimit-remaining") == Some(0) || headers.contains_key("retry-after")
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    if let Some(seconds) = header_u64(headers, "retry-after") {
        return Some(seconds);
    }

    let reset = header_u64(headers, "x-ratelimit-reset")?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(reset.saturating_sub(now))
}
