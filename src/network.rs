use std::future::Future;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{Commit, CommitDetail, Repository, User};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const MAX_PER_PAGE: u32 = 100;

const USER_AGENT: &str = concat!("commitmark/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
// 1000 repositories
const MAX_REPOSITORY_PAGES: u32 = 10;

/// Read-only access to users, repositories and commits.
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn fetch_user(&self, username: &str) -> Result<User, ApiError>;

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>, ApiError>;

    /// One page of commits, newest first. `per_page` is clamped to 1..=100.
    async fn fetch_commits(&self, username: &str, repository: &str, page: u32, per_page: u32) -> Result<Vec<Commit>, ApiError>;

    async fn fetch_commit_detail(&self, username: &str, repository: &str, sha: &str) -> Result<CommitDetail, ApiError>;
}

/// Fetches profile and repository list concurrently; fails if either fails.
pub async fn load_profile(source: &dyn CommitSource, username: &str) -> Result<(User, Vec<Repository>), ApiError> {
    futures::try_join!(source.fetch_user(username), source.fetch_repositories(username))
}

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)], not_found: impl FnOnce() -> String) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ApiError::Upstream(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("GET {} failed with {}", url, status);
            return Err(map_error_status(status, &body, not_found));
        }
        response.json::<T>().await.map_err(|e| ApiError::Upstream(e.to_string()))
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn fetch_user(&self, username: &str) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{}", username), &[], || format!("User '{}' was not found", username))
            .await
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>, ApiError> {
        let path = format!("/users/{}/repos", username);
        let path = path.as_str();
        collect_pages(MAX_REPOSITORY_PAGES, move |page| async move {
            let query = [("sort", "updated".to_string()), ("per_page", MAX_PER_PAGE.to_string()), ("page", page.to_string())];
            self.get_json(path, &query, || format!("User '{}' was not found", username)).await
        })
        .await
    }

    async fn fetch_commits(&self, username: &str, repository: &str, page: u32, per_page: u32) -> Result<Vec<Commit>, ApiError> {
        let query = [("per_page", clamp_per_page(per_page).to_string()), ("page", page.max(1).to_string())];
        self.get_json(&format!("/repos/{}/{}/commits", username, repository), &query, || {
            format!("Repository '{}/{}' was not found", username, repository)
        })
        .await
    }

    async fn fetch_commit_detail(&self, username: &str, repository: &str, sha: &str) -> Result<CommitDetail, ApiError> {
        self.get_json(&format!("/repos/{}/{}/commits/{}", username, repository, sha), &[], || {
            format!("Commit {} was not found in '{}/{}'", sha, username, repository)
        })
        .await
    }
}

/// Requests pages 1, 2, ... of `MAX_PER_PAGE` items until one comes back
/// short, giving up after `max_pages`.
pub async fn collect_pages<T, F, Fut>(max_pages: u32, mut fetch_page: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut items = Vec::new();
    for page in 1..=max_pages {
        let batch = fetch_page(page).await?;
        let last = batch.len() < MAX_PER_PAGE as usize;
        items.extend(batch);
        if last {
            return Ok(items);
        }
    }
    tracing::warn!("Stopped after {} pages ({} items)", max_pages, items.len());
    Ok(items)
}

pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Turns a non-success response into an [`ApiError`]. GitHub error bodies
/// look like `{"message": "..."}`; that message is kept when present.
pub fn map_error_status(status: StatusCode, body: &str, not_found: impl FnOnce() -> String) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(not_found());
    }
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty());
    ApiError::Upstream(message.unwrap_or_else(|| status.to_string()))
}
