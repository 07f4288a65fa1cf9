//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use commitmark::error::ApiError;
use commitmark::models::{Commit, CommitDetail, CommitInfo, FavoriteRecord, GitIdentity, Repository, User};
use commitmark::network::CommitSource;

pub fn user(login: &str) -> User {
    User {
        login: login.to_string(),
        name: None,
        avatar_url: None,
        html_url: format!("https://github.com/{}", login),
        bio: None,
        public_repos: 0,
        followers: 0,
        following: 0,
    }
}

pub fn repo(name: &str, description: Option<&str>) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("octo/{}", name),
        description: description.map(str::to_string),
        html_url: String::new(),
        language: None,
        stargazers_count: 0,
        forks_count: 0,
        updated_at: None,
        fork: false,
    }
}

pub fn commit(sha: &str, date: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        html_url: format!("https://github.com/octo/repo/commit/{}", sha),
        commit: CommitInfo {
            message: format!("Change {}\n\nbody", sha),
            author: Some(GitIdentity { name: "Octo Cat".to_string(), email: "octo@example.com".to_string(), date: date.to_string() }),
        },
        author: None,
    }
}

pub fn record(id: &str, timestamp: &str) -> FavoriteRecord {
    FavoriteRecord {
        id: id.to_string(),
        owner_name: "octo".to_string(),
        container_name: "Hello-World".to_string(),
        summary: format!("Change {}", id),
        timestamp: timestamp.to_string(),
        author_display_name: "Octo Cat".to_string(),
        author_avatar_url: None,
        external_url: format!("https://example/commit/{}", id),
    }
}

/// In-memory [`CommitSource`] with optional per-sha latency.
#[derive(Default)]
pub struct FakeSource {
    pub users: HashMap<String, (User, Vec<Repository>)>,
    pub commits: HashMap<String, Vec<Commit>>,
    pub detail_delays: HashMap<String, Duration>,
    pub failing_repos: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_user(mut self, login: &str, repositories: Vec<Repository>) -> Self {
        self.users.insert(login.to_string(), (user(login), repositories));
        self
    }

    pub fn with_commits(mut self, repository: &str, commits: Vec<Commit>) -> Self {
        self.commits.insert(repository.to_string(), commits);
        self
    }

    pub fn with_detail_delay(mut self, sha: &str, delay: Duration) -> Self {
        self.detail_delays.insert(sha.to_string(), delay);
        self
    }

    pub fn with_failing_repo(mut self, repository: &str, message: &str) -> Self {
        self.failing_repos.insert(repository.to_string(), message.to_string());
        self
    }
}

#[async_trait]
impl CommitSource for FakeSource {
    async fn fetch_user(&self, username: &str) -> Result<User, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(username)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| ApiError::NotFound(format!("User '{}' was not found", username)))
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(username)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| ApiError::NotFound(format!("User '{}' was not found", username)))
    }

    async fn fetch_commits(&self, username: &str, repository: &str, page: u32, per_page: u32) -> Result<Vec<Commit>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failing_repos.get(repository) {
            return Err(ApiError::Upstream(message.clone()));
        }
        let all = self
            .commits
            .get(repository)
            .ok_or_else(|| ApiError::NotFound(format!("Repository '{}/{}' was not found", username, repository)))?;
        let start = ((page.max(1) - 1) * per_page) as usize;
        Ok(all.iter().skip(start).take(per_page as usize).cloned().collect())
    }

    async fn fetch_commit_detail(&self, username: &str, repository: &str, sha: &str) -> Result<CommitDetail, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.detail_delays.get(sha) {
            tokio::time::sleep(*delay).await;
        }
        let commit = self
            .commits
            .get(repository)
            .and_then(|commits| commits.iter().find(|c| c.sha == sha))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Commit {} was not found in '{}/{}'", sha, username, repository)))?;
        Ok(CommitDetail { commit, stats: None, files: Vec::new() })
    }
}
