//! Browsing state for the user → repository → commit drill-down.
//!
//! This module performs no I/O. Every transition that needs remote data
//! returns a request ticket; the caller fetches and hands the ticket back with
//! the result. A result whose ticket no longer matches the current selection
//! is dropped, so a slow response can never overwrite a newer selection.

use crate::error::ApiError;
use crate::models::{Commit, CommitDetail, Repository, User};
use crate::network::clamp_per_page;
use crate::utils::filter_repositories;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Idle,
    Loading,
    Ready { user: User, repositories: Vec<Repository> },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub username: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitsRequest {
    pub username: String,
    pub repository: String,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub username: String,
    pub repository: String,
    pub sha: String,
}

/// Any fetch the state asked for, as handed to the code that performs I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Profile(ProfileRequest),
    Commits(CommitsRequest),
    Detail(DetailRequest),
}

pub struct BrowseState {
    username: Option<String>,
    profile: ProfileState,
    generation: u64,
    filter: String,
    per_page: u32,
    selected_repository: Option<String>,
    commits: Vec<Commit>,
    commits_page: u32,
    commits_loading: bool,
    has_more_commits: bool,
    selected_commit: Option<String>,
    commit_detail: Option<CommitDetail>,
    detail_loading: bool,
    error: Option<String>,
}

impl BrowseState {
    pub fn new(per_page: u32) -> Self {
        Self {
            username: None,
            profile: ProfileState::Idle,
            generation: 0,
            filter: String::new(),
            per_page: clamp_per_page(per_page),
            selected_repository: None,
            commits: Vec::new(),
            commits_page: 0,
            commits_loading: false,
            has_more_commits: false,
            selected_commit: None,
            commit_detail: None,
            detail_loading: false,
            error: None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn profile(&self) -> &ProfileState {
        &self.profile
    }

    pub fn user(&self) -> Option<&User> {
        match &self.profile {
            ProfileState::Ready { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn repositories(&self) -> &[Repository] {
        match &self.profile {
            ProfileState::Ready { repositories, .. } => repositories,
            _ => &[],
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
    }

    /// Recomputed on every call, so it always reflects the current query and
    /// the current repository list.
    pub fn filtered_repositories(&self) -> Vec<&Repository> {
        filter_repositories(self.repositories(), &self.filter)
    }

    pub fn selected_repository(&self) -> Option<&str> {
        self.selected_repository.as_deref()
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn commits_loading(&self) -> bool {
        self.commits_loading
    }

    pub fn has_more_commits(&self) -> bool {
        self.has_more_commits
    }

    pub fn selected_commit(&self) -> Option<&str> {
        self.selected_commit.as_deref()
    }

    pub fn selected_commit_summary(&self) -> Option<&Commit> {
        let sha = self.selected_commit.as_deref()?;
        self.commits.iter().find(|c| c.sha == sha)
    }

    pub fn commit_detail(&self) -> Option<&CommitDetail> {
        self.commit_detail.as_ref()
    }

    pub fn detail_loading(&self) -> bool {
        self.detail_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.profile == ProfileState::Loading || self.commits_loading || self.detail_loading
    }

    /// Enters a username: drops everything tied to the previous one and
    /// starts loading the new profile.
    pub fn begin_profile(&mut self, username: &str) -> ProfileRequest {
        self.generation += 1;
        self.username = Some(username.to_string());
        self.profile = ProfileState::Loading;
        self.error = None;
        self.reset_repository_selection();
        tracing::info!("Loading profile for {}", username);
        ProfileRequest { username: username.to_string(), generation: self.generation }
    }

    pub fn finish_profile(&mut self, request: &ProfileRequest, result: Result<(User, Vec<Repository>), ApiError>) {
        if request.generation != self.generation {
            tracing::debug!("Discarding stale profile response for {}", request.username);
            return;
        }
        match result {
            Ok((user, repositories)) => {
                tracing::info!("Loaded {} repositories for {}", repositories.len(), user.login);
                self.profile = ProfileState::Ready { user, repositories };
            }
            Err(e) => {
                let message = e.to_string();
                if e.is_not_found() {
                    tracing::info!("No GitHub user named {}", request.username);
                } else {
                    tracing::warn!("Profile load for {} failed: {}", request.username, message);
                }
                self.profile = ProfileState::Error(message.clone());
                self.error = Some(message);
                self.reset_repository_selection();
            }
        }
    }

    /// Always clears the previous repository's commits and commit selection,
    /// even when re-selecting the same repository.
    pub fn select_repository(&mut self, repository: &str) -> Option<CommitsRequest> {
        let username = self.username.clone()?;
        self.reset_repository_selection();
        self.error = None;
        self.selected_repository = Some(repository.to_string());
        self.commits_loading = true;
        Some(CommitsRequest { username, repository: repository.to_string(), page: 1, per_page: self.per_page })
    }

    pub fn load_more_commits(&mut self) -> Option<CommitsRequest> {
        if self.commits_loading || !self.has_more_commits {
            return None;
        }
        let username = self.username.clone()?;
        let repository = self.selected_repository.clone()?;
        self.commits_loading = true;
        Some(CommitsRequest { username, repository, page: self.commits_page + 1, per_page: self.per_page })
    }

    pub fn finish_commits(&mut self, request: &CommitsRequest, result: Result<Vec<Commit>, ApiError>) {
        let current = self.username.as_deref() == Some(request.username.as_str())
            && self.selected_repository.as_deref() == Some(request.repository.as_str())
            && request.page == self.commits_page + 1;
        if !current || !self.commits_loading {
            tracing::debug!("Discarding stale commit page {} for {}", request.page, request.repository);
            return;
        }
        self.commits_loading = false;
        match result {
            Ok(page) => {
                self.has_more_commits = page.len() as u32 >= request.per_page;
                self.commits_page = request.page;
                self.commits.extend(page);
            }
            Err(e) => {
                tracing::warn!("Loading commits for {} failed: {}", request.repository, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Selects a commit of the current repository and returns the detail
    /// request for it. Without a selected repository there is nothing to do.
    pub fn select_commit(&mut self, sha: &str) -> Option<DetailRequest> {
        let username = self.username.clone()?;
        let repository = self.selected_repository.clone()?;
        self.selected_commit = Some(sha.to_string());
        self.commit_detail = None;
        self.detail_loading = true;
        self.error = None;
        Some(DetailRequest { username, repository, sha: sha.to_string() })
    }

    pub fn finish_commit_detail(&mut self, request: &DetailRequest, result: Result<CommitDetail, ApiError>) {
        if !self.is_current_detail(request) {
            tracing::debug!("Discarding stale detail for {}/{}@{}", request.username, request.repository, request.sha);
            return;
        }
        self.detail_loading = false;
        match result {
            Ok(detail) => self.commit_detail = Some(detail),
            Err(e) => {
                tracing::warn!("Loading commit {} failed: {}", request.sha, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Re-issues the innermost request that failed. There is no automatic
    /// retry; this is what the user triggers after seeing an error.
    pub fn retry(&mut self) -> Option<Request> {
        if let ProfileState::Error(_) = self.profile {
            let username = self.username.clone()?;
            return Some(Request::Profile(self.begin_profile(&username)));
        }
        if let Some(sha) = self.selected_commit.clone() {
            if self.commit_detail.is_none() && !self.detail_loading {
                self.error = None;
                return self.select_commit(&sha).map(Request::Detail);
            }
        }
        if let Some(repository) = self.selected_repository.clone() {
            if self.commits.is_empty() && !self.commits_loading {
                return self.select_repository(&repository).map(Request::Commits);
            }
        }
        // A later page failed; the pages already loaded stay
        if self.error.is_some() && self.has_more_commits && !self.commits.is_empty() {
            let request = self.load_more_commits()?;
            self.error = None;
            return Some(Request::Commits(request));
        }
        None
    }

    pub fn clear_commit_selection(&mut self) {
        self.selected_commit = None;
        self.commit_detail = None;
        self.detail_loading = false;
    }

    fn is_current_detail(&self, request: &DetailRequest) -> bool {
        self.username.as_deref() == Some(request.username.as_str())
            && self.selected_repository.as_deref() == Some(request.repository.as_str())
            && self.selected_commit.as_deref() == Some(request.sha.as_str())
    }

    fn reset_repository_selection(&mut self) {
        self.selected_repository = None;
        self.commits.clear();
        self.commits_page = 0;
        self.commits_loading = false;
        self.has_more_commits = false;
        self.clear_commit_selection();
    }
}
