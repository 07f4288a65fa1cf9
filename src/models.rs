use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusArea {
    Sidebar,
    CommitList,
    Detail,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommitTab {
    History,
    Favorites,
}

impl CommitTab {
    pub fn as_index(self) -> usize {
        match self {
            CommitTab::History => 0,
            CommitTab::Favorites => 1,
        }
    }
}

/// Which text field the keyboard is currently typing into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputTarget {
    Username,
    Filter,
}

pub struct InputPrompt {
    pub visible: bool,
    pub target: InputTarget,
    pub buffer: String,
}

impl InputPrompt {
    pub fn hidden() -> Self {
        Self { visible: false, target: InputTarget::Username, buffer: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub message: String,
    #[serde(default)]
    pub author: Option<GitIdentity>,
}

/// The GitHub account linked to a commit, if the author email maps to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitInfo,
    #[serde(default)]
    pub author: Option<Account>,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("").trim_end()
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    pub fn author_display_name(&self) -> String {
        if let Some(name) = self.commit.author.as_ref().map(|a| a.name.trim()).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match &self.author {
            Some(account) => account.login.clone(),
            None => "Unknown".to_string(),
        }
    }

    pub fn timestamp(&self) -> &str {
        self.commit.author.as_ref().map(|a| a.date.as_str()).unwrap_or("")
    }

    /// Snapshot of everything the favorites view needs once this commit is no
    /// longer loaded.
    pub fn to_favorite_record(&self, owner: &str, repository: &str) -> FavoriteRecord {
        FavoriteRecord {
            id: self.sha.clone(),
            owner_name: owner.to_string(),
            container_name: repository.to_string(),
            summary: self.summary().to_string(),
            timestamp: self.timestamp().to_string(),
            author_display_name: self.author_display_name(),
            author_avatar_url: self.author.as_ref().and_then(|a| a.avatar_url.clone()),
            external_url: self.html_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub changes: u32,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(flatten)]
    pub commit: Commit,
    #[serde(default)]
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// Cached display data for a bookmarked commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub id: String,
    pub owner_name: String,
    pub container_name: String,
    pub summary: String,
    pub timestamp: String,
    pub author_display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar_url: Option<String>,
    pub external_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT_JSON: &str = r#"{
        "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
        "html_url": "https://github.com/octocat/Hello-World/commit/6dcb09b5b57875f334f61aebed695e2e4193db5e",
        "commit": {
            "message": "Fix all the bugs\n\nLonger body text",
            "author": { "name": "Monalisa Octocat", "email": "support@github.com", "date": "2011-04-14T16:00:49Z" }
        },
        "author": { "login": "octocat", "avatar_url": "https://github.com/images/error/octocat_happy.gif" }
    }"#;

    #[test]
    fn test_commit_derived_fields() {
        let commit: Commit = serde_json::from_str(COMMIT_JSON).unwrap();
        assert_eq!(commit.summary(), "Fix all the bugs");
        assert_eq!(commit.short_sha(), "6dcb09b");
        assert_eq!(commit.author_display_name(), "Monalisa Octocat");
        assert_eq!(commit.timestamp(), "2011-04-14T16:00:49Z");
    }

    #[test]
    fn test_author_name_falls_back_to_login_then_unknown() {
        let mut commit: Commit = serde_json::from_str(COMMIT_JSON).unwrap();
        commit.commit.author = None;
        assert_eq!(commit.author_display_name(), "octocat");
        commit.author = None;
        assert_eq!(commit.author_display_name(), "Unknown");
    }

    #[test]
    fn test_favorite_record_snapshot() {
        let commit: Commit = serde_json::from_str(COMMIT_JSON).unwrap();
        let record = commit.to_favorite_record("octocat", "Hello-World");
        assert_eq!(record.id, commit.sha);
        assert_eq!(record.owner_name, "octocat");
        assert_eq!(record.container_name, "Hello-World");
        assert_eq!(record.summary, "Fix all the bugs");
        assert_eq!(record.author_avatar_url.as_deref(), Some("https://github.com/images/error/octocat_happy.gif"));
        assert_eq!(record.external_url, commit.html_url);
    }

    #[test]
    fn test_favorite_record_uses_camel_case_keys() {
        let json = r#"{"id":"abc123","ownerName":"octo","containerName":"Hello-World","summary":"Fix bug","timestamp":"2024-01-01T00:00:00Z","authorDisplayName":"Octo Cat","externalUrl":"https://example/commit/abc123"}"#;
        let record: FavoriteRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.author_avatar_url, None);
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_commit_detail_flattens_commit() {
        let json = r#"{
            "sha": "abc", "html_url": "u",
            "commit": { "message": "m" },
            "author": null,
            "stats": { "additions": 3, "deletions": 1, "total": 4 },
            "files": [ { "filename": "src/lib.rs", "status": "modified", "additions": 3, "deletions": 1, "changes": 4 } ]
        }"#;
        let detail: CommitDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.commit.sha, "abc");
        assert_eq!(detail.stats.unwrap().total, 4);
        assert_eq!(detail.files[0].filename, "src/lib.rs");
        assert_eq!(detail.files[0].patch, None);
    }
}
