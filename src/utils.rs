use anyhow::Result;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CommitDetail, FavoriteRecord, Repository};

// GitHub logins: alphanumerics and single hyphens, at most 39 characters
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9]|-[A-Za-z0-9]){0,38}$").unwrap());

/// Case-insensitive substring match against repository name and description.
/// An empty query keeps everything.
pub fn filter_repositories<'a>(repositories: &'a [Repository], query: &str) -> Vec<&'a Repository> {
    let needle = query.to_lowercase();
    repositories
        .iter()
        .filter(|repo| {
            repo.name.to_lowercase().contains(&needle)
                || repo.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn is_valid_username(username: &str) -> bool {
    username.len() <= 39 && USERNAME_REGEX.is_match(username)
}

/// "3h ago"-style rendering of an ISO-8601 timestamp. Unparseable input is
/// returned unchanged.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let secs = (now - then.with_timezone(&Utc)).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        86_400..=2_591_999 => format!("{}d ago", secs / 86_400),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

/// Plain-text body of the detail pane: header, stats and changed files.
pub fn commit_detail_text(detail: &CommitDetail) -> String {
    let commit = &detail.commit;
    let mut out = String::new();
    out.push_str(&format!("commit {}\n", commit.sha));
    out.push_str(&format!("Author: {}\n", commit.author_display_name()));
    if !commit.timestamp().is_empty() {
        out.push_str(&format!("Date:   {}\n", commit.timestamp()));
    }
    out.push('\n');
    for line in commit.commit.message.lines() {
        out.push_str(&format!("    {}\n", line));
    }
    out.push('\n');
    if let Some(stats) = &detail.stats {
        out.push_str(&format!(
            "{} file{} changed, {} insertion{}(+), {} deletion{}(-)\n",
            detail.files.len(),
            if detail.files.len() == 1 { "" } else { "s" },
            stats.additions,
            if stats.additions == 1 { "" } else { "s" },
            stats.deletions,
            if stats.deletions == 1 { "" } else { "s" },
        ));
    }
    for file in &detail.files {
        out.push_str(&format!("{} {} (+{} -{})\n", status_letter(&file.status), file.filename, file.additions, file.deletions));
    }
    out
}

fn status_letter(status: &str) -> char {
    match status {
        "added" => 'A',
        "removed" => 'D',
        "renamed" => 'R',
        "copied" => 'C',
        _ => 'M',
    }
}

/// Detail pane text for a bookmark whose commit is no longer loaded.
pub fn favorite_record_text(record: &FavoriteRecord) -> String {
    format!(
        "commit {}\nRepository: {}/{}\nAuthor: {}\nDate:   {}\n\n    {}\n\n{}\n",
        record.id,
        record.owner_name,
        record.container_name,
        record.author_display_name,
        record.timestamp,
        record.summary,
        record.external_url
    )
}

pub fn get_detail_height() -> Result<u16> {
    let (_cols, rows) = crossterm::terminal::size()?;
    Ok(rows.saturating_sub(2 + 1 + 3)) // borders + footer + tabs
}

pub fn calculate_max_scroll(content: &str, view_height: u16) -> u16 {
    let content_lines = content.lines().count() as u16;
    let visible_lines = view_height.saturating_sub(2);
    content_lines.saturating_sub(visible_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commit, CommitFile, CommitInfo, CommitStats};

    fn repo(name: &str, description: Option<&str>) -> Repository {
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

    #[test]
    fn test_filter_matches_name_or_description() {
        let repos = vec![repo("Hello-World", None), repo("Other", Some("a world of things"))];
        let names: Vec<&str> = filter_repositories(&repos, "world").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Hello-World", "Other"]);
        assert!(filter_repositories(&repos, "zzz").is_empty());
    }

    #[test]
    fn test_filter_is_case_insensitive_and_empty_keeps_all() {
        let repos = vec![repo("Hello-World", None), repo("Other", Some("misc"))];
        assert_eq!(filter_repositories(&repos, "HELLO").len(), 1);
        assert_eq!(filter_repositories(&repos, "").len(), 2);
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("octocat"));
        assert!(is_valid_username("octo-cat-2"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("-octo"));
        assert!(!is_valid_username("octo--cat"));
        assert!(!is_valid_username("octo/cat"));
        assert!(!is_valid_username(&"a".repeat(40)));
    }

    #[test]
    fn test_relative_time() {
        let now = DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(relative_time("2024-03-10T11:59:30Z", now), "just now");
        assert_eq!(relative_time("2024-03-10T11:15:00Z", now), "45m ago");
        assert_eq!(relative_time("2024-03-10T09:00:00Z", now), "3h ago");
        assert_eq!(relative_time("2024-03-08T12:00:00Z", now), "2d ago");
        assert_eq!(relative_time("2023-01-02T00:00:00Z", now), "2023-01-02");
        assert_eq!(relative_time("garbage", now), "garbage");
    }

    #[test]
    fn test_commit_detail_text() {
        let detail = CommitDetail {
            commit: Commit {
                sha: "abc123".to_string(),
                html_url: String::new(),
                commit: CommitInfo { message: "Fix bug\n\nDetails".to_string(), author: None },
                author: None,
            },
            stats: Some(CommitStats { additions: 1, deletions: 2, total: 3 }),
            files: vec![CommitFile {
                filename: "src/main.rs".to_string(),
                status: "modified".to_string(),
                additions: 1,
                deletions: 2,
                changes: 3,
                patch: None,
            }],
        };
        let text = commit_detail_text(&detail);
        assert!(text.starts_with("commit abc123\nAuthor: Unknown\n"));
        assert!(text.contains("    Fix bug\n"));
        assert!(text.contains("1 file changed, 1 insertion(+), 2 deletions(-)"));
        assert!(text.contains("M src/main.rs (+1 -2)"));
    }

    #[test]
    fn test_calculate_max_scroll() {
        assert_eq!(calculate_max_scroll("a\nb\nc", 15), 0);
        let long = vec!["line"; 20].join("\n");
        assert_eq!(calculate_max_scroll(&long, 15), 7);
    }
}
