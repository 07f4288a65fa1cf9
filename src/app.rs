use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config;
use crate::error::ApiError;
use crate::favorites::FavoritesStore;
use crate::input::handle_key;
use crate::models::{Commit, CommitDetail, CommitTab, FavoriteRecord, FocusArea, InputPrompt, Repository, User};
use crate::network::{CommitSource, load_profile};
use crate::state::{BrowseState, CommitsRequest, DetailRequest, ProfileRequest, Request};
use crate::theme::Theme;
use crate::ui::render_app;
use crate::utils::{commit_detail_text, favorite_record_text, is_valid_username};

/// A finished fetch, tagged with the request that started it.
pub enum FetchOutcome {
    Profile(ProfileRequest, Result<(User, Vec<Repository>), ApiError>),
    Commits(CommitsRequest, Result<Vec<Commit>, ApiError>),
    Detail(DetailRequest, Result<CommitDetail, ApiError>),
}

/// One row of the favorites tab. Ids migrated from the legacy format have no
/// cached record until its commit appears in a loaded history page.
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteEntry {
    Record(FavoriteRecord),
    BareId(String),
}

impl FavoriteEntry {
    pub fn id(&self) -> &str {
        match self {
            FavoriteEntry::Record(record) => &record.id,
            FavoriteEntry::BareId(id) => id,
        }
    }
}

pub struct App {
    pub state: BrowseState,
    pub favorites: FavoritesStore,
    pub focus: FocusArea,
    pub tab: CommitTab,
    pub prompt: InputPrompt,
    pub repo_index: usize,
    pub commit_index: usize,
    pub favorite_index: usize,
    pub detail_scroll: u16,
    pub status: Option<String>,
    pub theme: Theme,
    remember_username: bool,
    source: Arc<dyn CommitSource>,
    tx: UnboundedSender<FetchOutcome>,
    rx: UnboundedReceiver<FetchOutcome>,
}

impl App {
    pub fn new(source: Arc<dyn CommitSource>, favorites: FavoritesStore, per_page: u32, remember_username: bool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: BrowseState::new(per_page),
            favorites,
            focus: FocusArea::Sidebar,
            tab: CommitTab::History,
            prompt: InputPrompt::hidden(),
            repo_index: 0,
            commit_index: 0,
            favorite_index: 0,
            detail_scroll: 0,
            status: None,
            theme: Theme::default(),
            remember_username,
            source,
            tx,
            rx,
        }
    }

    /// Runs a request on the tokio runtime; the outcome comes back through
    /// the channel and is applied by [`App::drain_outcomes`].
    pub fn dispatch(&self, request: Request) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match request {
                Request::Profile(req) => {
                    let result = load_profile(source.as_ref(), &req.username).await;
                    FetchOutcome::Profile(req, result)
                }
                Request::Commits(req) => {
                    let result = source.fetch_commits(&req.username, &req.repository, req.page, req.per_page).await;
                    FetchOutcome::Commits(req, result)
                }
                Request::Detail(req) => {
                    let result = source.fetch_commit_detail(&req.username, &req.repository, &req.sha).await;
                    FetchOutcome::Detail(req, result)
                }
            };
            // The receiver only goes away on shutdown
            let _ = tx.send(outcome);
        });
    }

    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Profile(req, result) => {
                self.state.finish_profile(&req, result);
                self.repo_index = 0;
            }
            FetchOutcome::Commits(req, result) => {
                self.state.finish_commits(&req, result);
                self.commit_index = self.commit_index.min(self.state.commits().len().saturating_sub(1));
                self.backfill_favorite_records();
            }
            FetchOutcome::Detail(req, result) => {
                self.state.finish_commit_detail(&req, result);
                self.detail_scroll = 0;
            }
        }
    }

    /// Favorites migrated from the legacy format carry only an id. Once such a
    /// commit shows up in a loaded page, its record is captured.
    fn backfill_favorite_records(&mut self) {
        let (Some(owner), Some(repository)) = (self.state.username(), self.state.selected_repository()) else {
            return;
        };
        let missing: Vec<_> = self
            .state
            .commits()
            .iter()
            .filter(|c| self.favorites.is_favorite(&c.sha) && self.favorites.get_favorite_record(&c.sha).is_none())
            .map(|c| c.to_favorite_record(owner, repository))
            .collect();
        for record in missing {
            tracing::debug!("Backfilling favorite record for {}", record.id);
            let id = record.id.clone();
            self.favorites.add_favorite(&id, Some(record));
        }
    }

    /// Applies every outcome that has arrived so far without waiting.
    pub fn drain_outcomes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    /// Waits for the next outcome and applies it.
    pub async fn next_outcome(&mut self) -> bool {
        match self.rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    pub fn enter_username(&mut self, username: &str) {
        let username = username.trim();
        if !is_valid_username(username) {
            self.status = Some(format!("'{}' is not a valid GitHub username", username));
            return;
        }
        let req = self.state.begin_profile(username);
        self.repo_index = 0;
        self.commit_index = 0;
        self.focus = FocusArea::Sidebar;
        self.status = None;
        if self.remember_username {
            if let Err(e) = config::save_last_username(username) {
                tracing::warn!("Could not remember username: {}", e);
            }
        }
        self.dispatch(Request::Profile(req));
    }

    pub fn set_filter(&mut self, query: &str) {
        self.state.set_filter(query);
        self.repo_index = self.repo_index.min(self.state.filtered_repositories().len().saturating_sub(1));
    }

    pub fn highlighted_repository(&self) -> Option<&Repository> {
        self.state.filtered_repositories().get(self.repo_index).copied()
    }

    pub fn open_highlighted_repository(&mut self) {
        let Some(name) = self.highlighted_repository().map(|r| r.name.clone()) else {
            return;
        };
        if let Some(req) = self.state.select_repository(&name) {
            self.commit_index = 0;
            self.detail_scroll = 0;
            self.tab = CommitTab::History;
            self.focus = FocusArea::CommitList;
            self.dispatch(Request::Commits(req));
        }
    }

    pub fn highlighted_commit(&self) -> Option<&Commit> {
        self.state.commits().get(self.commit_index)
    }

    pub fn open_highlighted_commit(&mut self) {
        let Some(sha) = self.highlighted_commit().map(|c| c.sha.clone()) else {
            return;
        };
        if let Some(req) = self.state.select_commit(&sha) {
            self.detail_scroll = 0;
            self.focus = FocusArea::Detail;
            self.dispatch(Request::Detail(req));
        }
    }

    /// Moves the commit cursor down, fetching the next page when it would
    /// run off the end of what is loaded.
    pub fn next_commit(&mut self) {
        let len = self.state.commits().len();
        if self.commit_index + 1 < len {
            self.commit_index += 1;
        } else {
            self.load_more_commits();
        }
    }

    pub fn load_more_commits(&mut self) {
        if let Some(req) = self.state.load_more_commits() {
            self.dispatch(Request::Commits(req));
        }
    }

    pub fn retry(&mut self) {
        if let Some(request) = self.state.retry() {
            self.dispatch(request);
        }
    }

    pub fn favorite_entries(&self) -> Vec<FavoriteEntry> {
        let mut entries: Vec<FavoriteEntry> = self
            .favorites
            .list_favorite_records()
            .into_iter()
            .map(FavoriteEntry::Record)
            .collect();
        entries.extend(
            self.favorites
                .list_favorite_ids()
                .into_iter()
                .filter(|id| self.favorites.get_favorite_record(id).is_none())
                .map(FavoriteEntry::BareId),
        );
        entries
    }

    /// Toggles the commit under the cursor. In the history view a fresh
    /// record is captured from the loaded commit; in the favorites view the
    /// entry is simply removed.
    pub fn toggle_favorite(&mut self) {
        match self.tab {
            CommitTab::History => {
                let (Some(owner), Some(repository)) = (self.state.username(), self.state.selected_repository()) else {
                    return;
                };
                let commit = if self.focus == FocusArea::Detail {
                    // The list entry stands in while the detail is loading
                    self.state.commit_detail().map(|d| &d.commit).or_else(|| self.state.selected_commit_summary())
                } else {
                    self.highlighted_commit()
                };
                let Some(commit) = commit else {
                    return;
                };
                let record = commit.to_favorite_record(owner, repository);
                let sha = commit.sha.clone();
                let now_favorite = self.favorites.toggle_favorite(&sha, Some(record));
                tracing::info!("Favorite {} {}", sha, if now_favorite { "added" } else { "removed" });
            }
            CommitTab::Favorites => {
                let entries = self.favorite_entries();
                if let Some(entry) = entries.get(self.favorite_index) {
                    self.favorites.remove_favorite(entry.id());
                }
                self.favorite_index = self.favorite_index.min(self.favorites.len().saturating_sub(1));
            }
        }
        self.status = self.favorites.last_warning().map(|w| format!("Favorites not saved: {}", w));
    }

    pub fn selected_url(&self) -> Option<String> {
        match self.tab {
            CommitTab::History => self
                .state
                .commit_detail()
                .map(|d| d.commit.html_url.clone())
                .or_else(|| self.highlighted_commit().map(|c| c.html_url.clone()))
                .filter(|url| !url.is_empty()),
            CommitTab::Favorites => match self.favorite_entries().get(self.favorite_index) {
                Some(FavoriteEntry::Record(record)) => Some(record.external_url.clone()),
                _ => None,
            },
        }
    }

    /// Text shown in the detail pane for the current tab, if any.
    pub fn detail_text(&self) -> Option<String> {
        match self.tab {
            CommitTab::History => self.state.commit_detail().map(commit_detail_text),
            CommitTab::Favorites => match self.favorite_entries().get(self.favorite_index)? {
                FavoriteEntry::Record(record) => Some(favorite_record_text(record)),
                FavoriteEntry::BareId(id) => Some(format!(
                    "commit {}\n\nNo cached details for this bookmark.\nIt is filled in the next time its repository is opened.\n",
                    id
                )),
            },
        }
    }

    pub fn copy_selected_url(&mut self) {
        let Some(url) = self.selected_url() else {
            self.status = Some("Nothing to copy".to_string());
            return;
        };
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.clone()));
        self.status = Some(match result {
            Ok(()) => format!("Copied {}", url),
            Err(e) => format!("Clipboard unavailable: {}", e),
        });
    }

    /// Steps one level back up the drill-down.
    pub fn back(&mut self) {
        self.status = None;
        match self.focus {
            FocusArea::Detail => {
                self.state.clear_commit_selection();
                self.focus = FocusArea::CommitList;
            }
            FocusArea::CommitList => self.focus = FocusArea::Sidebar,
            FocusArea::Sidebar => self.state.clear_error(),
        }
    }
}

/// Main event loop: applies finished fetches, redraws, handles keys.
pub async fn run(app: &mut App) -> Result<()> {
    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(app, &mut terminal).await;

    terminal::disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
}

async fn event_loop(app: &mut App, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    loop {
        app.drain_outcomes();
        terminal.draw(|f| render_app(f, app))?;

        tokio::time::sleep(Duration::from_millis(50)).await;
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(key.code, app)? {
                    return Ok(());
                }
            }
        }
    }
}
