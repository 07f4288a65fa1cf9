use anyhow::Result;
use crossterm::event::KeyCode;

use crate::app::App;
use crate::models::{CommitTab, FocusArea, InputPrompt, InputTarget};
use crate::utils::{calculate_max_scroll, get_detail_height};

/// Handles one key press. Returns `Ok(false)` when the app should quit.
pub fn handle_key(key: KeyCode, app: &mut App) -> Result<bool> {
    if app.prompt.visible {
        handle_prompt_key(key, app);
        return Ok(true);
    }

    match key {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('u') => {
            let current = app.state.username().unwrap_or_default().to_string();
            app.prompt = InputPrompt { visible: true, target: InputTarget::Username, buffer: current };
        }
        KeyCode::Char('/') => {
            let current = app.state.filter().to_string();
            app.prompt = InputPrompt { visible: true, target: InputTarget::Filter, buffer: current };
            app.focus = FocusArea::Sidebar;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            // Only two tabs, so both directions just flip
            app.tab = match app.tab {
                CommitTab::History => CommitTab::Favorites,
                CommitTab::Favorites => CommitTab::History,
            };
            app.favorite_index = 0;
            if app.tab == CommitTab::Favorites && app.focus == FocusArea::Sidebar {
                app.focus = FocusArea::CommitList;
            }
        }
        KeyCode::Char('1') => app.focus = FocusArea::Sidebar,
        KeyCode::Char('2') => app.focus = FocusArea::CommitList,
        KeyCode::Char('3') => app.focus = FocusArea::Detail,
        KeyCode::Up | KeyCode::Char('k') => move_up(app),
        KeyCode::Down | KeyCode::Char('j') => move_down(app),
        KeyCode::Left | KeyCode::Char('h') => {
            app.focus = match app.focus {
                FocusArea::Sidebar => FocusArea::Sidebar,
                FocusArea::CommitList => FocusArea::Sidebar,
                FocusArea::Detail => FocusArea::CommitList,
            };
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.focus = match app.focus {
                FocusArea::Sidebar => FocusArea::CommitList,
                FocusArea::CommitList | FocusArea::Detail => FocusArea::Detail,
            };
        }
        KeyCode::Enter => match (app.focus, app.tab) {
            (FocusArea::Sidebar, _) => app.open_highlighted_repository(),
            (FocusArea::CommitList, CommitTab::History) => app.open_highlighted_commit(),
            (FocusArea::CommitList, CommitTab::Favorites) => app.focus = FocusArea::Detail,
            (FocusArea::Detail, _) => {}
        },
        KeyCode::Char('f') | KeyCode::Char(' ') => app.toggle_favorite(),
        KeyCode::Char('n') => app.load_more_commits(),
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('y') => app.copy_selected_url(),
        KeyCode::Esc | KeyCode::Backspace => app.back(),
        _ => {}
    }
    Ok(true)
}

fn handle_prompt_key(key: KeyCode, app: &mut App) {
    match key {
        KeyCode::Esc => {
            if app.prompt.target == InputTarget::Filter {
                app.set_filter("");
            }
            app.prompt.visible = false;
        }
        KeyCode::Enter => {
            app.prompt.visible = false;
            if app.prompt.target == InputTarget::Username {
                let username = std::mem::take(&mut app.prompt.buffer);
                app.enter_username(&username);
            }
        }
        KeyCode::Backspace => {
            app.prompt.buffer.pop();
            sync_filter(app);
        }
        KeyCode::Char(c) => {
            app.prompt.buffer.push(c);
            sync_filter(app);
        }
        _ => {}
    }
}

// The repository list narrows on every keystroke
fn sync_filter(app: &mut App) {
    if app.prompt.target == InputTarget::Filter {
        let query = app.prompt.buffer.clone();
        app.set_filter(&query);
    }
}

fn move_up(app: &mut App) {
    match (app.focus, app.tab) {
        (FocusArea::Sidebar, _) => app.repo_index = app.repo_index.saturating_sub(1),
        (FocusArea::CommitList, CommitTab::History) => app.commit_index = app.commit_index.saturating_sub(1),
        (FocusArea::CommitList, CommitTab::Favorites) => app.favorite_index = app.favorite_index.saturating_sub(1),
        (FocusArea::Detail, _) => app.detail_scroll = app.detail_scroll.saturating_sub(1),
    }
}

fn move_down(app: &mut App) {
    match (app.focus, app.tab) {
        (FocusArea::Sidebar, _) => {
            if app.repo_index + 1 < app.state.filtered_repositories().len() {
                app.repo_index += 1;
            }
        }
        (FocusArea::CommitList, CommitTab::History) => app.next_commit(),
        (FocusArea::CommitList, CommitTab::Favorites) => {
            if app.favorite_index + 1 < app.favorites.len() {
                app.favorite_index += 1;
            }
        }
        (FocusArea::Detail, _) => {
            let Some(text) = app.detail_text() else {
                return;
            };
            let height = get_detail_height().unwrap_or(15);
            if app.detail_scroll < calculate_max_scroll(&text, height) {
                app.detail_scroll += 1;
            }
        }
    }
}
