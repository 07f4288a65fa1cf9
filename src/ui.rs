use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::{App, FavoriteEntry};
use crate::models::{CommitTab, FocusArea, InputTarget};
use crate::state::ProfileState;
use crate::utils::relative_time;

// Below this width only the focused pane is shown
const STACKED_WIDTH: u16 = 100;

pub fn render_app(f: &mut Frame, app: &App) {
    let area = f.area();
    let banner = app.state.error().is_some() && !matches!(app.state.profile(), ProfileState::Error(_));
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(if banner { 1 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(area);

    match app.state.profile() {
        ProfileState::Idle => render_welcome(f, app, vertical_chunks[0]),
        ProfileState::Error(message) => render_full_error(f, app, message, vertical_chunks[0]),
        ProfileState::Loading | ProfileState::Ready { .. } => render_panes(f, app, vertical_chunks[0]),
    }

    if banner {
        if let Some(message) = app.state.error() {
            let line = Paragraph::new(format!(" {}  (r=retry, Esc=dismiss)", message)).style(app.theme.error_banner);
            f.render_widget(line, vertical_chunks[1]);
        }
    }
    render_footer(f, app, vertical_chunks[2]);

    if app.prompt.visible {
        render_prompt(f, app, area);
    }
}

fn render_panes(f: &mut Frame, app: &App, area: Rect) {
    if area.width < STACKED_WIDTH {
        // One pane at a time, following the drill-down
        match app.focus {
            FocusArea::Sidebar => render_sidebar(f, app, area),
            FocusArea::CommitList => render_commit_pane(f, app, area),
            FocusArea::Detail => render_detail(f, app, area),
        }
        return;
    }

    let show_detail = app.focus == FocusArea::Detail
        || app.state.selected_commit().is_some()
        || app.tab == CommitTab::Favorites;
    let columns = if show_detail {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32),     // sidebar
                Constraint::Percentage(55), // commit list
                Constraint::Percentage(45), // detail view
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(1)])
            .split(area)
    };

    render_sidebar(f, app, columns[0]);
    render_commit_pane(f, app, columns[1]);
    if columns.len() > 2 {
        render_detail(f, app, columns[2]);
    }
}

fn pane_block<'a>(app: &App, title: String, focused: bool) -> Block<'a> {
    let border = if focused { app.theme.focus_border } else { app.theme.blurred_border };
    let mut style = Style::default().fg(border);
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut items = Vec::new();

    match app.state.profile() {
        ProfileState::Loading => {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("Loading {}…", app.state.username().unwrap_or_default()),
                theme.loading,
            ))));
        }
        ProfileState::Ready { .. } => {
            let repos = app.state.filtered_repositories();
            if repos.is_empty() {
                items.push(ListItem::new(Line::from(Span::styled(
                    "No repositories match. Press / to change the filter",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ))));
            }
            for (i, repo) in repos.iter().enumerate() {
                let selected = app.state.selected_repository() == Some(repo.name.as_str());
                let name_style = if i == app.repo_index {
                    Style::default().fg(theme.selection_fg).add_modifier(Modifier::BOLD)
                } else if selected {
                    theme.repo_name.add_modifier(Modifier::BOLD)
                } else {
                    theme.repo_name
                };
                let mut meta = format!("★ {}", repo.stargazers_count);
                if let Some(language) = &repo.language {
                    meta.push_str(&format!(" · {}", language));
                }
                if repo.fork {
                    meta.push_str(" · fork");
                }
                items.push(ListItem::new(vec![
                    Line::from(Span::styled(repo.name.clone(), name_style)),
                    Line::from(Span::styled(meta, theme.repo_meta)),
                ]));
            }
        }
        _ => {}
    }

    let title = match app.state.user() {
        Some(user) => {
            let shown = app.state.filtered_repositories().len();
            let total = app.state.repositories().len();
            let who = user.name.as_deref().unwrap_or(&user.login);
            if app.state.filter().is_empty() {
                format!("{} · {} repos [1]", who, total)
            } else {
                format!("{} · {}/{} \"{}\" [1]", who, shown, total, app.state.filter())
            }
        }
        None => "Repositories [1]".to_string(),
    };

    let mut state = ListState::default();
    if matches!(app.state.profile(), ProfileState::Ready { .. }) && !app.state.filtered_repositories().is_empty() {
        state.select(Some(app.repo_index));
    }
    let list = List::new(items)
        .block(pane_block(app, title, app.focus == FocusArea::Sidebar))
        .highlight_symbol("→ ");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_commit_pane(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let tab_titles = vec!["History".to_string(), format!("Favorites ({})", app.favorites.len())];
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title("View [Tab]"))
        .style(Style::default().fg(app.theme.text))
        .highlight_style(Style::default().fg(app.theme.selection_fg).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .select(app.tab.as_index())
        .divider(symbols::DOT)
        .padding(" ", " ");
    f.render_widget(tabs, chunks[0]);

    match app.tab {
        CommitTab::History => render_history(f, app, chunks[1]),
        CommitTab::Favorites => render_favorites(f, app, chunks[1]),
    }
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let now = Utc::now();
    let focused = app.focus == FocusArea::CommitList;

    let Some(repository) = app.state.selected_repository() else {
        let hint = Paragraph::new("Select a repository with Enter")
            .style(Style::default().fg(theme.text_secondary))
            .block(pane_block(app, "Commits [2]".to_string(), focused));
        f.render_widget(hint, area);
        return;
    };

    let mut items: Vec<ListItem> = app
        .state
        .commits()
        .iter()
        .map(|commit| {
            let marker = if app.favorites.is_favorite(&commit.sha) { "★" } else { " " };
            let current = app.state.selected_commit() == Some(commit.sha.as_str());
            let summary_style = if current {
                Style::default().fg(theme.selection_fg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", marker), theme.favorite_marker),
                Span::styled(commit.short_sha().to_string(), theme.commit_hash),
                Span::raw(" "),
                Span::styled(format!("{:>10}", relative_time(commit.timestamp(), now)), theme.commit_datetime),
                Span::raw(" "),
                Span::styled(commit.author_display_name(), theme.commit_author),
                Span::raw(" "),
                Span::styled(commit.summary().to_string(), summary_style),
            ]))
        })
        .collect();

    if app.state.commits_loading() {
        items.push(ListItem::new(Line::from(Span::styled("  Loading commits…", theme.loading))));
    } else if app.state.has_more_commits() {
        items.push(ListItem::new(Line::from(Span::styled("  more… (n)", theme.footer))));
    } else if app.state.commits().is_empty() && app.state.error().is_none() {
        items.push(ListItem::new(Line::from(Span::styled("  No commits", theme.footer))));
    }

    let mut state = ListState::default();
    if !app.state.commits().is_empty() {
        state.select(Some(app.commit_index));
    }
    let title = format!("{} · {} commits [2]", repository, app.state.commits().len());
    let list = List::new(items)
        .block(pane_block(app, title, focused))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("→");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_favorites(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let now = Utc::now();
    let entries = app.favorite_entries();

    let mut items: Vec<ListItem> = entries
        .iter()
        .map(|entry| match entry {
            FavoriteEntry::Record(record) => ListItem::new(vec![
                Line::from(vec![
                    Span::styled("★ ", theme.favorite_marker),
                    Span::styled(record.id.get(..7).unwrap_or(&record.id).to_string(), theme.commit_hash),
                    Span::raw(" "),
                    Span::styled(record.summary.clone(), Style::default().fg(theme.text)),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("{}/{}", record.owner_name, record.container_name), theme.repo_name),
                    Span::raw(" · "),
                    Span::styled(record.author_display_name.clone(), theme.commit_author),
                    Span::raw(" · "),
                    Span::styled(relative_time(&record.timestamp, now), theme.commit_datetime),
                ]),
            ]),
            FavoriteEntry::BareId(id) => ListItem::new(vec![
                Line::from(vec![
                    Span::styled("★ ", theme.favorite_marker),
                    Span::styled(id.clone(), theme.commit_hash),
                ]),
                Line::from(Span::styled("  (no cached details)", theme.repo_meta)),
            ]),
        })
        .collect();

    if entries.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "  No favorites yet. Press f on a commit to bookmark it",
            theme.footer,
        ))));
    }

    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(app.favorite_index.min(entries.len() - 1)));
    }
    let title = if app.favorites.is_persistent() {
        "Favorites [2]".to_string()
    } else {
        "Favorites (not saved) [2]".to_string()
    };
    let list = List::new(items)
        .block(pane_block(app, title, app.focus == FocusArea::CommitList))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("→");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == FocusArea::Detail;
    let block = pane_block(app, "Details [3]".to_string(), focused);

    if app.tab == CommitTab::History && app.state.detail_loading() {
        let loading = Paragraph::new("Loading commit…").style(theme.loading).block(block);
        f.render_widget(loading, area);
        return;
    }

    let Some(text) = app.detail_text() else {
        let hint = Paragraph::new("Select a commit with Enter")
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let lines: Vec<Line> = text
        .lines()
        .map(|line| {
            if line.starts_with("commit ") {
                Line::from(Span::styled(line.to_string(), theme.commit_hash))
            } else if line.starts_with("Author:") {
                Line::from(Span::styled(line.to_string(), theme.commit_author))
            } else if line.starts_with("Date:") {
                Line::from(Span::styled(line.to_string(), theme.commit_datetime))
            } else if line.starts_with("A ") {
                Line::from(Span::styled(line.to_string(), theme.file_added))
            } else if line.starts_with("D ") {
                Line::from(Span::styled(line.to_string(), theme.file_removed))
            } else {
                Line::from(Span::raw(line.to_string()))
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_welcome(f: &mut Frame, app: &App, area: Rect) {
    let text = vec![
        Line::from(Span::styled("commitmark", app.theme.popup_title)),
        Line::from(""),
        Line::from("Press u to enter a GitHub username."),
        Line::from(format!("{} favorite commit(s) saved. Press Tab to browse them.", app.favorites.len())),
    ];
    if app.tab == CommitTab::Favorites {
        render_commit_pane(f, app, area);
        return;
    }
    let welcome = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(welcome, area);
}

fn render_full_error(f: &mut Frame, app: &App, message: &str, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Could not load profile", app.theme.error_banner)),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("r = retry · u = different username · q = quit", app.theme.footer)),
    ];
    let error = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
    f.render_widget(error, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = "u=user /=filter Enter=open f=favorite y=copy url n=more r=retry Tab=view Esc=back q=quit";
    let line = match &app.status {
        Some(status) => Line::from(vec![
            Span::styled(status.clone(), app.theme.warning),
            Span::raw("  "),
            Span::styled(hints, app.theme.footer),
        ]),
        None => Line::from(Span::styled(hints, app.theme.footer)),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_prompt(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.prompt.target {
        InputTarget::Username => "GitHub username (Enter=load, Esc=cancel)",
        InputTarget::Filter => "Filter repositories (Enter=keep, Esc=clear)",
    };
    let popup_area = centered_rect(60, 3, area);
    f.render_widget(Clear, popup_area);
    let input = Paragraph::new(format!("{}▏", app.prompt.buffer))
        .style(app.theme.popup_text)
        .block(
            Block::default()
                .title(Span::styled(title, app.theme.popup_title))
                .borders(Borders::ALL)
                .style(app.theme.popup_border),
        );
    f.render_widget(input, popup_area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width,
        height: height.min(r.height),
    }
}
