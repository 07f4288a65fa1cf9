use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub selection_fg: Color,

    // Specific components
    pub commit_hash: Style,
    pub commit_datetime: Style,
    pub commit_author: Style,
    pub favorite_marker: Style,
    pub repo_name: Style,
    pub repo_meta: Style,
    pub file_added: Style,
    pub file_removed: Style,
    pub error_banner: Style,
    pub warning: Style,
    pub loading: Style,
    pub footer: Style,
    pub popup_title: Style,
    pub popup_border: Style,
    pub popup_text: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,
            selection_fg: Color::Yellow,

            commit_hash: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            commit_datetime: Style::default().fg(Color::Magenta),
            commit_author: Style::default().fg(Color::Green),
            favorite_marker: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            repo_name: Style::default().fg(Color::Cyan),
            repo_meta: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            file_added: Style::default().fg(Color::Green),
            file_removed: Style::default().fg(Color::Red),
            error_banner: Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
            warning: Style::default().fg(Color::Yellow),
            loading: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            popup_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            popup_border: Style::default().bg(Color::Black),
            popup_text: Style::default().fg(Color::White),
        }
    }
}
