pub mod components;
pub mod keymap;
pub mod screens;
pub mod theme;

mod terminal;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, Phase, View};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::of(state.theme);
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    match &state.phase {
        Phase::AwaitingCredentials => screens::credentials::render(frame, area, state, &theme),
        Phase::AwaitingAuthentication => screens::login::render(frame, area, state, &theme),
        Phase::Loading => screens::loading::render(frame, area, state, &theme),
        Phase::Ready => render_shell(frame, area, state, &theme),
        Phase::FetchErrored(_) => screens::fetch_error::render(frame, area, state, &theme),
    }

    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    // Main layout: info bar, tabs, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, theme);
    components::tabs::render_tabs(frame, layout[1], state.view, theme);

    match state.view {
        View::Dashboard => screens::dashboard::render(frame, layout[2], state, theme),
        View::Stocks => screens::stocks::render(frame, layout[2], state, theme),
        View::MutualFunds => screens::mutual_funds::render(frame, layout[2], state, theme),
    }

    render_bottom_bar(frame, layout[3], state, theme);
    components::confirm::render(frame, area, state.confirm_delete.as_ref(), theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .session
        .as_ref()
        .map(|session| session.username.as_str())
        .unwrap_or("-");
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let status = state.status.label();
    let status_style = match state.status {
        crate::sync::ConnectivityStatus::Connected => Style::default().fg(theme.positive),
        crate::sync::ConnectivityStatus::Error => Style::default().fg(theme.error),
        _ => Style::default().fg(theme.dim),
    };

    let line = Line::from(vec![
        Span::styled("User", Style::default().fg(theme.dim)),
        Span::styled(format!(": {user}  "), Style::default().fg(theme.text)),
        Span::styled("Region", Style::default().fg(theme.dim)),
        Span::styled(
            format!(": {} ({})  ", state.region.label(), state.region.currency_code()),
            Style::default().fg(theme.text),
        ),
        Span::styled("Refresh", Style::default().fg(theme.dim)),
        Span::styled(format!(": {refresh}  "), Style::default().fg(theme.text)),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    parts.push(Span::styled("g", Style::default().fg(theme.accent)));
    parts.push(Span::styled(" region  ", Style::default().fg(theme.text)));
    parts.push(Span::styled("t", Style::default().fg(theme.accent)));
    parts.push(Span::styled(
        format!(" theme ({})", state.theme.label()),
        Style::default().fg(theme.text),
    ));

    if state.view != View::Dashboard {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.push(Span::styled("j", Style::default().fg(theme.accent)));
        parts.push(Span::styled("/", Style::default().fg(theme.text)));
        parts.push(Span::styled("k", Style::default().fg(theme.accent)));
        parts.push(Span::styled(" select  ", Style::default().fg(theme.text)));
        parts.push(Span::styled("x", Style::default().fg(theme.accent)));
        parts.push(Span::styled(" delete", Style::default().fg(theme.text)));
    }

    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    parts.push(Span::styled("l", Style::default().fg(theme.accent)));
    parts.push(Span::styled(" logout  ", Style::default().fg(theme.text)));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::styled(" quit", Style::default().fg(theme.text)));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
