use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::{app::AppState, ui::theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let rect = super::centered_box(40, 1, area);
    let who = state
        .session
        .as_ref()
        .map(|session| session.username.as_str())
        .unwrap_or("...");
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Loading portfolio for {who}..."),
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        rect,
    );
}
