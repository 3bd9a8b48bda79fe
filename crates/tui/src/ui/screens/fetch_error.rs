use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{app::AppState, ui::theme::Theme};

/// Terminal data-access failure. The raw server message is shown verbatim
/// next to the likely cause (a server-side row-level security policy that
/// denies reads), and the only way forward is re-entering credentials.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let message = match &state.phase {
        crate::app::Phase::FetchErrored(message) => message.as_str(),
        _ => return,
    };

    let box_width = area.width.clamp(20, 64);
    let box_height = 12u16.min(area.height);
    let card_area = super::centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" data access error ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.error));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let lines = vec![
        Line::from(Span::styled(
            "Could not read your entries.",
            Style::default().fg(theme.text),
        )),
        Line::default(),
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme.error))),
        Line::default(),
        Line::from(Span::styled(
            "This usually means the project's row-level security",
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            "policies deny reads for the configured key.",
            Style::default().fg(theme.dim),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("c", Style::default().fg(theme.accent)),
            Span::styled(" reset credentials   ", Style::default().fg(theme.dim)),
            Span::styled("l", Style::default().fg(theme.accent)),
            Span::styled(" logout", Style::default().fg(theme.dim)),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}
