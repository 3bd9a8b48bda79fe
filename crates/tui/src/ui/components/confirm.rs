use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{app::PendingDelete, ui::theme::Theme};

/// Centered yes/no overlay for a pending entry deletion.
pub fn render(frame: &mut Frame<'_>, area: Rect, pending: Option<&PendingDelete>, theme: &Theme) {
    let Some(pending) = pending else {
        return;
    };

    let width = (pending.name.len() as u16 + 20).clamp(34, area.width);
    let height = 5u16;
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height: height.min(area.height),
    };

    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(" delete entry ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.error));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let lines = vec![
        Line::from(Span::styled(
            format!("Delete \"{}\"?", pending.name),
            Style::default().fg(theme.text),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::styled(" confirm   ", Style::default().fg(theme.dim)),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::styled(" cancel", Style::default().fg(theme.dim)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}
