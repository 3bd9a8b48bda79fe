use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, CredentialsField},
    ui::theme::Theme,
};

/// The connection gate: endpoint and key, nothing else is reachable
/// until they validate.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let box_width = 52;
    let box_height = 8;
    let card_area = super::centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" connect ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Endpoint label + value
            Constraint::Length(1),
            Constraint::Length(1), // Key label + value
            Constraint::Length(1),
            Constraint::Length(1), // Hint
        ])
        .margin(1)
        .split(inner);

    let form = &state.credentials_form;
    render_input(
        frame,
        rows[0],
        "endpoint",
        &form.endpoint,
        false,
        form.focus == CredentialsField::Endpoint,
        theme,
    );
    render_input(
        frame,
        rows[2],
        "key     ",
        &form.key,
        true,
        form.focus == CredentialsField::Key,
        theme,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Tab next · Enter connect",
            Style::default().fg(theme.dim),
        )),
        rows[4],
    );

    if let Some(message) = &form.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area,
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    masked: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let shown = if masked {
        "•".repeat(value.len())
    } else {
        value.to_string()
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(format!("{label} {shown}{cursor}"), style)),
        area,
    );
}
