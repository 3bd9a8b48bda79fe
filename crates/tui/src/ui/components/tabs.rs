use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{app::View, ui::theme::Theme};

/// Horizontal tab bar over the three portfolio views.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: View, theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];

    for (i, view) in View::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }

        let label = view.label();
        if view == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.dim)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn tab_shortcuts(theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled("d", Style::default().fg(theme.accent)),
        Span::raw("/"),
        Span::styled("s", Style::default().fg(theme.accent)),
        Span::raw("/"),
        Span::styled("m", Style::default().fg(theme.accent)),
        Span::raw(" nav"),
    ]
}
