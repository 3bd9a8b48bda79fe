use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::StatCard,
            money::{format_currency, styled_gain, styled_percentage},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let metrics = state.projection.metrics();
    let region = state.region;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Headline totals
            Constraint::Length(4), // Stock / MF split
            Constraint::Min(0),    // Footer
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(layout[0]);

    StatCard::new(
        "Total Invested",
        format_currency(metrics.total_invested, region),
        theme,
    )
    .render(frame, top[0]);

    StatCard::new(
        "Current Value",
        format_currency(metrics.current_value, region),
        theme,
    )
    .render(frame, top[1]);

    StatCard::styled_value("Gain / Loss", styled_gain(metrics.gain_loss, region, theme), theme)
        .subtitle(styled_percentage(metrics.gain_loss_pct, theme))
        .render(frame, top[2]);

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(layout[1]);

    StatCard::new(
        "Stocks",
        format_currency(metrics.stock_value, region),
        theme,
    )
    .subtitle(Span::styled(
        format!(
            "invested {} · {} positions",
            format_currency(metrics.stock_invested, region),
            metrics.stocks.len()
        ),
        Style::default().fg(theme.dim),
    ))
    .render(frame, split[0]);

    StatCard::new(
        "Mutual Funds",
        format_currency(metrics.mf_value, region),
        theme,
    )
    .subtitle(Span::styled(
        format!(
            "invested {} · {} positions",
            format_currency(metrics.mf_invested, region),
            metrics.mutual_funds.len()
        ),
        Style::default().fg(theme.dim),
    ))
    .render(frame, split[1]);

    if state.projection.filtered().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("No entries in {} yet.", region.label()),
                Style::default().fg(theme.dim),
            )),
            layout[2],
        );
    }
}
