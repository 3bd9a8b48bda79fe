use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use api_types::entry::InstrumentDetail;

use crate::{
    app::AppState,
    ui::{components::money::format_currency, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let funds = state.projection.mutual_funds();
    let block = Block::default().borders(Borders::ALL).title("Mutual Funds");

    if funds.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from("No mutual fund entries in this region."))
                .style(Style::default().fg(theme.dim))
                .block(block),
            area,
        );
        return;
    }

    let items = funds
        .iter()
        .map(|entry| {
            let (units, nav, amount, category) = match &entry.detail {
                InstrumentDetail::MutualFund {
                    units,
                    nav,
                    amount,
                    category,
                } => (*units, *nav, *amount, category.label()),
                InstrumentDetail::Stock { .. } => (0.0, 0.0, 0.0, ""),
            };
            let op = entry.operation.label();
            let nav = format_currency(nav, state.region);
            let amount = format_currency(amount, state.region);
            let date = entry.created_at.format("%d %b %Y").to_string();

            let text = format!(
                "{date}  {op:<5} {name:<20} {category:<8} {units:>10.3} @ {nav:<12} {amount}",
                name = entry.name
            );
            ListItem::new(Line::from(text))
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}
