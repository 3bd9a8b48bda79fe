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
    let stocks = state.projection.stocks();
    let block = Block::default().borders(Borders::ALL).title("Stocks");

    if stocks.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from("No stock entries in this region."))
                .style(Style::default().fg(theme.dim))
                .block(block),
            area,
        );
        return;
    }

    let items = stocks
        .iter()
        .map(|entry| {
            let (price, quantity) = match entry.detail {
                InstrumentDetail::Stock { price, quantity } => (price, quantity),
                InstrumentDetail::MutualFund { .. } => (0.0, 0.0),
            };
            let op = entry.operation.label();
            let value = format_currency(price * quantity, state.region);
            let price = format_currency(price, state.region);
            let date = entry.created_at.format("%d %b %Y").to_string();

            let text = format!(
                "{date}  {op:<5} {name:<20} {quantity:>10.2} @ {price:<12} {value}",
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
