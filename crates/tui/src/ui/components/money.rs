use api_types::Region;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Formats an amount in the region's currency: symbol prefix, thousands
/// grouping, two decimals, minus sign before the symbol.
#[must_use]
pub fn format_currency(amount: f64, region: Region) -> String {
    let negative = amount < 0.0;
    let value = amount.abs();
    let mut whole = value.trunc() as i64;
    let mut cents = (value.fract() * 100.0).round() as i64;
    if cents >= 100 {
        whole += 1;
        cents -= 100;
    }

    let sign = if negative { "-" } else { "" };
    let symbol = region.currency_symbol();
    format!("{sign}{symbol}{}.{cents:02}", group_thousands(whole))
}

fn group_thousands(mut value: i64) -> String {
    let mut groups = Vec::new();
    loop {
        let rest = value / 1000;
        if rest == 0 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value = rest;
    }
    groups.reverse();
    groups.join(",")
}

/// Gain/loss amount with semantic coloring: green when non-negative,
/// red otherwise.
#[must_use]
pub fn styled_gain(amount: f64, region: Region, theme: &Theme) -> Span<'static> {
    let color = if amount >= 0.0 {
        theme.positive
    } else {
        theme.negative
    };
    Span::styled(
        format_currency(amount, region),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Percentage change as `▲ +2.3%` (green) or `▼ -1.5%` (red).
#[must_use]
pub fn styled_percentage(change: f64, theme: &Theme) -> Span<'static> {
    let (arrow, color) = if change >= 0.0 {
        ("▲", theme.positive)
    } else {
        ("▼", theme.negative)
    };
    let sign = if change >= 0.0 { "+" } else { "" };
    Span::styled(
        format!("{arrow} {sign}{change:.2}%"),
        Style::default().fg(color),
    )
}
