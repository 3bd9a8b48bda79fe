pub mod credentials;
pub mod dashboard;
pub mod fetch_error;
pub mod loading;
pub mod login;
pub mod mutual_funds;
pub mod stocks;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Calculates a centered rect for form boxes.
pub(crate) fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
