// Screen layout: zone arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Navigation (1 row)                                |
// +--------------------------------------------------+
// | Banner (1 row)                                    |
// +--------------------------------------------------+
// | Main Panel (fill)                                 |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Signed-in user, role, subscription state and unread counter.
    pub status_bar: Rect,
    /// Routes reachable from here, with their number keys.
    pub nav: Rect,
    /// Last info/success/warning/error message.
    pub banner: Rect,
    /// The active route's view.
    pub main: Rect,
    /// Keyboard shortcut hints for the active route.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // navigation
            Constraint::Length(1), // banner
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        nav: vertical[1],
        banner: vertical[2],
        main: vertical[3],
        help_bar: vertical[4],
    }
}

/// Split the main panel into a list (left) and a detail pane (right).
pub fn split_main(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (horizontal[0], horizontal[1])
}
