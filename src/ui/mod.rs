pub mod browser_view;
pub mod github_view;
pub mod help_overlay;
pub mod jira_view;
pub mod layout;
pub mod logs_view;
pub mod pr_list_view;
pub mod tabs;
pub mod theme;
pub mod util;

use ratatui::Frame;

use crate::app::App;

/// Main draw dispatcher.
pub fn draw(f: &mut Frame, app: &App) {
    layout::draw_layout(f, app);
}
