use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme;
use crate::app::App;
use crate::keys::ALL_VIEWS;

pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (i, view) in ALL_VIEWS.iter().enumerate() {
        let label = format!(" {}:{} ", i + 1, view.title());
        let style = if *view == app.active_view {
            theme::TAB_ACTIVE
        } else {
            theme::TAB_INACTIVE
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    // Branch and version on the right
    let mut right = String::new();
    if let Some(branch) = &app.repo.current_branch {
        right.push_str(&format!("[{}] ", branch));
    }
    right.push_str(&format!("standup v{}", env!("CARGO_PKG_VERSION")));

    let tabs_width: usize = spans.iter().map(|s| s.width()).sum();
    let pad = (area.width as usize).saturating_sub(tabs_width + right.as_str().width());
    if pad > 0 {
        spans.push(Span::raw(" ".repeat(pad)));
    }
    spans.push(Span::styled(right, theme::STATUS_BAR));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
