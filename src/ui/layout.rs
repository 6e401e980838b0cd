use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::{
    browser_view, github_view, help_overlay, jira_view, logs_view, pr_list_view, tabs, theme,
};
use crate::app::App;
use crate::keys::{self, ActiveView};

pub fn draw_layout(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    tabs::draw_tab_bar(f, chunks[0], app);
    draw_content(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    if app.show_help {
        help_overlay::draw_help(f, f.area());
    }
}

fn draw_content(f: &mut Frame, area: Rect, app: &App) {
    match app.active_view {
        ActiveView::GitHub => github_view::draw_github(f, area, app),
        ActiveView::Jira => jira_view::draw_jira(f, area, app),
        ActiveView::Logs => logs_view::draw_logs(f, area, app),
        ActiveView::JiraBrowser => browser_view::draw_browser(f, area, app),
        ActiveView::PullRequests => pr_list_view::draw_pr_list(f, area, app),
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut left_spans: Vec<Span> = Vec::new();

    if let Some((message, _)) = &app.duck_message {
        left_spans.push(Span::styled(format!(" <o) {} ", message), theme::DUCK));
    } else if let Some(err) = &app.last_error {
        left_spans.push(Span::styled(format!(" ERR: {} ", err), theme::STATUS_ERROR));
    }

    // Contextual key hints from the focus state, right-aligned.
    let bindings =
        keys::bindings_with_globals(app.active_view, &app.view_key_state(), app.modal_open());
    let mut hint_spans: Vec<Span> = Vec::new();
    for (i, binding) in bindings.iter().enumerate() {
        if i > 0 {
            hint_spans.push(Span::styled("  ", theme::STATUS_BAR));
        }
        let key_style = match binding.color {
            Some(color) => theme::HINT_KEY.fg(color),
            None => theme::HINT_KEY,
        };
        hint_spans.push(Span::styled(binding.key, key_style));
        hint_spans.push(Span::styled(":", theme::HINT_DESC));
        hint_spans.push(Span::styled(binding.label, theme::HINT_DESC));
    }
    hint_spans.push(Span::styled(" ", theme::STATUS_BAR));

    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let hint_width: usize = hint_spans.iter().map(|s| s.width()).sum();
    let gap = (area.width as usize).saturating_sub(left_width + hint_width);

    let mut spans = left_spans;
    spans.push(Span::styled(" ".repeat(gap), theme::STATUS_BAR));
    spans.extend(hint_spans);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
