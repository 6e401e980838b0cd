use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use crate::app::App;
use crate::keys::LogsBox;

pub fn draw_logs(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    draw_history(f, chunks[0], app);
    draw_viewer(f, chunks[1], app);
}

fn draw_history(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.logs_box == LogsBox::History {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };
    let block = Block::default()
        .title(" Days ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.log_days.is_empty() {
        let p = Paragraph::new("No log entries yet.")
            .style(theme::EMPTY_STATE)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .log_days
        .iter()
        .map(|day| ListItem::new(Line::from(Span::styled(day.clone(), theme::LIST_NORMAL))))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.log_index.min(app.log_days.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_viewer(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.logs_box == LogsBox::Viewer {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };
    let title = app
        .log_days
        .get(app.log_index)
        .map(|day| format!(" {} ", day))
        .unwrap_or_else(|| " Log ".to_string());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let content = match &app.log_content {
        Some(content) => content,
        None => {
            let p = Paragraph::new("Select a day to view its log.")
                .style(theme::EMPTY_STATE)
                .block(block);
            f.render_widget(p, area);
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = content.lines().map(|l| Line::from(l.to_string())).collect();
    let inner_height = inner.height as usize;
    let scroll = app.log_scroll.min(lines.len().saturating_sub(inner_height));
    let end = (scroll + inner_height).min(lines.len());
    let visible: Vec<Line> = lines[scroll..end].to_vec();
    f.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), inner);
}
