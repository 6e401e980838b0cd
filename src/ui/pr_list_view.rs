use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use crate::app::App;

pub fn draw_pr_list(f: &mut Frame, area: Rect, app: &App) {
    let slug = app.repo.current_repo_slug().unwrap_or_else(|| "?".into());
    let block = Block::default()
        .title(format!(" Open PRs on {} ", slug))
        .borders(Borders::ALL)
        .border_style(theme::BORDER_ACTIVE);

    if app.all_prs_loading && app.all_prs.is_empty() {
        let p = Paragraph::new("Loading...").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }
    if let Some(err) = &app.all_prs_error {
        let p = Paragraph::new(err.to_string())
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    if app.all_prs.is_empty() {
        let p = Paragraph::new("No open PRs.").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .all_prs
        .iter()
        .map(|pr| {
            let style = if pr.is_draft {
                theme::PR_DRAFT
            } else {
                theme::LIST_NORMAL
            };
            let opened = pr.created_at.get(..10).unwrap_or(&pr.created_at);
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<5} ", pr.number), style.add_modifier(Modifier::BOLD)),
                Span::styled(pr.title.clone(), style),
                Span::styled(
                    format!("  {} <- {}", pr.base_ref_name, pr.head_ref_name),
                    theme::EMPTY_STATE,
                ),
                Span::styled(format!("  @{}", pr.author.login), theme::EMPTY_STATE),
                Span::styled(format!("  {}", opened), theme::EMPTY_STATE),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.all_prs_index.min(app.all_prs.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}
