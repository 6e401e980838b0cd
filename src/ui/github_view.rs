use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use crate::app::App;
use crate::keys::GitHubBox;

pub fn draw_github(f: &mut Frame, area: Rect, app: &App) {
    if app.repo.is_repo == Some(false) {
        let p = Paragraph::new("Not a git repository. Start standup inside a repo.")
            .style(theme::EMPTY_STATE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(38),
            Constraint::Percentage(40),
        ])
        .split(area);

    draw_remotes(f, chunks[0], app);
    draw_pr_list(f, chunks[1], app);
    draw_details(f, chunks[2], app);
}

fn border(app: &App, which: GitHubBox) -> ratatui::style::Style {
    if app.github_box == which {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    }
}

fn draw_remotes(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Remotes ")
        .borders(Borders::ALL)
        .border_style(border(app, GitHubBox::Remotes));

    if app.repo.remotes.is_empty() {
        let message = match &app.repo.error {
            Some(err) => err.as_str(),
            None => "No remotes",
        };
        let p = Paragraph::new(message.to_string())
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .repo
        .remotes
        .iter()
        .map(|remote| {
            let selected = app.repo.selected_remote.as_deref() == Some(remote.name.as_str());
            let marker = if selected { "* " } else { "  " };
            let style = if selected {
                theme::BRANCH_LABEL
            } else {
                theme::LIST_NORMAL
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(remote.name.clone(), style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.remote_index.min(app.repo.remotes.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_pr_list(f: &mut Frame, area: Rect, app: &App) {
    let branch = app.repo.current_branch.as_deref().unwrap_or("?");
    let title = format!(" PRs for {} ", branch);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border(app, GitHubBox::Prs));

    if app.prs.loading_prs && app.prs.prs.is_empty() {
        let p = Paragraph::new("Loading...").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }
    if let Some(err) = &app.prs.prs_error {
        let p = Paragraph::new(err.to_string())
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    if app.prs.prs.is_empty() {
        let message = if app.poll.is_active() {
            "No PRs yet. Watching for the one you're creating..."
        } else {
            "No open PRs for this branch. Press n to create one."
        };
        let p = Paragraph::new(message).style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .prs
        .prs
        .iter()
        .map(|pr| {
            let state_style = if pr.is_draft {
                theme::PR_DRAFT
            } else {
                theme::LIST_NORMAL
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{} ", pr.number), state_style.add_modifier(Modifier::BOLD)),
                Span::styled(pr.title.clone(), state_style),
            ]))
        })
        .collect();

    let selected = app
        .prs
        .selected_number()
        .and_then(|n| app.prs.prs.iter().position(|pr| pr.number == n));
    let mut state = ListState::default();
    state.select(selected);
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_details(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.prs.selected_number() {
        Some(number) => format!(" PR #{} ", number),
        None => " Details ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border(app, GitHubBox::Details));

    let detail = match &app.prs.details {
        Some(d) => d,
        None => {
            let message = if app.prs.loading_details {
                "Loading...".to_string()
            } else if let Some(err) = &app.prs.details_error {
                err.to_string()
            } else {
                "Select a PR to view details".to_string()
            };
            let p = Paragraph::new(message)
                .style(theme::EMPTY_STATE)
                .block(block)
                .wrap(Wrap { trim: false });
            f.render_widget(p, area);
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let review_style = match detail.review_decision.as_deref() {
        Some("APPROVED") => theme::PR_APPROVED,
        Some("CHANGES_REQUESTED") => theme::PR_CHANGES_REQUESTED,
        _ => theme::PR_PENDING_REVIEW,
    };

    let bold = theme::LIST_NORMAL.add_modifier(Modifier::BOLD);
    let mut status_spans = vec![
        Span::styled(format!("{} ", detail.review_icon()), review_style),
        Span::styled(
            format!("+{} -{} ({})", detail.additions, detail.deletions, detail.size_label()),
            theme::PR_SIZE,
        ),
    ];
    if detail.state != "OPEN" {
        status_spans.push(Span::styled(
            format!("  [{}]", detail.state),
            theme::EMPTY_STATE,
        ));
    }
    if detail.mergeable.as_deref() == Some("CONFLICTING") {
        status_spans.push(Span::styled("  conflicts", theme::PR_CHANGES_REQUESTED));
    }
    let author = match detail.author.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{} ({})", name, detail.author.login),
        _ => detail.author.login.clone(),
    };
    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled(detail.title.clone(), bold),
            Span::raw(if detail.is_draft { "  [draft]" } else { "" }),
        ]),
        Line::from(status_spans),
        Line::from(vec![
            Span::styled("Branch: ", bold),
            Span::raw(format!("{} -> {}", detail.head_ref_name, detail.base_ref_name)),
        ]),
        Line::from(vec![Span::styled("Author: ", bold), Span::raw(author)]),
    ];
    if !detail.labels.is_empty() {
        let labels: Vec<String> = detail.labels.iter().map(|l| l.name.clone()).collect();
        lines.push(Line::from(vec![
            Span::styled("Labels: ", bold),
            Span::raw(labels.join(", ")),
        ]));
    }
    lines.push(Line::from(""));
    match detail.body.as_deref() {
        Some(body) if !body.is_empty() => {
            for line in body.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        _ => lines.push(Line::from(Span::styled("No description", theme::EMPTY_STATE))),
    }

    let inner_height = inner.height as usize;
    let scroll = app.details_scroll.min(lines.len().saturating_sub(inner_height));
    let end = (scroll + inner_height).min(lines.len());
    let visible: Vec<Line> = lines[scroll..end].to_vec();
    f.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), inner);
}
