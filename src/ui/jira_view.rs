use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::{theme, util};
use crate::app::{App, JiraConfigField, JiraModal};
use crate::error::ErrorKind;

pub fn draw_jira(f: &mut Frame, area: Rect, app: &App) {
    draw_linked_tickets(f, area, app);

    match &app.jira_modal {
        Some(JiraModal::Configure {
            field,
            site_url,
            email,
            api_token,
            checking,
            error,
        }) => draw_configure_modal(f, area, *field, site_url, email, api_token, *checking, error),
        Some(JiraModal::LinkTicket { input }) => draw_link_modal(f, area, input),
        Some(JiraModal::Transitions {
            issue_key,
            transitions,
            loading,
            ..
        }) => draw_transitions_popup(f, area, issue_key, transitions, *loading),
        Some(JiraModal::ConfirmRemoveConfig) => draw_confirm_remove(f, area),
        None => {}
    }
}

fn draw_linked_tickets(f: &mut Frame, area: Rect, app: &App) {
    let branch = app.repo.current_branch.as_deref().unwrap_or("?");
    let block = Block::default()
        .title(format!(" Tickets linked to {} ", branch))
        .borders(Borders::ALL)
        .border_style(theme::BORDER_ACTIVE);

    if app.jira_auth.is_none() {
        let p = Paragraph::new("Jira is not configured. Press c to add your site and token.")
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    if app.linked_loading && app.linked_tickets.is_empty() {
        let p = Paragraph::new("Loading...").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }
    if let Some(err) = &app.linked_error {
        let mut lines = vec![Line::from(err.to_string())];
        if matches!(err.kind, ErrorKind::AuthError | ErrorKind::NotAuthenticated) {
            lines.push(Line::from(""));
            lines.push(Line::from("Press R to remove the config, then c to reconfigure."));
        }
        let p = Paragraph::new(lines)
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    if app.linked_tickets.is_empty() {
        let p = Paragraph::new("No tickets linked to this branch. Press t to link one.")
            .style(theme::EMPTY_STATE)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .linked_tickets
        .iter()
        .map(|issue| {
            let type_style = match issue.issue_type.as_deref().unwrap_or("").to_lowercase().as_str()
            {
                "bug" => theme::JIRA_BUG,
                "story" => theme::JIRA_STORY,
                "task" => theme::JIRA_TASK,
                _ => theme::LIST_NORMAL,
            };
            let status_style = match issue.status.as_str() {
                "In Progress" | "In Review" => theme::JIRA_IN_PROGRESS,
                "Done" | "Closed" => theme::JIRA_DONE,
                _ => theme::JIRA_TODO,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", issue.type_icon()), type_style),
                Span::styled(
                    issue.key.clone(),
                    theme::LIST_NORMAL.add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(format!("({}) ", issue.status), status_style),
                Span::styled(issue.summary.clone(), theme::LIST_NORMAL),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.linked_index.min(app.linked_tickets.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

#[allow(clippy::too_many_arguments)]
fn draw_configure_modal(
    f: &mut Frame,
    area: Rect,
    field: JiraConfigField,
    site_url: &str,
    email: &str,
    api_token: &str,
    checking: bool,
    error: &Option<String>,
) {
    let popup = util::centered_rect(area, 60, 11);
    f.render_widget(Clear, popup);

    let field_line = |label: &str, value: &str, active: bool, mask: bool| {
        let style = if active {
            theme::FIELD_ACTIVE
        } else {
            theme::FIELD_INACTIVE
        };
        let shown = if mask {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}{}", shown, cursor), style),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field_line("Site URL", site_url, field == JiraConfigField::SiteUrl, false),
        field_line("Email", email, field == JiraConfigField::Email, false),
        field_line("API token", api_token, field == JiraConfigField::ApiToken, true),
        Line::from(""),
    ];
    if checking {
        lines.push(Line::from(Span::styled(
            "  Checking credentials...",
            theme::EMPTY_STATE,
        )));
    } else if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            theme::PR_CHANGES_REQUESTED,
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  Tab: next field   Enter: save   Esc: cancel",
            theme::EMPTY_STATE,
        )));
    }

    let block = Block::default()
        .title(" Configure Jira ")
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_link_modal(f: &mut Frame, area: Rect, input: &str) {
    let popup = util::centered_rect(area, 44, 5);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Key: ", theme::SEARCH_INPUT.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}_", input), theme::SEARCH_INPUT),
        ]),
    ];
    let block = Block::default()
        .title(" Link Ticket ")
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_transitions_popup(
    f: &mut Frame,
    area: Rect,
    issue_key: &str,
    transitions: &[crate::model::jira::Transition],
    loading: bool,
) {
    let height = (transitions.len() as u16 + 4).max(5);
    let popup = util::centered_rect(area, 40, height);
    f.render_widget(Clear, popup);

    let mut lines = vec![Line::from("")];
    if loading {
        lines.push(Line::from(Span::styled("  Loading...", theme::EMPTY_STATE)));
    } else {
        for (i, transition) in transitions.iter().enumerate() {
            lines.push(Line::from(format!("  {}. {}", i + 1, transition.name)));
        }
    }

    let block = Block::default()
        .title(format!(" Move {} ", issue_key))
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_confirm_remove(f: &mut Frame, area: Rect) {
    let popup = util::centered_rect(area, 50, 5);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Remove the Jira configuration?",
            theme::PR_CHANGES_REQUESTED.add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  y", theme::HELP_KEY),
            Span::raw(" yes  "),
            Span::styled("n", theme::HELP_KEY),
            Span::raw(" no"),
        ]),
    ];
    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(theme::PR_CHANGES_REQUESTED)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}
