use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::{theme, util};
use crate::app::{AddViewField, App, BrowserModal};
use crate::keys::BrowserBox;
use crate::state::browser::{AssigneeFilter, BrowserRow};

pub fn draw_browser(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    draw_saved_views(f, chunks[0], app);
    draw_issue_browser(f, chunks[1], app);

    match &app.browser_modal {
        Some(BrowserModal::AddView {
            field,
            name,
            jql_editor,
        }) => draw_add_view_modal(f, area, *field, name, jql_editor),
        Some(BrowserModal::RenameView { name, .. }) => draw_rename_modal(f, area, name),
        Some(BrowserModal::ConfirmDelete { index }) => {
            let name = app
                .saved_views
                .get(*index)
                .map(|v| v.name.as_str())
                .unwrap_or("?");
            draw_confirm_delete(f, area, name);
        }
        None => {}
    }
}

fn draw_saved_views(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.browser_box == BrowserBox::SavedViews {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };
    let block = Block::default()
        .title(" Views ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.saved_views.is_empty() {
        let p = Paragraph::new("No saved views. Press a to add one.")
            .style(theme::EMPTY_STATE)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .saved_views
        .iter()
        .map(|view| {
            let open = app.browser.view.as_ref().map(|v| &v.id) == Some(&view.id);
            let style = if open {
                theme::BRANCH_LABEL
            } else {
                theme::LIST_NORMAL
            };
            ListItem::new(Line::from(Span::styled(view.name.clone(), style)))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.saved_view_index.min(app.saved_views.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::LIST_SELECTED);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_issue_browser(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.browser_box == BrowserBox::Browser {
        theme::BORDER_ACTIVE
    } else {
        theme::BORDER_INACTIVE
    };

    // Search input splits off the bottom while typing.
    let (list_area, search_area) = if app.browser_search_mode {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(area);
        (parts[0], Some(parts[1]))
    } else {
        (area, None)
    };

    let view_name = app
        .browser
        .view
        .as_ref()
        .map(|v| v.name.as_str())
        .unwrap_or("Issues");
    let mut title = format!(" {} ", view_name);
    let mut filters = Vec::new();
    if !app.browser.search_text.is_empty() {
        filters.push(format!("/{}", app.browser.search_text));
    }
    match app.browser.assignee_filter {
        AssigneeFilter::Unassigned => filters.push("unassigned".into()),
        AssigneeFilter::Mine => filters.push("mine".into()),
        AssigneeFilter::All => {}
    }
    if !filters.is_empty() {
        title = format!(" {} [{}] ", view_name, filters.join(", "));
    }

    let footer = format!(
        " {} of {} loaded{} ",
        app.browser.loaded_count(),
        app.browser.total,
        if app.browser.has_more() { ", L for more" } else { "" }
    );
    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(footer).right_aligned())
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.jira_auth.is_none() {
        let p = Paragraph::new("Configure Jira on the Jira view first.")
            .style(theme::EMPTY_STATE)
            .block(block);
        f.render_widget(p, list_area);
        return;
    }
    if app.browser.loading && app.browser.loaded_count() == 0 {
        let p = Paragraph::new("Loading...").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, list_area);
        return;
    }
    if let Some(err) = &app.browser.error {
        if app.browser.loaded_count() == 0 {
            let p = Paragraph::new(err.to_string())
                .style(theme::EMPTY_STATE)
                .block(block)
                .wrap(Wrap { trim: false });
            f.render_widget(p, list_area);
            return;
        }
    }

    let rows = app.browser.rows();
    if rows.is_empty() {
        let p = Paragraph::new("No issues match.").style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, list_area);
    } else {
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match row {
                BrowserRow::Header(text) => {
                    let style = if text.starts_with("Backlog") {
                        theme::SPRINT_BACKLOG
                    } else if text.contains("Sprint") {
                        theme::SPRINT_ACTIVE
                    } else {
                        theme::SPRINT_OTHER
                    };
                    ListItem::new(Line::from(Span::styled(text.clone(), style)))
                }
                BrowserRow::Issue(issue) => {
                    let assignee = issue
                        .assignee
                        .as_ref()
                        .map(|a| a.display_name.as_str())
                        .unwrap_or("-");
                    let mut spans = vec![
                        Span::raw(format!("  [{}] ", issue.type_icon())),
                        Span::styled(
                            issue.key.clone(),
                            theme::LIST_NORMAL.add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(format!(" ({}) ", issue.status), theme::JIRA_TODO),
                        Span::styled(issue.summary.clone(), theme::LIST_NORMAL),
                        Span::styled(format!("  @{}", assignee), theme::EMPTY_STATE),
                    ];
                    if let Some(priority) = &issue.priority {
                        spans.push(Span::styled(format!("  !{}", priority), theme::EMPTY_STATE));
                    }
                    ListItem::new(Line::from(spans))
                }
            })
            .collect();

        let mut state = ListState::default();
        state.select(app.browser.highlighted_row());
        let list = List::new(items)
            .block(block)
            .highlight_style(theme::LIST_SELECTED);
        f.render_stateful_widget(list, list_area, &mut state);
    }

    if let Some(search_area) = search_area {
        let search_block = Block::default()
            .title(" Filter (Enter to apply, Esc to cancel) ")
            .borders(Borders::ALL)
            .border_style(theme::SEARCH_INPUT);
        let p = Paragraph::new(format!("> {}_", app.browser_search_input))
            .style(theme::SEARCH_INPUT)
            .block(search_block);
        f.render_widget(p, search_area);
    }
}

fn draw_add_view_modal(
    f: &mut Frame,
    area: Rect,
    field: AddViewField,
    name: &str,
    jql_editor: &tui_textarea::TextArea<'_>,
) {
    let popup = util::centered_rect(area, 64, 12);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Add View ")
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE)
        .style(theme::POPUP);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let name_style = if field == AddViewField::Name {
        theme::FIELD_ACTIVE
    } else {
        theme::FIELD_INACTIVE
    };
    let cursor = if field == AddViewField::Name { "_" } else { "" };
    let name_line = Line::from(vec![
        Span::styled(" Name: ", name_style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("{}{}", name, cursor), name_style),
    ]);
    f.render_widget(Paragraph::new(name_line), parts[0]);

    let jql_style = if field == AddViewField::Jql {
        theme::FIELD_ACTIVE
    } else {
        theme::FIELD_INACTIVE
    };
    let jql_block = Block::default()
        .title(" JQL ")
        .borders(Borders::ALL)
        .border_style(jql_style);
    let jql_inner = jql_block.inner(parts[1]);
    f.render_widget(jql_block, parts[1]);
    f.render_widget(jql_editor, jql_inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            " Tab: switch field   Ctrl+S: save   Esc: cancel",
            theme::EMPTY_STATE,
        )),
        parts[2],
    );
}

fn draw_rename_modal(f: &mut Frame, area: Rect, name: &str) {
    let popup = util::centered_rect(area, 50, 5);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name: ", theme::FIELD_ACTIVE.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}_", name), theme::FIELD_ACTIVE),
        ]),
        Line::from(Span::styled(
            "  Enter: save   Esc: cancel",
            theme::EMPTY_STATE,
        )),
    ];
    let block = Block::default()
        .title(" Rename View ")
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_confirm_delete(f: &mut Frame, area: Rect, name: &str) {
    let popup = util::centered_rect(area, 50, 5);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Delete view {}?", name),
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
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(theme::PR_CHANGES_REQUESTED)
        .style(theme::POPUP);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}
