mod app;
mod config;
mod data;
mod error;
mod event;
mod keys;
mod model;
mod poll;
mod state;
mod ui;
mod watcher;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self as ct_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{AddViewField, App, BrowserModal, JiraConfigField, JiraModal};
use crate::data::git::SystemGit;
use crate::data::github;
use crate::event::AppEvent;
use crate::keys::{ActiveView, BrowserBox, GitHubBox, LogsBox, ALL_VIEWS};
use crate::state::browser::AssigneeFilter;

/// How often the repo branch is re-read from git.
const BRANCH_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Scroll offset meaning "jump to the end"; the draw code clamps every
/// offset to the content height.
const SCROLL_TO_END: usize = usize::MAX / 2;

#[derive(Parser)]
#[command(
    name = "standup",
    version,
    about = "Daily driver for PRs, tickets, and work logs"
)]
struct Cli {
    /// Repository directory (defaults to current directory)
    #[arg(long)]
    cwd: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let project_cwd = match cli.cwd {
        Some(p) => std::fs::canonicalize(p)?,
        None => std::env::current_dir()?,
    };

    run_tui(project_cwd)
}

/// File-based tracing, enabled only when STANDUP_LOG is set (its value is
/// the filter, e.g. `debug` or `standup=trace`).
fn init_tracing() {
    let Ok(filter) = std::env::var("STANDUP_LOG") else {
        return;
    };
    let path = config::standup_home().join("standup.log");
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(file)
        .with_ansi(false)
        .try_init();
}

fn run_tui(project_cwd: PathBuf) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, project_cwd);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {}", e);
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    project_cwd: PathBuf,
) -> Result<()> {
    let store = config::ConfigStore::default_location();
    let project_config = config::load_project_config(&project_cwd);
    let tick_rate = Duration::from_millis(project_config.tick_rate());

    let mut app = App::new(project_cwd, store, project_config);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    app.event_tx = Some(tx.clone());

    let git = SystemGit;
    app.initialize(&git);

    let _debouncer = watcher::start_watcher(&app.logs_path, tx)?;

    let mut last_tick = Instant::now();
    let mut last_branch_check = Instant::now();

    loop {
        if app.dirty {
            terminal.draw(|f| ui::draw(f, &app))?;
            app.dirty = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if ct_event::poll(timeout)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key, &git);
                    app.mark_dirty();
                }
            }
        }

        while let Ok(evt) = rx.try_recv() {
            match evt {
                AppEvent::LogChanged(path) => app.handle_log_changed(path),
                AppEvent::PrsLoaded { key, result } => app.handle_prs_loaded(key, result),
                AppEvent::PrDetailsLoaded {
                    key,
                    number,
                    result,
                } => app.handle_pr_details_loaded(key, number, result),
                AppEvent::PollFetch { generation, result } => {
                    app.handle_poll_fetch(generation, result)
                }
                AppEvent::AllPrsLoaded(result) => app.handle_all_prs_loaded(result),
                AppEvent::ViewIssuesLoaded { tag, result } => {
                    app.handle_view_issues_loaded(tag, result)
                }
                AppEvent::LinkedTicketsLoaded { branch, result } => {
                    app.handle_linked_tickets_loaded(branch, result)
                }
                AppEvent::TransitionsLoaded { issue_key, result } => {
                    app.handle_transitions_loaded(issue_key, result)
                }
                AppEvent::TransitionApplied { issue_key, result } => {
                    app.handle_transition_applied(issue_key, result)
                }
                AppEvent::JiraAuthChecked(result) => app.handle_jira_auth_checked(result),
                AppEvent::PrCreationFlowDone(error) => app.handle_pr_creation_flow_done(error),
            }
            app.mark_dirty();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.on_tick(last_tick);

            if last_branch_check.elapsed() >= BRANCH_CHECK_INTERVAL {
                last_branch_check = Instant::now();
                app.refresh_repo(&git);
                app.mark_dirty();
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, git: &SystemGit) {
    // Always-active globals
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !text_input_active(app) => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        _ => {}
    }
    if app.show_help {
        return;
    }

    // Modal and text-entry layers swallow everything else.
    if app.active_view == ActiveView::Jira && app.jira_modal.is_some() {
        handle_jira_modal_key(app, key);
        return;
    }
    if app.active_view == ActiveView::JiraBrowser {
        if app.browser_modal.is_some() {
            handle_browser_modal_key(app, key);
            return;
        }
        if app.browser_search_mode {
            handle_browser_search_key(app, key);
            return;
        }
    }

    // Globals
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
            return;
        }
        KeyCode::BackTab => {
            app.prev_view();
            return;
        }
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            let index = (c as usize) - ('1' as usize);
            if let Some(view) = ALL_VIEWS.get(index) {
                app.switch_to_view(*view);
            }
            return;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.focus_left();
            return;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.focus_right();
            return;
        }
        _ => {}
    }

    match app.active_view {
        ActiveView::GitHub => handle_github_key(app, key, git),
        ActiveView::Jira => handle_jira_key(app, key),
        ActiveView::Logs => handle_logs_key(app, key),
        ActiveView::JiraBrowser => handle_browser_key(app, key),
        ActiveView::PullRequests => handle_all_prs_key(app, key),
    }
}

/// True while some field is consuming typed characters, so `?` can be typed.
fn text_input_active(app: &App) -> bool {
    app.browser_search_mode
        || matches!(
            app.jira_modal,
            Some(JiraModal::Configure { .. }) | Some(JiraModal::LinkTicket { .. })
        )
        || matches!(
            app.browser_modal,
            Some(BrowserModal::AddView { .. }) | Some(BrowserModal::RenameView { .. })
        )
}

// ---------------------------------------------------------------------------
// GitHub view
// ---------------------------------------------------------------------------

fn handle_github_key(app: &mut App, key: KeyEvent, git: &SystemGit) {
    match app.github_box {
        GitHubBox::Remotes => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if app.remote_index + 1 < app.repo.remotes.len() {
                    app.remote_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.remote_index = app.remote_index.saturating_sub(1);
            }
            KeyCode::Enter => app.select_remote_at(app.remote_index),
            _ => {}
        },
        GitHubBox::Prs => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if app.prs.select_next() {
                    app.load_pr_details();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if app.prs.select_previous() {
                    app.load_pr_details();
                }
            }
            KeyCode::Enter => {
                app.load_pr_details();
                app.github_box = GitHubBox::Details;
            }
            KeyCode::Char('n') => app.start_new_pr_flow(git),
            KeyCode::Char('r') => app.load_branch_prs(true),
            KeyCode::Char('o') => open_selected_branch_pr(app),
            KeyCode::Char('y') => copy_selected_branch_pr(app),
            _ => {}
        },
        GitHubBox::Details => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.details_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                app.details_scroll = app.details_scroll.saturating_sub(1)
            }
            KeyCode::Char('g') => app.details_scroll = 0,
            KeyCode::Char('G') => app.details_scroll = SCROLL_TO_END,
            KeyCode::Char('r') => app.load_pr_details(),
            KeyCode::Char('o') => open_selected_branch_pr(app),
            _ => {}
        },
    }
}

fn open_selected_branch_pr(app: &mut App) {
    if let Some(pr) = app.prs.selected_pr() {
        let url = pr.url.clone();
        if let Err(err) = github::open_in_browser(&url) {
            app.last_error = Some(err.to_string());
        }
    }
}

fn copy_selected_branch_pr(app: &mut App) {
    if let Some(pr) = app.prs.selected_pr() {
        let url = pr.url.clone();
        copy_link(app, &url);
    }
}

fn copy_link(app: &mut App, url: &str) {
    match data::copy_to_clipboard(url) {
        Ok(()) => app.show_duck("Link copied."),
        Err(err) => app.last_error = Some(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Jira view
// ---------------------------------------------------------------------------

fn handle_jira_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.linked_index + 1 < app.linked_tickets.len() {
                app.linked_index += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.linked_index = app.linked_index.saturating_sub(1);
        }
        KeyCode::Char('c') => {
            if app.jira_auth.is_none() {
                app.open_jira_config_modal();
            }
        }
        KeyCode::Char('t') => {
            if app.jira_auth.is_some() {
                app.jira_modal = Some(JiraModal::LinkTicket {
                    input: String::new(),
                });
            }
        }
        KeyCode::Char('s') => app.open_transitions_modal(),
        KeyCode::Char('d') => app.unlink_selected_ticket(),
        KeyCode::Char('R') => {
            if app.jira_auth.is_some() {
                app.jira_modal = Some(JiraModal::ConfirmRemoveConfig);
            }
        }
        KeyCode::Char('r') => app.load_linked_tickets(),
        KeyCode::Char('o') => {
            if let (Some(auth), Some(issue)) =
                (&app.jira_auth, app.linked_tickets.get(app.linked_index))
            {
                let url = issue.browse_url(&auth.site_url);
                if let Err(err) = github::open_in_browser(&url) {
                    app.last_error = Some(err.to_string());
                }
            }
        }
        KeyCode::Char('y') => {
            if let (Some(auth), Some(issue)) =
                (&app.jira_auth, app.linked_tickets.get(app.linked_index))
            {
                let url = issue.browse_url(&auth.site_url);
                copy_link(app, &url);
            }
        }
        _ => {}
    }
}

fn handle_jira_modal_key(app: &mut App, key: KeyEvent) {
    // Take the modal so App methods can be called without aliasing it;
    // restore it unless the key closes the modal.
    let Some(mut modal) = app.jira_modal.take() else {
        return;
    };
    match &mut modal {
        JiraModal::Configure {
            field,
            site_url,
            email,
            api_token,
            checking,
            ..
        } => {
            if *checking {
                if key.code != KeyCode::Esc {
                    app.jira_modal = Some(modal);
                }
                return;
            }
            match key.code {
                KeyCode::Esc => return,
                KeyCode::Tab | KeyCode::Down => {
                    *field = match field {
                        JiraConfigField::SiteUrl => JiraConfigField::Email,
                        JiraConfigField::Email => JiraConfigField::ApiToken,
                        JiraConfigField::ApiToken => JiraConfigField::SiteUrl,
                    }
                }
                KeyCode::Enter => {
                    app.jira_modal = Some(modal);
                    app.submit_jira_config();
                    return;
                }
                KeyCode::Backspace => {
                    active_config_field(field, site_url, email, api_token).pop();
                }
                KeyCode::Char(c) => {
                    active_config_field(field, site_url, email, api_token).push(c);
                }
                _ => {}
            }
            app.jira_modal = Some(modal);
        }
        JiraModal::LinkTicket { input } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                let issue_key = input.clone();
                app.link_ticket(&issue_key);
            }
            KeyCode::Backspace => {
                input.pop();
                app.jira_modal = Some(modal);
            }
            KeyCode::Char(c) => {
                input.push(c);
                app.jira_modal = Some(modal);
            }
            _ => app.jira_modal = Some(modal),
        },
        JiraModal::Transitions { .. } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                app.jira_modal = Some(modal);
                app.apply_transition((c as usize) - ('1' as usize));
            }
            _ => app.jira_modal = Some(modal),
        },
        JiraModal::ConfirmRemoveConfig => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.remove_jira_config(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => app.jira_modal = Some(modal),
        },
    }
}

fn active_config_field<'a>(
    field: &JiraConfigField,
    site_url: &'a mut String,
    email: &'a mut String,
    api_token: &'a mut String,
) -> &'a mut String {
    match field {
        JiraConfigField::SiteUrl => site_url,
        JiraConfigField::Email => email,
        JiraConfigField::ApiToken => api_token,
    }
}

// ---------------------------------------------------------------------------
// Logs view
// ---------------------------------------------------------------------------

fn handle_logs_key(app: &mut App, key: KeyEvent) {
    match app.logs_box {
        LogsBox::History => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if app.log_index + 1 < app.log_days.len() {
                    app.log_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.log_index = app.log_index.saturating_sub(1);
            }
            KeyCode::Enter => app.open_log_at(app.log_index),
            _ => {}
        },
        LogsBox::Viewer => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.log_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => app.log_scroll = app.log_scroll.saturating_sub(1),
            KeyCode::Char('g') => app.log_scroll = 0,
            KeyCode::Char('G') => app.log_scroll = SCROLL_TO_END,
            _ => {}
        },
    }
}

// ---------------------------------------------------------------------------
// Browser view
// ---------------------------------------------------------------------------

fn handle_browser_key(app: &mut App, key: KeyEvent) {
    match app.browser_box {
        BrowserBox::SavedViews => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if app.saved_view_index + 1 < app.saved_views.len() {
                    app.saved_view_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.saved_view_index = app.saved_view_index.saturating_sub(1);
            }
            KeyCode::Enter => app.select_saved_view(app.saved_view_index),
            KeyCode::Char('a') => app.open_add_view_modal(),
            KeyCode::Char('e') => app.open_rename_view_modal(),
            KeyCode::Char('d') => {
                if app.saved_view_index < app.saved_views.len() {
                    app.browser_modal = Some(BrowserModal::ConfirmDelete {
                        index: app.saved_view_index,
                    });
                }
            }
            _ => {}
        },
        BrowserBox::Browser => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.browser.move_down(),
            KeyCode::Char('k') | KeyCode::Up => app.browser.move_up(),
            KeyCode::Char('/') => {
                app.browser_search_mode = true;
                app.browser_search_input = app.browser.search_text.clone();
            }
            KeyCode::Char('u') => app.set_browser_filter(AssigneeFilter::Unassigned),
            KeyCode::Char('m') => app.set_browser_filter(AssigneeFilter::Mine),
            KeyCode::Char('x') => {
                app.browser.clear_filters();
                app.load_view_page(false);
            }
            KeyCode::Char('L') => app.load_view_page(true),
            KeyCode::Char('r') => app.load_view_page(false),
            KeyCode::Char('o') => {
                if let (Some(auth), Some(issue)) =
                    (&app.jira_auth, app.browser.highlighted_issue())
                {
                    let url = issue.browse_url(&auth.site_url);
                    if let Err(err) = github::open_in_browser(&url) {
                        app.last_error = Some(err.to_string());
                    }
                }
            }
            KeyCode::Char('y') => {
                if let (Some(auth), Some(issue)) =
                    (&app.jira_auth, app.browser.highlighted_issue())
                {
                    let url = issue.browse_url(&auth.site_url);
                    copy_link(app, &url);
                }
            }
            _ => {}
        },
    }
}

fn handle_browser_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_browser_search(),
        KeyCode::Enter => app.submit_browser_search(),
        KeyCode::Backspace => {
            app.browser_search_input.pop();
        }
        KeyCode::Char(c) => app.browser_search_input.push(c),
        _ => {}
    }
}

fn handle_browser_modal_key(app: &mut App, key: KeyEvent) {
    let Some(mut modal) = app.browser_modal.take() else {
        return;
    };
    match &mut modal {
        BrowserModal::AddView {
            field, name, jql_editor,
        } => {
            match key.code {
                KeyCode::Esc => return,
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.browser_modal = Some(modal);
                    app.submit_add_view();
                    return;
                }
                KeyCode::Tab => {
                    *field = match field {
                        AddViewField::Name => AddViewField::Jql,
                        AddViewField::Jql => AddViewField::Name,
                    };
                }
                KeyCode::Enter if *field == AddViewField::Name => {
                    *field = AddViewField::Jql;
                }
                KeyCode::Backspace if *field == AddViewField::Name => {
                    name.pop();
                }
                KeyCode::Char(c) if *field == AddViewField::Name => name.push(c),
                _ => {
                    if *field == AddViewField::Jql {
                        jql_editor.input(key);
                    }
                }
            }
            app.browser_modal = Some(modal);
        }
        BrowserModal::RenameView { name, .. } => {
            match key.code {
                KeyCode::Esc => return,
                KeyCode::Enter => {
                    app.browser_modal = Some(modal);
                    app.submit_rename_view();
                    return;
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Char(c) => name.push(c),
                _ => {}
            }
            app.browser_modal = Some(modal);
        }
        BrowserModal::ConfirmDelete { index } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let index = *index;
                app.delete_saved_view(index);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => app.browser_modal = Some(modal),
        },
    }
}

// ---------------------------------------------------------------------------
// All-PRs view
// ---------------------------------------------------------------------------

fn handle_all_prs_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.all_prs_index + 1 < app.all_prs.len() {
                app.all_prs_index += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.all_prs_index = app.all_prs_index.saturating_sub(1);
        }
        KeyCode::Char('r') => app.load_all_prs(),
        KeyCode::Char('o') => {
            if let Some(pr) = app.all_prs.get(app.all_prs_index) {
                let url = pr.url.clone();
                if let Err(err) = github::open_in_browser(&url) {
                    app.last_error = Some(err.to_string());
                }
            }
        }
        KeyCode::Char('y') => {
            if let Some(pr) = app.all_prs.get(app.all_prs_index) {
                let url = pr.url.clone();
                copy_link(app, &url);
            }
        }
        _ => {}
    }
}
