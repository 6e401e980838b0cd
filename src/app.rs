use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{ConfigStore, ProjectConfig};
use crate::data::{git, github, jira, logs};
use crate::error::FetchError;
use crate::event::{AppEvent, FetchKey, PageTag};
use crate::keys::{ActiveView, BrowserBox, GitHubBox, JiraState, LogsBox, ViewKeyState, ALL_VIEWS};
use crate::model::github::PrSummary;
use crate::model::jira::{JiraAuth, JiraIssue, SavedView, Transition, ViewSource};
use crate::poll::{PollOutcome, PollingEngine, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use crate::state::browser::{AssigneeFilter, SavedViewIssueBrowser, PAGE_SIZE};
use crate::state::pull_requests::PullRequestCollection;
use crate::state::repo::RepoContext;

const DUCK_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Which field of the Jira configuration modal is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JiraConfigField {
    SiteUrl,
    Email,
    ApiToken,
}

/// Modal overlays on the Jira linked-tickets view.
#[derive(Debug)]
pub enum JiraModal {
    Configure {
        field: JiraConfigField,
        site_url: String,
        email: String,
        api_token: String,
        checking: bool,
        error: Option<String>,
    },
    LinkTicket {
        input: String,
    },
    Transitions {
        issue_key: String,
        from_status: String,
        transitions: Vec<Transition>,
        loading: bool,
    },
    ConfirmRemoveConfig,
}

/// Which field of the add-view modal is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddViewField {
    Name,
    Jql,
}

/// Modal overlays on the saved-view browser.
pub enum BrowserModal {
    AddView {
        field: AddViewField,
        name: String,
        jql_editor: tui_textarea::TextArea<'static>,
    },
    RenameView {
        index: usize,
        name: String,
    },
    ConfirmDelete {
        index: usize,
    },
}

pub struct App {
    pub should_quit: bool,
    pub dirty: bool,
    pub show_help: bool,
    pub active_view: ActiveView,
    pub event_tx: Option<mpsc::Sender<AppEvent>>,
    pub last_error: Option<String>,

    // Config
    pub store: ConfigStore,
    pub project_config: ProjectConfig,
    pub project_cwd: PathBuf,
    pub logs_path: PathBuf,

    // GitHub view
    pub repo: RepoContext,
    pub prs: PullRequestCollection,
    pub github_box: GitHubBox,
    pub remote_index: usize,
    pub details_scroll: usize,

    // New-PR polling
    pub poll: PollingEngine<u64>,
    poll_key: Option<FetchKey>,

    // Jira linked tickets view
    pub jira_auth: Option<JiraAuth>,
    pub my_account_id: Option<String>,
    pub linked_tickets: Vec<JiraIssue>,
    pub linked_loading: bool,
    pub linked_error: Option<FetchError>,
    pub linked_index: usize,
    pub jira_modal: Option<JiraModal>,

    // Saved-view browser
    pub browser: SavedViewIssueBrowser,
    pub saved_views: Vec<SavedView>,
    pub saved_view_index: usize,
    pub browser_box: BrowserBox,
    pub browser_modal: Option<BrowserModal>,
    pub browser_search_mode: bool,
    pub browser_search_input: String,

    // All-PRs view
    pub all_prs: Vec<PrSummary>,
    pub all_prs_loading: bool,
    pub all_prs_error: Option<FetchError>,
    pub all_prs_index: usize,

    // Logs view
    pub log_days: Vec<String>,
    pub log_index: usize,
    pub log_content: Option<String>,
    pub log_scroll: usize,
    pub logs_box: LogsBox,

    // Duck mascot
    pub duck_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(project_cwd: PathBuf, store: ConfigStore, project_config: ProjectConfig) -> Self {
        let jira_auth = store.jira_auth();
        let saved_views = store.saved_views();
        Self {
            should_quit: false,
            dirty: true,
            show_help: false,
            active_view: ActiveView::GitHub,
            event_tx: None,
            last_error: None,
            store,
            project_config,
            project_cwd,
            logs_path: crate::config::logs_dir(),
            repo: RepoContext::default(),
            prs: PullRequestCollection::default(),
            github_box: GitHubBox::Remotes,
            remote_index: 0,
            details_scroll: 0,
            poll: PollingEngine::new(),
            poll_key: None,
            jira_auth,
            my_account_id: None,
            linked_tickets: Vec::new(),
            linked_loading: false,
            linked_error: None,
            linked_index: 0,
            jira_modal: None,
            browser: SavedViewIssueBrowser::default(),
            saved_views,
            saved_view_index: 0,
            browser_box: BrowserBox::SavedViews,
            browser_modal: None,
            browser_search_mode: false,
            browser_search_input: String::new(),
            all_prs: Vec::new(),
            all_prs_loading: false,
            all_prs_error: None,
            all_prs_index: 0,
            log_days: Vec::new(),
            log_index: 0,
            log_content: None,
            log_scroll: 0,
            logs_box: LogsBox::History,
            duck_message: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn send(&self, event: AppEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    pub fn initialize(&mut self, gitops: &impl git::GitOps) {
        // Persisted settings are keyed by the repo root, probed before the
        // context is built so the saved remote can seed the selection.
        let root = gitops.repo_root(&self.project_cwd).ok();
        let repo_key = root
            .as_deref()
            .unwrap_or(&self.project_cwd)
            .to_string_lossy()
            .to_string();
        let persisted = self.store.repo_config(&repo_key).selected_remote;
        self.repo
            .initialize(gitops, &self.project_cwd, persisted.as_deref());
        self.remote_index = self
            .repo
            .selected_remote
            .as_ref()
            .and_then(|name| self.repo.remotes.iter().position(|r| &r.name == name))
            .unwrap_or(0);

        if let Some(view_name) = self.project_config.jira_default_view() {
            if let Some(index) = self.saved_views.iter().position(|v| v.name == view_name) {
                self.saved_view_index = index;
            }
        }
        let default = self.saved_views.get(self.saved_view_index).cloned();
        self.browser.set_view(default);

        self.reload_logs();
        self.load_branch_prs(true);
        self.load_linked_tickets();
        if self.jira_auth.is_some() {
            self.check_jira_auth();
        }
    }

    // -----------------------------------------------------------------------
    // View and focus
    // -----------------------------------------------------------------------

    pub fn view_key_state(&self) -> ViewKeyState {
        ViewKeyState {
            github_box: self.github_box,
            jira_state: self.jira_state(),
            jira_modal_open: self.jira_modal.is_some(),
            logs_box: self.logs_box,
            browser_box: self.browser_box,
            browser_modal_open: self.browser_modal.is_some(),
        }
    }

    pub fn jira_state(&self) -> JiraState {
        if self.jira_auth.is_none() {
            JiraState::NotConfigured
        } else if self.linked_tickets.is_empty() {
            JiraState::NoTickets
        } else {
            JiraState::HasTickets
        }
    }

    pub fn modal_open(&self) -> bool {
        match self.active_view {
            ActiveView::Jira => self.jira_modal.is_some(),
            ActiveView::JiraBrowser => self.browser_modal.is_some() || self.browser_search_mode,
            _ => false,
        }
    }

    pub fn next_view(&mut self) {
        let index = ALL_VIEWS
            .iter()
            .position(|v| *v == self.active_view)
            .unwrap_or(0);
        self.switch_to_view(ALL_VIEWS[(index + 1) % ALL_VIEWS.len()]);
    }

    pub fn prev_view(&mut self) {
        let index = ALL_VIEWS
            .iter()
            .position(|v| *v == self.active_view)
            .unwrap_or(0);
        self.switch_to_view(ALL_VIEWS[(index + ALL_VIEWS.len() - 1) % ALL_VIEWS.len()]);
    }

    pub fn switch_to_view(&mut self, view: ActiveView) {
        self.active_view = view;
        match view {
            ActiveView::Jira => self.load_linked_tickets(),
            ActiveView::PullRequests if self.all_prs.is_empty() => self.load_all_prs(),
            ActiveView::JiraBrowser if self.browser.loaded_count() == 0 => {
                self.load_view_page(false)
            }
            _ => {}
        }
    }

    pub fn focus_left(&mut self) {
        match self.active_view {
            ActiveView::GitHub => {
                self.github_box = match self.github_box {
                    GitHubBox::Details => GitHubBox::Prs,
                    _ => GitHubBox::Remotes,
                }
            }
            ActiveView::Logs => self.logs_box = LogsBox::History,
            ActiveView::JiraBrowser => self.browser_box = BrowserBox::SavedViews,
            _ => {}
        }
    }

    pub fn focus_right(&mut self) {
        match self.active_view {
            ActiveView::GitHub => {
                self.github_box = match self.github_box {
                    GitHubBox::Remotes => GitHubBox::Prs,
                    _ => GitHubBox::Details,
                }
            }
            ActiveView::Logs => self.logs_box = LogsBox::Viewer,
            ActiveView::JiraBrowser => self.browser_box = BrowserBox::Browser,
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // GitHub: branch PRs
    // -----------------------------------------------------------------------

    /// Store key for this repository's persisted settings.
    fn repo_store_key(&self) -> String {
        self.repo
            .repo_path
            .as_deref()
            .unwrap_or(&self.project_cwd)
            .to_string_lossy()
            .to_string()
    }

    fn current_fetch_key(&self) -> Option<FetchKey> {
        Some(FetchKey {
            branch: self.repo.current_branch.clone()?,
            repo_slug: self.repo.current_repo_slug()?,
        })
    }

    /// Fetch PRs for the current branch. Without `force`, a fetch whose key
    /// matches the last applied one is suppressed.
    pub fn load_branch_prs(&mut self, force: bool) {
        let Some(key) = self.current_fetch_key() else {
            return;
        };
        if !force && self.prs.last_fetched() == Some(&key) {
            return;
        }
        self.prs.begin_fetch(key.clone());
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = github::list_prs_for_branch(&key.repo_slug, &key.branch);
            let _ = tx.send(AppEvent::PrsLoaded { key, result });
        });
    }

    pub fn handle_prs_loaded(
        &mut self,
        key: FetchKey,
        result: Result<Vec<PrSummary>, FetchError>,
    ) {
        if let Err(err) = &result {
            self.last_error = Some(err.to_string());
        }
        if self.prs.apply_prs_result(key, result) && self.prs.details.is_none() {
            self.load_pr_details();
        }
    }

    pub fn load_pr_details(&mut self) {
        let (Some(key), Some(number)) = (self.current_fetch_key(), self.prs.selected_number())
        else {
            return;
        };
        self.prs.begin_details_fetch();
        self.details_scroll = 0;
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = github::pr_detail(&key.repo_slug, number);
            let _ = tx.send(AppEvent::PrDetailsLoaded {
                key,
                number,
                result,
            });
        });
    }

    pub fn handle_pr_details_loaded(
        &mut self,
        key: FetchKey,
        number: u64,
        result: Result<crate::model::github::PrDetail, FetchError>,
    ) {
        self.prs.apply_details_result(&key, number, result);
    }

    /// Select a remote from the remotes box, persist the choice, and refetch
    /// everything derived from the repo slug.
    pub fn select_remote_at(&mut self, index: usize) {
        let Some(name) = self.repo.remotes.get(index).map(|r| r.name.clone()) else {
            return;
        };
        if !self.repo.select_remote(&name) {
            return;
        }
        let repo_key = self.repo_store_key();
        if let Err(err) = self.store.update_repo_config(&repo_key, |repo| {
            repo.selected_remote = Some(name.clone());
        }) {
            warn!(error = %err, "failed to persist remote selection");
        }
        self.poll.stop();
        self.load_branch_prs(true);
        self.all_prs.clear();
    }

    /// Re-read the branch from git and refetch when it moved.
    pub fn refresh_repo(&mut self, gitops: &impl git::GitOps) {
        let before = self.repo.current_branch.clone();
        let fresh = self.repo.refresh_branch(gitops, &self.project_cwd);
        if fresh != before {
            debug!(branch = ?fresh, "branch changed");
            self.poll.stop();
            self.load_branch_prs(true);
            self.load_linked_tickets();
        } else {
            // No-op when the last applied fetch already covers this key;
            // retries after a failed fetch, which clears it.
            self.load_branch_prs(false);
        }
    }

    // -----------------------------------------------------------------------
    // GitHub: new PR flow with polling
    // -----------------------------------------------------------------------

    /// Launch the browser-based PR creation flow and start watching for the
    /// PR it will create. The known-id set and fetch key are captured now,
    /// so a branch switch during the flow cannot misattribute a result.
    ///
    /// A branch that exists on no remote cannot get a PR, so that case is
    /// rejected up front without touching the list.
    pub fn start_new_pr_flow(&mut self, gitops: &impl git::GitOps) {
        let Some(key) = self.current_fetch_key() else {
            self.last_error = Some("no branch or remote to open a PR from".into());
            return;
        };
        match gitops.find_remote_with_branch(&self.project_cwd, &key.branch) {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.prs.prs_error =
                    Some(FetchError::api("Push your branch to a remote first"));
                return;
            }
            Err(err) => {
                self.prs.prs_error = Some(err.into());
                return;
            }
        }
        let known: HashSet<u64> = self.prs.prs.iter().map(|pr| pr.number).collect();
        self.poll
            .start(known, DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL, Instant::now());
        self.poll_key = Some(key.clone());
        self.show_duck("Off to the browser with you.");

        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        let cwd = self.project_cwd.clone();
        std::thread::spawn(move || {
            let outcome = github::open_pr_creation_flow(&cwd, &key.branch)
                .err()
                .map(|err| err.to_string());
            let _ = tx.send(AppEvent::PrCreationFlowDone(outcome));
        });
    }

    pub fn handle_pr_creation_flow_done(&mut self, error: Option<String>) {
        if let Some(message) = error {
            self.poll.stop();
            self.last_error = Some(message);
        }
    }

    /// Drive the polling engine from the loop tick: when a fetch is due,
    /// spawn it with the generation and the key captured at start.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(generation) = self.poll.due(now) {
            if let Some(key) = self.poll_key.clone() {
                if let Some(tx) = self.event_tx.clone() {
                    std::thread::spawn(move || {
                        let result = github::list_prs_for_branch(&key.repo_slug, &key.branch);
                        let _ = tx.send(AppEvent::PollFetch { generation, result });
                    });
                }
            }
        }
        if let Some((_, shown_at)) = self.duck_message {
            if now.duration_since(shown_at) >= DUCK_MESSAGE_TTL {
                self.duck_message = None;
                self.mark_dirty();
            }
        }
    }

    pub fn handle_poll_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<PrSummary>, FetchError>,
    ) {
        // Failures are silent: the attempt was already consumed when the
        // fetch was scheduled.
        let Ok(prs) = result else {
            return;
        };
        let ids: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        match self.poll.apply(generation, &ids) {
            PollOutcome::Found(number) => {
                debug!(number, "detected externally created PR");
                if let Some(created) = prs.iter().find(|pr| pr.number == number) {
                    if let Some(key) = self.poll_key.clone() {
                        if let Err(err) = logs::log_pr_created(
                            &self.logs_path,
                            &key.repo_slug,
                            number,
                            &created.title,
                        ) {
                            warn!(error = %err, "failed to write log entry");
                        }
                    }
                    let message = format!("Quack! PR #{} is live.", number);
                    self.show_duck(&message);
                }
                if let Some(key) = self.poll_key.take() {
                    self.prs.begin_fetch(key.clone());
                    self.prs.apply_prs_result(key, Ok(prs));
                    self.prs.select(number);
                    self.load_pr_details();
                }
                self.reload_logs();
            }
            PollOutcome::NoNewItem => {
                // Every tick carries the full list for the captured key, so
                // edits to already-known PRs land in the pane while the
                // session runs. Skipped once branch or remote moved on.
                if let Some(key) = self.poll_key.clone() {
                    if self.current_fetch_key().as_ref() == Some(&key) {
                        self.prs.begin_fetch(key.clone());
                        self.prs.apply_prs_result(key, Ok(prs));
                    }
                }
            }
            PollOutcome::Stale => {}
        }
    }

    // -----------------------------------------------------------------------
    // All-PRs view
    // -----------------------------------------------------------------------

    pub fn load_all_prs(&mut self) {
        let Some(slug) = self.repo.current_repo_slug() else {
            return;
        };
        self.all_prs_loading = true;
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = github::list_open_prs(&slug);
            let _ = tx.send(AppEvent::AllPrsLoaded(result));
        });
    }

    pub fn handle_all_prs_loaded(&mut self, result: Result<Vec<PrSummary>, FetchError>) {
        self.all_prs_loading = false;
        match result {
            Ok(prs) => {
                if self.all_prs_index >= prs.len() {
                    self.all_prs_index = prs.len().saturating_sub(1);
                }
                self.all_prs = prs;
                self.all_prs_error = None;
            }
            Err(err) => {
                self.all_prs = Vec::new();
                self.all_prs_index = 0;
                self.all_prs_error = Some(err);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Jira: linked tickets
    // -----------------------------------------------------------------------

    fn linked_keys_for_branch(&self) -> Vec<String> {
        let Some(branch) = &self.repo.current_branch else {
            return Vec::new();
        };
        self.store
            .repo_config(&self.repo_store_key())
            .linked_tickets
            .get(branch)
            .cloned()
            .unwrap_or_default()
    }

    pub fn load_linked_tickets(&mut self) {
        let Some(auth) = self.jira_auth.clone() else {
            return;
        };
        let Some(branch) = self.repo.current_branch.clone() else {
            return;
        };
        let keys = self.linked_keys_for_branch();
        if keys.is_empty() {
            self.linked_tickets = Vec::new();
            self.linked_error = None;
            return;
        }
        self.linked_loading = true;
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = jira::issues_by_keys(&auth, &keys);
            let _ = tx.send(AppEvent::LinkedTicketsLoaded { branch, result });
        });
    }

    pub fn handle_linked_tickets_loaded(
        &mut self,
        branch: String,
        result: Result<Vec<JiraIssue>, FetchError>,
    ) {
        // Stale guard: the branch may have moved while the fetch ran.
        if self.repo.current_branch.as_deref() != Some(branch.as_str()) {
            return;
        }
        self.linked_loading = false;
        match result {
            Ok(tickets) => {
                if self.linked_index >= tickets.len() {
                    self.linked_index = tickets.len().saturating_sub(1);
                }
                self.linked_tickets = tickets;
                self.linked_error = None;
            }
            Err(err) => {
                self.linked_tickets = Vec::new();
                self.linked_index = 0;
                self.linked_error = Some(err);
            }
        }
    }

    pub fn link_ticket(&mut self, issue_key: &str) {
        let Some(branch) = self.repo.current_branch.clone() else {
            return;
        };
        let issue_key = issue_key.trim().to_uppercase();
        if issue_key.is_empty() {
            return;
        }
        let repo_key = self.repo_store_key();
        if let Err(err) = self.store.update_repo_config(&repo_key, |repo| {
            let keys = repo.linked_tickets.entry(branch.clone()).or_default();
            if !keys.contains(&issue_key) {
                keys.push(issue_key.clone());
            }
        }) {
            self.last_error = Some(err.to_string());
            return;
        }
        if let Err(err) = logs::log_ticket_linked(&self.logs_path, &branch, &issue_key) {
            warn!(error = %err, "failed to write log entry");
        }
        self.reload_logs();
        self.load_linked_tickets();
    }

    pub fn unlink_selected_ticket(&mut self) {
        let Some(branch) = self.repo.current_branch.clone() else {
            return;
        };
        let Some(issue) = self.linked_tickets.get(self.linked_index) else {
            return;
        };
        let issue_key = issue.key.clone();
        let repo_key = self.repo_store_key();
        if let Err(err) = self.store.update_repo_config(&repo_key, |repo| {
            if let Some(keys) = repo.linked_tickets.get_mut(&branch) {
                keys.retain(|k| k != &issue_key);
                if keys.is_empty() {
                    repo.linked_tickets.remove(&branch);
                }
            }
        }) {
            self.last_error = Some(err.to_string());
            return;
        }
        self.load_linked_tickets();
    }

    // -----------------------------------------------------------------------
    // Jira: configuration
    // -----------------------------------------------------------------------

    pub fn open_jira_config_modal(&mut self) {
        let existing = self.jira_auth.clone();
        self.jira_modal = Some(JiraModal::Configure {
            field: JiraConfigField::SiteUrl,
            site_url: existing.as_ref().map(|a| a.site_url.clone()).unwrap_or_default(),
            email: existing.as_ref().map(|a| a.email.clone()).unwrap_or_default(),
            api_token: String::new(),
            checking: false,
            error: None,
        });
    }

    /// Verify the credentials in the open configure modal against the Jira
    /// myself endpoint before persisting them.
    pub fn submit_jira_config(&mut self) {
        let Some(JiraModal::Configure {
            site_url,
            email,
            api_token,
            checking,
            error,
            ..
        }) = &mut self.jira_modal
        else {
            return;
        };
        if site_url.trim().is_empty() || email.trim().is_empty() || api_token.trim().is_empty() {
            *error = Some("all fields are required".into());
            return;
        }
        *checking = true;
        *error = None;
        let auth = JiraAuth {
            site_url: site_url.trim().trim_end_matches('/').to_string(),
            email: email.trim().to_string(),
            api_token: api_token.trim().to_string(),
        };
        self.jira_auth = Some(auth.clone());
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = jira::myself(&auth);
            let _ = tx.send(AppEvent::JiraAuthChecked(result));
        });
    }

    fn check_jira_auth(&mut self) {
        let Some(auth) = self.jira_auth.clone() else {
            return;
        };
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = jira::myself(&auth);
            let _ = tx.send(AppEvent::JiraAuthChecked(result));
        });
    }

    pub fn handle_jira_auth_checked(&mut self, result: Result<String, FetchError>) {
        match result {
            Ok(account_id) => {
                self.my_account_id = Some(account_id);
                self.browser.my_account_id = self.my_account_id.clone();
                if let Some(JiraModal::Configure { .. }) = &self.jira_modal {
                    // The modal's credentials checked out: persist and close.
                    let auth = self.jira_auth.clone();
                    if let Err(err) = self.store.update(|store| store.jira = auth) {
                        self.last_error = Some(err.to_string());
                    }
                    self.jira_modal = None;
                    self.show_duck("Jira is wired up. Quack.");
                    self.load_linked_tickets();
                }
            }
            Err(err) => {
                if let Some(JiraModal::Configure {
                    checking, error, ..
                }) = &mut self.jira_modal
                {
                    *checking = false;
                    *error = Some(err.to_string());
                    self.jira_auth = None;
                } else {
                    self.last_error = Some(err.to_string());
                }
            }
        }
    }

    pub fn remove_jira_config(&mut self) {
        self.jira_auth = None;
        self.my_account_id = None;
        self.linked_tickets = Vec::new();
        self.jira_modal = None;
        if let Err(err) = self.store.update(|store| store.jira = None) {
            self.last_error = Some(err.to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Jira: transitions
    // -----------------------------------------------------------------------

    pub fn open_transitions_modal(&mut self) {
        let Some(auth) = self.jira_auth.clone() else {
            return;
        };
        let Some(issue) = self.linked_tickets.get(self.linked_index) else {
            return;
        };
        let issue_key = issue.key.clone();
        self.jira_modal = Some(JiraModal::Transitions {
            issue_key: issue_key.clone(),
            from_status: issue.status.clone(),
            transitions: Vec::new(),
            loading: true,
        });
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = jira::get_transitions(&auth, &issue_key);
            let _ = tx.send(AppEvent::TransitionsLoaded { issue_key, result });
        });
    }

    pub fn handle_transitions_loaded(
        &mut self,
        for_issue: String,
        result: Result<Vec<Transition>, FetchError>,
    ) {
        let open_for = matches!(
            &self.jira_modal,
            Some(JiraModal::Transitions { issue_key, .. }) if *issue_key == for_issue
        );
        if !open_for {
            return;
        }
        match result {
            Ok(list) => {
                if let Some(JiraModal::Transitions {
                    transitions,
                    loading,
                    ..
                }) = &mut self.jira_modal
                {
                    *transitions = list;
                    *loading = false;
                }
            }
            Err(err) => {
                self.jira_modal = None;
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn apply_transition(&mut self, index: usize) {
        let Some(auth) = self.jira_auth.clone() else {
            return;
        };
        let Some(JiraModal::Transitions {
            issue_key,
            from_status,
            transitions,
            ..
        }) = &self.jira_modal
        else {
            return;
        };
        let Some(transition) = transitions.get(index) else {
            return;
        };
        let issue_key = issue_key.clone();
        let from = from_status.clone();
        let to = transition.name.clone();
        let transition_id = transition.id.clone();
        self.jira_modal = None;

        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = jira::do_transition(&auth, &issue_key, &transition_id)
                .map(|_| format!("{}|{}", from, to));
            let _ = tx.send(AppEvent::TransitionApplied { issue_key, result });
        });
    }

    pub fn handle_transition_applied(
        &mut self,
        issue_key: String,
        result: Result<String, FetchError>,
    ) {
        match result {
            Ok(from_to) => {
                if let Some((from, to)) = from_to.split_once('|') {
                    if let Err(err) =
                        logs::log_status_changed(&self.logs_path, &issue_key, from, to)
                    {
                        warn!(error = %err, "failed to write log entry");
                    }
                    self.show_duck(&format!("{} waddled to {}.", issue_key, to));
                }
                self.reload_logs();
                self.load_linked_tickets();
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Saved-view browser
    // -----------------------------------------------------------------------

    pub fn select_saved_view(&mut self, index: usize) {
        let Some(view) = self.saved_views.get(index).cloned() else {
            return;
        };
        self.saved_view_index = index;
        self.browser.set_view(Some(view));
        self.browser_search_input.clear();
        self.load_view_page(false);
        self.browser_box = BrowserBox::Browser;
    }

    pub fn load_view_page(&mut self, append: bool) {
        let Some(auth) = self.jira_auth.clone() else {
            return;
        };
        let Some(view) = self.browser.view.clone() else {
            return;
        };
        if append && !self.browser.has_more() {
            return;
        }
        let tag = self.browser.begin_fetch(append);
        let search = self.browser.search_text.clone();
        let tx = match &self.event_tx {
            Some(tx) => tx.clone(),
            None => return,
        };
        std::thread::spawn(move || {
            let result = fetch_page(&auth, &view.source, &search, tag.start_at);
            let _ = tx.send(AppEvent::ViewIssuesLoaded { tag, result });
        });
    }

    pub fn handle_view_issues_loaded(
        &mut self,
        tag: PageTag,
        result: Result<crate::model::jira::SearchPage, FetchError>,
    ) {
        self.browser.apply_fetch(tag, result);
    }

    pub fn submit_browser_search(&mut self) {
        self.browser_search_mode = false;
        self.browser
            .set_search_text(self.browser_search_input.clone());
        self.load_view_page(false);
    }

    pub fn cancel_browser_search(&mut self) {
        self.browser_search_mode = false;
        self.browser_search_input.clear();
        if !self.browser.search_text.is_empty() {
            self.browser.set_search_text(String::new());
            self.load_view_page(false);
        }
    }

    pub fn set_browser_filter(&mut self, filter: AssigneeFilter) {
        self.browser.set_assignee_filter(filter);
    }

    pub fn open_add_view_modal(&mut self) {
        self.browser_modal = Some(BrowserModal::AddView {
            field: AddViewField::Name,
            name: String::new(),
            jql_editor: tui_textarea::TextArea::default(),
        });
    }

    pub fn submit_add_view(&mut self) {
        let Some(BrowserModal::AddView {
            name, jql_editor, ..
        }) = &self.browser_modal
        else {
            return;
        };
        let name = name.trim().to_string();
        let jql = jql_editor.lines().join(" ").trim().to_string();
        if name.is_empty() || jql.is_empty() {
            return;
        }
        let view = SavedView {
            id: format!("view-{}", chrono::Local::now().timestamp_millis()),
            name,
            source: ViewSource::Jql { jql },
        };
        self.saved_views.push(view.clone());
        if let Err(err) = self.store.update(|store| store.saved_views.push(view)) {
            self.last_error = Some(err.to_string());
        }
        self.browser_modal = None;
        self.select_saved_view(self.saved_views.len() - 1);
    }

    pub fn open_rename_view_modal(&mut self) {
        let index = self.saved_view_index;
        let Some(view) = self.saved_views.get(index) else {
            return;
        };
        self.browser_modal = Some(BrowserModal::RenameView {
            index,
            name: view.name.clone(),
        });
    }

    pub fn submit_rename_view(&mut self) {
        let Some(BrowserModal::RenameView { index, name }) = &self.browser_modal else {
            return;
        };
        let index = *index;
        let name = name.trim().to_string();
        self.browser_modal = None;
        if name.is_empty() {
            return;
        }
        let Some(view) = self.saved_views.get_mut(index) else {
            return;
        };
        view.name = name.clone();
        let id = view.id.clone();
        if self.browser.view.as_ref().map(|v| &v.id) == Some(&id) {
            if let Some(open) = self.browser.view.as_mut() {
                open.name = name.clone();
            }
        }
        if let Err(err) = self.store.update(|store| {
            if let Some(stored) = store.saved_views.iter_mut().find(|v| v.id == id) {
                stored.name = name;
            }
        }) {
            self.last_error = Some(err.to_string());
        }
    }

    pub fn delete_saved_view(&mut self, index: usize) {
        if index >= self.saved_views.len() {
            return;
        }
        let removed = self.saved_views.remove(index);
        if let Err(err) = self
            .store
            .update(|store| store.saved_views.retain(|v| v.id != removed.id))
        {
            self.last_error = Some(err.to_string());
        }
        if self.saved_view_index >= self.saved_views.len() {
            self.saved_view_index = self.saved_views.len().saturating_sub(1);
        }
        if self.browser.view.as_ref().map(|v| &v.id) == Some(&removed.id) {
            self.browser
                .set_view(self.saved_views.get(self.saved_view_index).cloned());
            self.load_view_page(false);
        }
        self.browser_modal = None;
    }

    // -----------------------------------------------------------------------
    // Logs
    // -----------------------------------------------------------------------

    pub fn reload_logs(&mut self) {
        self.log_days = logs::list_log_days(&self.logs_path);
        if self.log_index >= self.log_days.len() {
            self.log_index = self.log_days.len().saturating_sub(1);
        }
    }

    pub fn open_log_at(&mut self, index: usize) {
        let Some(day) = self.log_days.get(index) else {
            return;
        };
        match logs::read_log(&self.logs_path, day) {
            Ok(content) => {
                self.log_content = Some(content);
                self.log_scroll = 0;
                self.logs_box = LogsBox::Viewer;
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    pub fn handle_log_changed(&mut self, path: PathBuf) {
        self.reload_logs();
        // Refresh the viewer if the changed file is the one on screen.
        let viewing = self
            .log_days
            .get(self.log_index)
            .map(|day| self.logs_path.join(format!("{}.md", day)));
        if self.log_content.is_some() && viewing.as_deref() == Some(path.as_path()) {
            if let Some(day) = self.log_days.get(self.log_index) {
                self.log_content = logs::read_log(&self.logs_path, day).ok();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Duck
    // -----------------------------------------------------------------------

    pub fn show_duck(&mut self, message: &str) {
        self.duck_message = Some((message.to_string(), Instant::now()));
    }
}

/// Resolve one page for a saved view, folding the free-text search into the
/// server query. Board sources page through the agile API, which has no
/// free-text parameter, so search applies only to JQL-backed views.
fn fetch_page(
    auth: &JiraAuth,
    source: &ViewSource,
    search: &str,
    start_at: usize,
) -> Result<crate::model::jira::SearchPage, FetchError> {
    match source {
        ViewSource::Jql { jql } => {
            let jql = jira::append_text_search(jql, search);
            jira::search_issues(auth, &jql, start_at, PAGE_SIZE)
        }
        ViewSource::Filter { filter_id } => {
            let jql = jira::get_filter_jql(auth, filter_id)?;
            let jql = jira::append_text_search(&jql, search);
            jira::search_issues(auth, &jql, start_at, PAGE_SIZE)
        }
        ViewSource::Board { board_id } => jira::board_issues(auth, board_id, start_at, PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::github::GitRemote;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    struct StubGit {
        pushed_branch: Option<String>,
    }

    impl git::GitOps for StubGit {
        fn is_repo(&self, _cwd: &Path) -> bool {
            true
        }
        fn repo_root(&self, _cwd: &Path) -> Result<PathBuf> {
            Ok(PathBuf::from("/src/widgets"))
        }
        fn current_branch(&self, _cwd: &Path) -> Result<String> {
            Ok("feature/polling".into())
        }
        fn list_remotes(&self, _cwd: &Path) -> Result<Vec<GitRemote>> {
            Ok(Vec::new())
        }
        fn find_remote_with_branch(&self, _cwd: &Path, branch: &str) -> Result<Option<String>> {
            Ok(self
                .pushed_branch
                .as_deref()
                .filter(|b| *b == branch)
                .map(|_| "origin".to_string()))
        }
    }

    fn app_on_branch(dir: &tempfile::TempDir) -> App {
        let store = ConfigStore::new(dir.path().join("config.json"));
        let mut app = App::new(PathBuf::from("/src/widgets"), store, ProjectConfig::default());
        app.repo.is_repo = Some(true);
        app.repo.current_branch = Some("feature/polling".into());
        app.repo.remotes = vec![GitRemote {
            name: "origin".into(),
            url: "git@github.com:octo/widgets.git".into(),
        }];
        app.repo.selected_remote = Some("origin".into());
        app
    }

    fn summary(number: u64, title: &str) -> PrSummary {
        PrSummary {
            number,
            title: title.into(),
            url: format!("https://github.com/octo/widgets/pull/{}", number),
            is_draft: false,
            head_ref_name: "feature/polling".into(),
            base_ref_name: "main".into(),
            created_at: "2026-08-24T10:00:00Z".into(),
            author: crate::model::github::PrAuthor {
                login: "dana".into(),
                name: None,
            },
        }
    }

    #[test]
    fn poll_tick_refreshes_the_list_without_a_new_pr() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_on_branch(&dir);
        let key = FetchKey {
            branch: "feature/polling".into(),
            repo_slug: "octo/widgets".into(),
        };
        app.prs.begin_fetch(key.clone());
        app.prs
            .apply_prs_result(key, Ok(vec![summary(42, "old title")]));

        app.start_new_pr_flow(&StubGit {
            pushed_branch: Some("feature/polling".into()),
        });
        let generation = app.poll.due(Instant::now() + DEFAULT_INTERVAL).unwrap();

        // PR 42 was edited on the server between ticks; no new PR yet.
        app.handle_poll_fetch(generation, Ok(vec![summary(42, "new title")]));
        assert!(app.poll.is_active());
        assert_eq!(app.prs.prs[0].title, "new title");
        assert_eq!(app.prs.selected_number(), Some(42));
    }

    #[test]
    fn unpushed_branch_blocks_the_new_pr_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_on_branch(&dir);
        app.prs.begin_fetch(FetchKey {
            branch: "feature/polling".into(),
            repo_slug: "octo/widgets".into(),
        });

        app.start_new_pr_flow(&StubGit {
            pushed_branch: None,
        });

        assert!(!app.poll.is_active());
        assert_eq!(
            app.prs.prs_error.as_ref().map(|e| e.message.as_str()),
            Some("Push your branch to a remote first")
        );
        // The list itself is left alone.
        assert!(app.prs.loading_prs);
    }

    #[test]
    fn pushed_branch_starts_a_poll_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_on_branch(&dir);

        app.start_new_pr_flow(&StubGit {
            pushed_branch: Some("feature/polling".into()),
        });

        assert!(app.poll.is_active());
        assert_eq!(app.prs.prs_error, None);
    }
}
