//! Focus coordination: which view and sub-pane own keyboard input, and
//! which key hints the footer should show for that state.
//!
//! `compute_keybindings` is a pure mapping so it can be unit tested without
//! a terminal. The footer appends the global set (or just Cancel when a
//! modal is open) via `bindings_with_globals`.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keybinding {
    pub key: &'static str,
    pub label: &'static str,
    pub color: Option<Color>,
}

const fn kb(key: &'static str, label: &'static str) -> Keybinding {
    Keybinding {
        key,
        label,
        color: None,
    }
}

const fn kbc(key: &'static str, label: &'static str, color: Color) -> Keybinding {
    Keybinding {
        key,
        label,
        color: Some(color),
    }
}

/// Top-level views, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    GitHub,
    Jira,
    Logs,
    JiraBrowser,
    PullRequests,
}

pub const ALL_VIEWS: [ActiveView; 5] = [
    ActiveView::GitHub,
    ActiveView::Jira,
    ActiveView::Logs,
    ActiveView::JiraBrowser,
    ActiveView::PullRequests,
];

impl ActiveView {
    pub fn title(&self) -> &'static str {
        match self {
            ActiveView::GitHub => "GitHub",
            ActiveView::Jira => "Jira",
            ActiveView::Logs => "Logs",
            ActiveView::JiraBrowser => "Browser",
            ActiveView::PullRequests => "All PRs",
        }
    }
}

/// Which box inside the GitHub view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubBox {
    Remotes,
    Prs,
    Details,
}

/// Domain state of the linked-tickets Jira view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JiraState {
    NotConfigured,
    NoTickets,
    HasTickets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogsBox {
    History,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserBox {
    SavedViews,
    Browser,
}

/// Per-view sub-state snapshot fed into the keybinding computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewKeyState {
    pub github_box: GitHubBox,
    pub jira_state: JiraState,
    pub jira_modal_open: bool,
    pub logs_box: LogsBox,
    pub browser_box: BrowserBox,
    pub browser_modal_open: bool,
}

impl Default for ViewKeyState {
    fn default() -> Self {
        Self {
            github_box: GitHubBox::Remotes,
            jira_state: JiraState::NotConfigured,
            jira_modal_open: false,
            logs_box: LogsBox::History,
            browser_box: BrowserBox::SavedViews,
            browser_modal_open: false,
        }
    }
}

const GITHUB_REMOTES: &[Keybinding] = &[kb("Enter", "Select Remote")];
const GITHUB_PRS: &[Keybinding] = &[
    kb("Enter", "Select"),
    kbc("n", "New PR", Color::Green),
    kb("r", "Refresh"),
    kbc("o", "Open", Color::Green),
    kb("y", "Copy Link"),
];
const GITHUB_DETAILS: &[Keybinding] = &[kb("r", "Refresh"), kbc("o", "Open", Color::Green)];

const JIRA_NOT_CONFIGURED: &[Keybinding] = &[kb("c", "Configure Jira")];
const JIRA_NO_TICKETS: &[Keybinding] = &[
    kb("t", "Link Ticket"),
    kbc("R", "Remove Config", Color::Red),
];
const JIRA_HAS_TICKETS: &[Keybinding] = &[
    kb("t", "Link"),
    kb("s", "Status"),
    kbc("d", "Unlink", Color::Red),
    kbc("o", "Open", Color::Green),
    kb("y", "Copy Link"),
    kbc("R", "Remove Config", Color::Red),
];

const LOGS_HISTORY: &[Keybinding] = &[kb("Enter", "View")];
const LOGS_VIEWER: &[Keybinding] = &[kb("j/k", "Scroll"), kb("g/G", "Top/Bottom")];

const BROWSER_SAVED_VIEWS: &[Keybinding] = &[
    kb("Enter", "Select"),
    kbc("a", "Add View", Color::Green),
    kb("e", "Rename"),
    kbc("d", "Delete", Color::Red),
];
const BROWSER_ISSUES: &[Keybinding] = &[
    kb("/", "Filter"),
    kb("u", "Unassigned"),
    kb("m", "Mine"),
    kb("x", "Clear Filters"),
    kb("L", "Load More"),
    kbc("o", "Open", Color::Green),
    kb("y", "Copy Link"),
    kb("r", "Refresh"),
];

const ALL_PRS: &[Keybinding] = &[
    kb("r", "Refresh"),
    kbc("o", "Open", Color::Green),
    kb("y", "Copy Link"),
];

const GLOBAL: &[Keybinding] = &[
    kb("1-5", "View"),
    kb("Tab", "Cycle"),
    kb("h/l", "Pane"),
    kb("q", "Quit"),
];
const MODAL: &[Keybinding] = &[kb("Esc", "Cancel")];

/// Contextual key hints for the active view.
///
/// A modal open on the active view suppresses its normal bindings entirely;
/// the caller appends the generic Cancel binding.
pub fn compute_keybindings(view: ActiveView, state: &ViewKeyState) -> Vec<Keybinding> {
    match view {
        ActiveView::GitHub => match state.github_box {
            GitHubBox::Remotes => GITHUB_REMOTES.to_vec(),
            GitHubBox::Prs => GITHUB_PRS.to_vec(),
            GitHubBox::Details => GITHUB_DETAILS.to_vec(),
        },
        ActiveView::Jira => {
            if state.jira_modal_open {
                return Vec::new();
            }
            match state.jira_state {
                JiraState::NotConfigured => JIRA_NOT_CONFIGURED.to_vec(),
                JiraState::NoTickets => JIRA_NO_TICKETS.to_vec(),
                JiraState::HasTickets => JIRA_HAS_TICKETS.to_vec(),
            }
        }
        ActiveView::Logs => match state.logs_box {
            LogsBox::History => LOGS_HISTORY.to_vec(),
            LogsBox::Viewer => LOGS_VIEWER.to_vec(),
        },
        ActiveView::JiraBrowser => {
            if state.browser_modal_open {
                return Vec::new();
            }
            match state.browser_box {
                BrowserBox::SavedViews => BROWSER_SAVED_VIEWS.to_vec(),
                BrowserBox::Browser => BROWSER_ISSUES.to_vec(),
            }
        }
        ActiveView::PullRequests => ALL_PRS.to_vec(),
    }
}

/// Contextual bindings plus the fixed global set, or plus only Cancel when
/// any modal is open.
pub fn bindings_with_globals(
    view: ActiveView,
    state: &ViewKeyState,
    modal_open: bool,
) -> Vec<Keybinding> {
    let mut bindings = compute_keybindings(view, state);
    if modal_open {
        bindings.extend_from_slice(MODAL);
    } else {
        bindings.extend_from_slice(GLOBAL);
    }
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn jira_modal_suppresses_contextual_bindings() {
        // Regardless of the domain state, an open modal yields no bindings.
        for jira_state in [
            JiraState::NotConfigured,
            JiraState::NoTickets,
            JiraState::HasTickets,
        ] {
            let state = ViewKeyState {
                jira_state,
                jira_modal_open: true,
                ..ViewKeyState::default()
            };
            assert_eq!(compute_keybindings(ActiveView::Jira, &state), Vec::new());
        }
    }

    #[test]
    fn jira_state_selects_binding_set() {
        let mut state = ViewKeyState {
            jira_state: JiraState::HasTickets,
            ..ViewKeyState::default()
        };
        let bindings = compute_keybindings(ActiveView::Jira, &state);
        assert!(bindings.iter().any(|b| b.label == "Status"));

        state.jira_state = JiraState::NotConfigured;
        let bindings = compute_keybindings(ActiveView::Jira, &state);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].label, "Configure Jira");
    }

    #[test]
    fn github_box_selects_binding_set() {
        let mut state = ViewKeyState::default();
        state.github_box = GitHubBox::Prs;
        let bindings = compute_keybindings(ActiveView::GitHub, &state);
        assert!(bindings.iter().any(|b| b.label == "New PR"));

        state.github_box = GitHubBox::Details;
        let bindings = compute_keybindings(ActiveView::GitHub, &state);
        assert_eq!(bindings.iter().map(|b| b.key).collect::<Vec<_>>(), ["r", "o"]);
    }

    #[test]
    fn globals_appended_only_without_modal() {
        let state = ViewKeyState::default();
        let open = bindings_with_globals(ActiveView::Logs, &state, false);
        assert!(open.iter().any(|b| b.label == "Quit"));

        let modal = bindings_with_globals(ActiveView::Logs, &state, true);
        assert!(modal.iter().any(|b| b.label == "Cancel"));
        assert!(!modal.iter().any(|b| b.label == "Quit"));
    }

    #[test]
    fn browser_modal_leaves_only_cancel() {
        let state = ViewKeyState {
            browser_box: BrowserBox::Browser,
            browser_modal_open: true,
            ..ViewKeyState::default()
        };
        let bindings = bindings_with_globals(ActiveView::JiraBrowser, &state, true);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].key, "Esc");
    }

    #[test]
    fn computation_is_deterministic() {
        let state = ViewKeyState::default();
        for view in ALL_VIEWS {
            assert_eq!(
                compute_keybindings(view, &state),
                compute_keybindings(view, &state)
            );
        }
    }
}
