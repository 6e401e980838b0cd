use std::path::PathBuf;

use crate::error::FetchError;
use crate::model::github::{PrDetail, PrSummary};
use crate::model::jira::{JiraIssue, SearchPage, Transition};

/// Identity of a branch-scoped PR fetch. A response whose key no longer
/// matches the current branch and remote is dropped by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    pub branch: String,
    pub repo_slug: String,
}

/// Identity of one browser page fetch. `epoch` pins the response to the
/// saved view and filter state that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTag {
    pub epoch: u64,
    pub start_at: usize,
    pub append: bool,
}

/// All events the app loop handles.
#[derive(Debug)]
pub enum AppEvent {
    /// A log file in the history directory was created or modified.
    LogChanged(PathBuf),
    /// Background load of PRs for the current branch completed.
    PrsLoaded {
        key: FetchKey,
        result: Result<Vec<PrSummary>, FetchError>,
    },
    /// Background load of one PR's full details completed.
    PrDetailsLoaded {
        key: FetchKey,
        number: u64,
        result: Result<PrDetail, FetchError>,
    },
    /// One polling fetch completed; `generation` ties it to its session.
    PollFetch {
        generation: u64,
        result: Result<Vec<PrSummary>, FetchError>,
    },
    /// Background load of all open PRs on the selected remote completed.
    AllPrsLoaded(Result<Vec<PrSummary>, FetchError>),
    /// Background load of a saved-view page completed.
    ViewIssuesLoaded {
        tag: PageTag,
        result: Result<SearchPage, FetchError>,
    },
    /// Background load of the branch's linked tickets completed.
    LinkedTicketsLoaded {
        branch: String,
        result: Result<Vec<JiraIssue>, FetchError>,
    },
    /// Available status transitions for an issue loaded.
    TransitionsLoaded {
        issue_key: String,
        result: Result<Vec<Transition>, FetchError>,
    },
    /// A status transition finished; reload follows on success.
    TransitionApplied {
        issue_key: String,
        result: Result<String, FetchError>,
    },
    /// Jira credential check finished: Ok carries the account id.
    JiraAuthChecked(Result<String, FetchError>),
    /// The browser-based PR creation flow exited: None = launched fine,
    /// Some = error message.
    PrCreationFlowDone(Option<String>),
}
