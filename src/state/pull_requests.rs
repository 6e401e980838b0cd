use crate::error::FetchError;
use crate::event::FetchKey;
use crate::model::github::{PrDetail, PrSummary};

/// PRs for the current branch plus the details pane, with stale-response
/// protection: every fetch is tagged with the branch and repo slug that
/// requested it, and a response whose tag no longer matches the latest
/// request is dropped.
///
/// Selection invariant: `selected` always names a PR present in `prs`, or
/// is None when the list is empty.
#[derive(Debug, Default)]
pub struct PullRequestCollection {
    pub prs: Vec<PrSummary>,
    selected: Option<u64>,
    pub details: Option<PrDetail>,
    pub loading_prs: bool,
    pub loading_details: bool,
    pub prs_error: Option<FetchError>,
    pub details_error: Option<FetchError>,
    last_requested: Option<FetchKey>,
    last_fetched: Option<FetchKey>,
}

impl PullRequestCollection {
    /// Record a new fetch as the one whose response we will accept. A key
    /// change empties the collection up front, so rows from the previous
    /// branch or remote are never visible during the transition.
    pub fn begin_fetch(&mut self, key: FetchKey) {
        if self.last_requested.as_ref() != Some(&key) {
            self.prs = Vec::new();
            self.selected = None;
            self.details = None;
            self.prs_error = None;
            self.details_error = None;
            self.last_fetched = None;
        }
        self.loading_prs = true;
        self.last_requested = Some(key);
    }

    /// The key of the last list fetch that was applied. Used to suppress
    /// duplicate fetches for an unchanged branch and remote.
    pub fn last_fetched(&self) -> Option<&FetchKey> {
        self.last_fetched.as_ref()
    }

    /// Apply a completed list fetch. Returns false when the response was
    /// stale and ignored.
    pub fn apply_prs_result(
        &mut self,
        key: FetchKey,
        result: Result<Vec<PrSummary>, FetchError>,
    ) -> bool {
        if self.last_requested.as_ref() != Some(&key) {
            return false;
        }
        self.loading_prs = false;
        match result {
            Ok(prs) => {
                // Keep the selection when the same PR is still present,
                // otherwise select the first entry of the fresh list. Any
                // selection that does not survive takes its details with it,
                // including the empty-list case.
                let keep = self
                    .selected
                    .filter(|n| prs.iter().any(|pr| pr.number == *n));
                if keep.is_none() {
                    self.details = None;
                    self.details_error = None;
                }
                self.selected = keep.or_else(|| prs.first().map(|pr| pr.number));
                self.prs = prs;
                self.prs_error = None;
                self.last_fetched = Some(key);
            }
            Err(err) => {
                self.prs = Vec::new();
                self.selected = None;
                self.details = None;
                self.prs_error = Some(err);
                self.last_fetched = None;
            }
        }
        true
    }

    pub fn selected_pr(&self) -> Option<&PrSummary> {
        let number = self.selected?;
        self.prs.iter().find(|pr| pr.number == number)
    }

    pub fn selected_number(&self) -> Option<u64> {
        self.selected
    }

    /// Select a PR by number. Returns true when the selection changed to a
    /// PR actually in the list.
    pub fn select(&mut self, number: u64) -> bool {
        if !self.prs.iter().any(|pr| pr.number == number) {
            return false;
        }
        if self.selected == Some(number) {
            return false;
        }
        self.selected = Some(number);
        self.details = None;
        self.details_error = None;
        true
    }

    pub fn select_next(&mut self) -> bool {
        let index = self.selected_index().map(|i| i + 1).unwrap_or(0);
        match self.prs.get(index).map(|pr| pr.number) {
            Some(number) => self.select(number),
            None => false,
        }
    }

    pub fn select_previous(&mut self) -> bool {
        match self.selected_index() {
            Some(index) if index > 0 => {
                let number = self.prs[index - 1].number;
                self.select(number)
            }
            _ => false,
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let number = self.selected?;
        self.prs.iter().position(|pr| pr.number == number)
    }

    pub fn begin_details_fetch(&mut self) {
        self.loading_details = true;
        self.details_error = None;
    }

    /// Apply a completed details fetch. Dropped when the list key went
    /// stale or the selection moved on while the fetch was in flight.
    pub fn apply_details_result(
        &mut self,
        key: &FetchKey,
        number: u64,
        result: Result<PrDetail, FetchError>,
    ) -> bool {
        if self.last_requested.as_ref() != Some(key) || self.selected != Some(number) {
            return false;
        }
        self.loading_details = false;
        match result {
            Ok(detail) => {
                self.details = Some(detail);
                self.details_error = None;
            }
            Err(err) => {
                self.details = None;
                self.details_error = Some(err);
            }
        }
        true
    }

    /// Forget everything, e.g. when the repo context is torn down.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(branch: &str) -> FetchKey {
        FetchKey {
            branch: branch.into(),
            repo_slug: "octo/widgets".into(),
        }
    }

    fn pr(number: u64) -> PrSummary {
        PrSummary {
            number,
            title: format!("PR {}", number),
            url: format!("https://github.com/octo/widgets/pull/{}", number),
            is_draft: false,
            head_ref_name: "feature".into(),
            base_ref_name: "main".into(),
            created_at: "2026-08-24T10:00:00Z".into(),
            author: crate::model::github::PrAuthor {
                login: "dana".into(),
                name: None,
            },
        }
    }

    fn detail(number: u64) -> PrDetail {
        PrDetail {
            number,
            title: format!("PR {}", number),
            state: "OPEN".into(),
            url: String::new(),
            body: None,
            is_draft: false,
            head_ref_name: "feature".into(),
            base_ref_name: "main".into(),
            additions: 1,
            deletions: 0,
            review_decision: None,
            mergeable: None,
            author: crate::model::github::PrAuthor {
                login: "dana".into(),
                name: None,
            },
            labels: Vec::new(),
        }
    }

    #[test]
    fn stale_response_after_branch_switch_is_dropped() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("feature/a"));
        // Branch switches before the first response arrives.
        collection.begin_fetch(key("feature/b"));

        let applied = collection.apply_prs_result(key("feature/a"), Ok(vec![pr(1)]));
        assert!(!applied);
        assert_eq!(collection.prs.len(), 0);
        assert!(collection.loading_prs);

        let applied = collection.apply_prs_result(key("feature/b"), Ok(vec![pr(2)]));
        assert!(applied);
        assert_eq!(collection.selected_number(), Some(2));
        assert!(!collection.loading_prs);
    }

    #[test]
    fn fresh_list_selects_first_entry() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(5), pr(3)]));
        assert_eq!(collection.selected_number(), Some(5));
        assert_eq!(collection.selected_pr().map(|p| p.number), Some(5));
    }

    #[test]
    fn refresh_keeps_selection_when_pr_survives() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(5), pr(3)]));
        assert!(collection.select(3));

        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(5), pr(3), pr(9)]));
        assert_eq!(collection.selected_number(), Some(3));

        // When the selected PR disappears, selection falls to the first.
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(9)]));
        assert_eq!(collection.selected_number(), Some(9));
    }

    #[test]
    fn selection_cannot_leave_the_list() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(1), pr(2)]));

        assert!(!collection.select(99));
        assert_eq!(collection.selected_number(), Some(1));

        assert!(collection.select_next());
        assert!(!collection.select_next());
        assert_eq!(collection.selected_number(), Some(2));
        assert!(collection.select_previous());
        assert!(!collection.select_previous());
        assert_eq!(collection.selected_number(), Some(1));
    }

    #[test]
    fn branch_switch_empties_the_list_before_the_response() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("feature/a"));
        collection.apply_prs_result(key("feature/a"), Ok(vec![pr(1)]));
        collection.begin_details_fetch();
        collection.apply_details_result(&key("feature/a"), 1, Ok(detail(1)));

        // The old branch's rows disappear at fetch start, not at response
        // time.
        collection.begin_fetch(key("feature/b"));
        assert_eq!(collection.prs.len(), 0);
        assert_eq!(collection.selected_number(), None);
        assert_eq!(collection.details, None);
        assert!(collection.loading_prs);
    }

    #[test]
    fn empty_refresh_clears_selection_and_details() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(1)]));
        collection.begin_details_fetch();
        collection.apply_details_result(&key("main"), 1, Ok(detail(1)));
        assert!(collection.details.is_some());

        // The PR was merged elsewhere; a refresh of the same key comes back
        // empty and must not leave details for a selection that is gone.
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![]));
        assert_eq!(collection.selected_number(), None);
        assert_eq!(collection.details, None);
        assert_eq!(collection.details_error, None);
    }

    #[test]
    fn error_clears_list_and_selection() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(1)]));

        collection.begin_fetch(key("main"));
        collection.apply_prs_result(
            key("main"),
            Err(FetchError::api("boom")),
        );
        assert_eq!(collection.prs.len(), 0);
        assert_eq!(collection.selected_number(), None);
        assert!(collection.prs_error.is_some());
        assert_eq!(collection.last_fetched(), None);
    }

    #[test]
    fn stale_details_are_dropped() {
        let mut collection = PullRequestCollection::default();
        collection.begin_fetch(key("main"));
        collection.apply_prs_result(key("main"), Ok(vec![pr(1), pr(2)]));
        collection.begin_details_fetch();

        // Selection moves before the details for PR 1 arrive.
        collection.select(2);
        let applied = collection.apply_details_result(&key("main"), 1, Ok(detail(1)));
        assert!(!applied);
        assert_eq!(collection.details, None);
    }
}
