use crate::error::FetchError;
use crate::event::PageTag;
use crate::model::jira::{JiraIssue, SavedView, SearchPage};

pub const PAGE_SIZE: usize = 50;

/// Client-side assignee filter applied on top of the server query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Unassigned,
    Mine,
}

/// A renderable row: sprint group headers interleaved with issues. Only
/// issue rows are navigable.
#[derive(Debug, PartialEq)]
pub enum BrowserRow<'a> {
    Header(String),
    Issue(&'a JiraIssue),
}

/// Issues for the selected saved view, paged from the server and grouped
/// by sprint for display.
///
/// Every fetch carries an epoch; selecting a view or editing the search
/// text bumps it, so pages from a superseded query are dropped on arrival.
/// The highlight indexes the navigable (issue) rows and is clamped
/// whenever the filtered set shrinks.
#[derive(Debug, Default)]
pub struct SavedViewIssueBrowser {
    pub view: Option<SavedView>,
    issues: Vec<JiraIssue>,
    pub total: usize,
    pub search_text: String,
    pub assignee_filter: AssigneeFilter,
    pub my_account_id: Option<String>,
    highlighted: usize,
    pub loading: bool,
    pub error: Option<FetchError>,
    epoch: u64,
}

impl SavedViewIssueBrowser {
    /// Switch to a different saved view, discarding everything loaded for
    /// the previous one.
    pub fn set_view(&mut self, view: Option<SavedView>) {
        self.view = view;
        self.issues = Vec::new();
        self.total = 0;
        self.search_text = String::new();
        self.assignee_filter = AssigneeFilter::All;
        self.highlighted = 0;
        self.loading = false;
        self.error = None;
        self.epoch += 1;
    }

    /// Update the server-side search text. In-flight pages for the old
    /// text become stale.
    pub fn set_search_text(&mut self, text: String) {
        if self.search_text == text {
            return;
        }
        self.search_text = text;
        self.highlighted = 0;
        self.epoch += 1;
    }

    pub fn set_assignee_filter(&mut self, filter: AssigneeFilter) {
        if self.assignee_filter == filter {
            return;
        }
        self.assignee_filter = filter;
        self.highlighted = 0;
    }

    pub fn clear_filters(&mut self) {
        self.assignee_filter = AssigneeFilter::All;
        if !self.search_text.is_empty() {
            self.search_text.clear();
            self.epoch += 1;
        }
        self.highlighted = 0;
    }

    /// Start a fetch and return the tag the response must echo. An append
    /// fetch continues from the loaded count; otherwise page one reloads.
    pub fn begin_fetch(&mut self, append: bool) -> PageTag {
        self.loading = true;
        PageTag {
            epoch: self.epoch,
            start_at: if append { self.issues.len() } else { 0 },
            append,
        }
    }

    /// Apply a completed page fetch. Returns false when the tag belongs to
    /// a superseded query.
    pub fn apply_fetch(&mut self, tag: PageTag, result: Result<SearchPage, FetchError>) -> bool {
        if tag.epoch != self.epoch {
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                if tag.append {
                    self.issues.extend(page.issues);
                } else {
                    self.issues = page.issues;
                }
                self.total = page.total;
                self.error = None;
                self.clamp_highlight();
            }
            Err(err) => {
                // A failed reload leaves nothing trustworthy to show; a
                // failed append keeps the pages already loaded.
                if !tag.append {
                    self.issues = Vec::new();
                    self.total = 0;
                    self.highlighted = 0;
                }
                self.error = Some(err);
            }
        }
        true
    }

    pub fn has_more(&self) -> bool {
        self.issues.len() < self.total
    }

    pub fn loaded_count(&self) -> usize {
        self.issues.len()
    }

    /// Issues passing the client-side assignee filter, in load order.
    pub fn filtered(&self) -> Vec<&JiraIssue> {
        self.issues
            .iter()
            .filter(|issue| match self.assignee_filter {
                AssigneeFilter::All => true,
                AssigneeFilter::Unassigned => issue.assignee.is_none(),
                AssigneeFilter::Mine => match (&issue.assignee, &self.my_account_id) {
                    (Some(assignee), Some(me)) => assignee.account_id == *me,
                    _ => false,
                },
            })
            .collect()
    }

    /// Display rows. When any issue carries a sprint, issues are grouped
    /// under sprint headers ordered active, future, closed, other, with
    /// sprint-less issues in a trailing Backlog group. When no issue has a
    /// sprint the list renders flat, without headers.
    pub fn rows(&self) -> Vec<BrowserRow<'_>> {
        let filtered = self.filtered();
        if !filtered.iter().any(|issue| issue.sprint.is_some()) {
            return filtered.into_iter().map(BrowserRow::Issue).collect();
        }

        // Groups in first-appearance order, then stably ranked by state.
        let mut groups: Vec<(u8, String, Vec<&JiraIssue>)> = Vec::new();
        let mut backlog: Vec<&JiraIssue> = Vec::new();
        for issue in filtered {
            let Some(sprint) = &issue.sprint else {
                backlog.push(issue);
                continue;
            };
            match groups.iter_mut().find(|(_, name, _)| *name == sprint.name) {
                Some((_, _, members)) => members.push(issue),
                None => groups.push((sprint_rank(&sprint.state), sprint.name.clone(), vec![issue])),
            }
        }
        groups.sort_by_key(|(rank, _, _)| *rank);

        let mut rows = Vec::new();
        for (_, name, members) in &groups {
            rows.push(BrowserRow::Header(format!("{} ({})", name, members.len())));
            rows.extend(members.iter().map(|issue| BrowserRow::Issue(issue)));
        }
        if !backlog.is_empty() {
            rows.push(BrowserRow::Header(format!("Backlog ({})", backlog.len())));
            rows.extend(backlog.into_iter().map(BrowserRow::Issue));
        }
        rows
    }

    /// Row indices that can hold the highlight, in display order.
    pub fn navigable_indices(&self) -> Vec<usize> {
        self.rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| matches!(row, BrowserRow::Issue(_)).then_some(i))
            .collect()
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    /// The row index the highlight sits on, for rendering.
    pub fn highlighted_row(&self) -> Option<usize> {
        self.navigable_indices().get(self.highlighted).copied()
    }

    pub fn highlighted_issue(&self) -> Option<&JiraIssue> {
        let row = self.highlighted_row()?;
        match self.rows().into_iter().nth(row)? {
            BrowserRow::Issue(issue) => {
                let key = issue.key.clone();
                self.issues.iter().find(|i| i.key == key)
            }
            BrowserRow::Header(_) => None,
        }
    }

    pub fn move_down(&mut self) {
        let count = self.navigable_count();
        if count > 0 && self.highlighted + 1 < count {
            self.highlighted += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    fn navigable_count(&self) -> usize {
        self.filtered().len()
    }

    fn clamp_highlight(&mut self) {
        let count = self.navigable_count();
        if count == 0 {
            self.highlighted = 0;
        } else if self.highlighted >= count {
            self.highlighted = count - 1;
        }
    }
}

fn sprint_rank(state: &str) -> u8 {
    match state {
        "active" => 0,
        "future" => 1,
        "closed" => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::jira::{Assignee, Sprint, ViewSource};
    use pretty_assertions::assert_eq;

    fn issue(key: &str, sprint: Option<(&str, &str)>) -> JiraIssue {
        JiraIssue {
            key: key.into(),
            summary: format!("Summary {}", key),
            status: "To Do".into(),
            assignee: None,
            priority: None,
            issue_type: None,
            sprint: sprint.map(|(name, state)| Sprint {
                name: name.into(),
                state: state.into(),
            }),
        }
    }

    fn page(issues: Vec<JiraIssue>, total: usize) -> SearchPage {
        SearchPage { issues, total }
    }

    fn view(name: &str) -> SavedView {
        SavedView {
            id: name.into(),
            name: name.into(),
            source: ViewSource::Jql {
                jql: "project = PROJ".into(),
            },
        }
    }

    #[test]
    fn groups_order_active_future_closed_then_backlog() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(
            tag,
            Ok(page(
                vec![
                    issue("P-1", Some(("Sprint 9", "closed"))),
                    issue("P-2", None),
                    issue("P-3", Some(("Sprint 11", "future"))),
                    issue("P-4", Some(("Sprint 10", "active"))),
                    issue("P-5", Some(("Sprint 10", "active"))),
                ],
                5,
            )),
        );

        let rows = browser.rows();
        let headers: Vec<&str> = rows
            .iter()
            .filter_map(|row| match row {
                BrowserRow::Header(h) => Some(h.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            ["Sprint 10 (2)", "Sprint 11 (1)", "Sprint 9 (1)", "Backlog (1)"]
        );
    }

    #[test]
    fn no_sprints_means_flat_list_without_headers() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(
            tag,
            Ok(page(vec![issue("P-1", None), issue("P-2", None)], 2)),
        );
        let rows = browser.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| matches!(row, BrowserRow::Issue(_))));
    }

    #[test]
    fn highlight_skips_headers_and_clamps_when_list_shrinks() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(
            tag,
            Ok(page(
                vec![
                    issue("P-1", Some(("Sprint 10", "active"))),
                    issue("P-2", Some(("Sprint 10", "active"))),
                    issue("P-3", None),
                ],
                3,
            )),
        );

        // Row 0 is a header; the first navigable row is row 1.
        assert_eq!(browser.highlighted_row(), Some(1));
        browser.move_down();
        browser.move_down();
        assert_eq!(browser.highlighted_issue().map(|i| i.key.as_str()), Some("P-3"));
        browser.move_down();
        assert_eq!(browser.highlighted_issue().map(|i| i.key.as_str()), Some("P-3"));

        // Reload with fewer issues: highlight clamps to the last entry.
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(tag, Ok(page(vec![issue("P-1", None)], 1)));
        assert_eq!(browser.highlighted_index(), 0);
        assert_eq!(browser.highlighted_issue().map(|i| i.key.as_str()), Some("P-1"));
    }

    #[test]
    fn switching_views_resets_everything_and_stales_old_pages() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("sprint")));
        let old_tag = browser.begin_fetch(false);

        browser.set_view(Some(view("bugs")));
        let applied = browser.apply_fetch(old_tag, Ok(page(vec![issue("P-1", None)], 1)));
        assert!(!applied);
        assert_eq!(browser.loaded_count(), 0);

        let tag = browser.begin_fetch(false);
        assert!(browser.apply_fetch(tag, Ok(page(vec![issue("P-9", None)], 1))));
        assert_eq!(browser.loaded_count(), 1);
    }

    #[test]
    fn append_failure_keeps_loaded_pages_reload_failure_clears() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(tag, Ok(page(vec![issue("P-1", None)], 3)));
        assert!(browser.has_more());

        let append_tag = browser.begin_fetch(true);
        assert_eq!(append_tag.start_at, 1);
        browser.apply_fetch(append_tag, Err(FetchError::api("boom")));
        assert_eq!(browser.loaded_count(), 1);
        assert!(browser.error.is_some());

        let reload_tag = browser.begin_fetch(false);
        browser.apply_fetch(reload_tag, Err(FetchError::api("boom")));
        assert_eq!(browser.loaded_count(), 0);
        assert_eq!(browser.total, 0);
    }

    #[test]
    fn pagination_appends_and_tracks_has_more() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(tag, Ok(page(vec![issue("P-1", None), issue("P-2", None)], 3)));
        assert!(browser.has_more());

        let tag = browser.begin_fetch(true);
        assert_eq!(tag.start_at, 2);
        browser.apply_fetch(tag, Ok(page(vec![issue("P-3", None)], 3)));
        assert_eq!(browser.loaded_count(), 3);
        assert!(!browser.has_more());
    }

    #[test]
    fn assignee_filter_is_client_side_and_resets_highlight() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.my_account_id = Some("me".into());
        browser.set_view(Some(view("all")));
        let mut with_assignee = issue("P-2", None);
        with_assignee.assignee = Some(Assignee {
            account_id: "me".into(),
            display_name: "Dana".into(),
        });
        let tag = browser.begin_fetch(false);
        browser.apply_fetch(
            tag,
            Ok(page(vec![issue("P-1", None), with_assignee], 2)),
        );
        browser.move_down();
        assert_eq!(browser.highlighted_index(), 1);

        browser.set_assignee_filter(AssigneeFilter::Mine);
        assert_eq!(browser.highlighted_index(), 0);
        let keys: Vec<&str> = browser.filtered().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["P-2"]);

        browser.set_assignee_filter(AssigneeFilter::Unassigned);
        let keys: Vec<&str> = browser.filtered().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["P-1"]);
    }

    #[test]
    fn editing_search_text_stales_inflight_pages() {
        let mut browser = SavedViewIssueBrowser::default();
        browser.set_view(Some(view("all")));
        let tag = browser.begin_fetch(false);
        browser.set_search_text("login".into());
        assert!(!browser.apply_fetch(tag, Ok(page(vec![issue("P-1", None)], 1))));
    }
}
