use serde::{Deserialize, Serialize};

/// A user-persisted reference to a Jira query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: String,
    pub name: String,
    pub source: ViewSource,
}

/// Where a saved view's issues come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewSource {
    Jql { jql: String },
    Filter { filter_id: String },
    Board { board_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    /// "active", "future", or "closed"; anything else sorts last.
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignee {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JiraIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<Assignee>,
    pub priority: Option<String>,
    pub issue_type: Option<String>,
    pub sprint: Option<Sprint>,
}

/// One page of a Jira search, plus the server-reported total.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub issues: Vec<JiraIssue>,
    pub total: usize,
}

/// A status transition available on an issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

/// Jira site credentials, persisted in the global store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraAuth {
    pub site_url: String,
    pub email: String,
    pub api_token: String,
}

impl JiraIssue {
    pub fn browse_url(&self, site_url: &str) -> String {
        format!("{}/browse/{}", site_url.trim_end_matches('/'), self.key)
    }

    /// Icon based on issue type.
    pub fn type_icon(&self) -> &'static str {
        match self
            .issue_type
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "bug" => "B",
            "story" => "S",
            "task" => "T",
            "epic" => "E",
            "sub-task" | "subtask" => "s",
            _ => "?",
        }
    }
}
