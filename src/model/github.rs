use serde::Deserialize;

/// A git remote as reported by `git remote -v`, unique by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRemote {
    pub name: String,
    pub url: String,
}

/// Lightweight PR record from `gh pr list`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSummary {
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub is_draft: bool,
    pub head_ref_name: String,
    pub base_ref_name: String,
    pub created_at: String,
    pub author: PrAuthor,
}

/// Fully hydrated PR record from `gh pr view`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrDetail {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: String,
    pub body: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
    pub head_ref_name: String,
    pub base_ref_name: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    pub review_decision: Option<String>,
    pub mergeable: Option<String>,
    pub author: PrAuthor,
    #[serde(default)]
    pub labels: Vec<PrLabel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrAuthor {
    pub login: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrLabel {
    pub name: String,
}

impl PrDetail {
    /// Size label based on total changes (additions + deletions).
    pub fn size_label(&self) -> &'static str {
        let total = self.additions + self.deletions;
        match total {
            0..=9 => "XS",
            10..=49 => "S",
            50..=249 => "M",
            250..=999 => "L",
            _ => "XL",
        }
    }

    /// Review status icon.
    pub fn review_icon(&self) -> &'static str {
        match self.review_decision.as_deref() {
            Some("APPROVED") => "[+]",
            Some("CHANGES_REQUESTED") => "[!]",
            Some("REVIEW_REQUIRED") => "[?]",
            _ => "[ ]",
        }
    }
}
