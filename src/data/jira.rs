use serde_json::Value;

use crate::error::{ErrorKind, FetchError};
use crate::model::jira::{Assignee, JiraAuth, JiraIssue, SearchPage, Sprint, Transition};

use super::{wait_with_output, COMMAND_TIMEOUT};

const SEARCH_FIELDS: &str = "summary,status,assignee,priority,issuetype";

/// Issue a Jira REST request through curl with basic auth. The response body
/// and HTTP status come back on one stream; the status is the final line.
fn curl_json(
    auth: &JiraAuth,
    method: &str,
    path: &str,
    body: Option<&Value>,
) -> Result<Value, FetchError> {
    let url = format!("{}{}", auth.site_url.trim_end_matches('/'), path);
    let credentials = format!("{}:{}", auth.email, auth.api_token);

    let mut args: Vec<String> = vec![
        "-s".into(),
        "-w".into(),
        "\n%{http_code}".into(),
        "-X".into(),
        method.into(),
        "-u".into(),
        credentials,
        "-H".into(),
        "Accept: application/json".into(),
    ];
    let body_str;
    if let Some(body) = body {
        body_str = serde_json::to_string(body).map_err(|err| FetchError::api(err.to_string()))?;
        args.push("-H".into());
        args.push("Content-Type: application/json".into());
        args.push("-d".into());
        args.push(body_str);
    }
    args.push(url);

    let mut child = match std::process::Command::new("curl")
        .args(&args)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(FetchError::new(ErrorKind::NotInstalled, "curl is not installed"));
        }
        Err(err) => return Err(FetchError::api(format!("failed to run curl: {}", err))),
    };

    let output = wait_with_output(&mut child, COMMAND_TIMEOUT)
        .map_err(|err| FetchError::api(err.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FetchError::api(format!("curl failed: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (payload, code) = match stdout.rsplit_once('\n') {
        Some((payload, code)) => (payload, code.trim()),
        None => ("", stdout.trim()),
    };
    let status: u16 = code
        .parse()
        .map_err(|_| FetchError::api("malformed response from curl"))?;

    match status {
        200..=299 => {
            if payload.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(payload).map_err(|err| FetchError::api(err.to_string()))
        }
        401 | 403 => Err(FetchError::new(
            ErrorKind::AuthError,
            "Jira rejected the credentials; check email and API token",
        )),
        404 => Err(FetchError::new(ErrorKind::NotFound, "Jira resource not found")),
        _ => Err(FetchError::api(format!(
            "Jira returned HTTP {}: {}",
            status,
            first_error_message(payload).unwrap_or_else(|| payload.trim().to_string())
        ))),
    }
}

fn first_error_message(payload: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    value
        .get("errorMessages")
        .and_then(|m| m.as_array())
        .and_then(|m| m.first())
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

/// The authenticated user's account id, used for the "Mine" filter.
pub fn myself(auth: &JiraAuth) -> Result<String, FetchError> {
    let value = curl_json(auth, "GET", "/rest/api/3/myself", None)?;
    value
        .get("accountId")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| FetchError::api("myself response missing accountId"))
}

/// One page of a JQL search.
pub fn search_issues(
    auth: &JiraAuth,
    jql: &str,
    start_at: usize,
    max_results: usize,
) -> Result<SearchPage, FetchError> {
    let path = format!(
        "/rest/api/3/search?jql={}&startAt={}&maxResults={}&fields={}",
        url_encode(jql),
        start_at,
        max_results,
        SEARCH_FIELDS
    );
    let value = curl_json(auth, "GET", &path, None)?;
    parse_search_page(&value)
}

/// The JQL behind a saved Jira filter.
pub fn get_filter_jql(auth: &JiraAuth, filter_id: &str) -> Result<String, FetchError> {
    let path = format!("/rest/api/3/filter/{}", url_encode(filter_id));
    let value = curl_json(auth, "GET", &path, None)?;
    value
        .get("jql")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| FetchError::api("filter response missing jql"))
}

/// One page of a board's issues via the agile API, which hydrates the
/// sprint field.
pub fn board_issues(
    auth: &JiraAuth,
    board_id: &str,
    start_at: usize,
    max_results: usize,
) -> Result<SearchPage, FetchError> {
    let path = format!(
        "/rest/agile/1.0/board/{}/issue?startAt={}&maxResults={}&fields={},sprint",
        url_encode(board_id),
        start_at,
        max_results,
        SEARCH_FIELDS
    );
    let value = curl_json(auth, "GET", &path, None)?;
    parse_search_page(&value)
}

/// Fetch specific issues by key, preserving the requested order.
pub fn issues_by_keys(auth: &JiraAuth, keys: &[String]) -> Result<Vec<JiraIssue>, FetchError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let jql = format!("key in ({})", keys.join(","));
    let page = search_issues(auth, &jql, 0, keys.len().max(50))?;
    let mut issues = page.issues;
    issues.sort_by_key(|issue| keys.iter().position(|k| *k == issue.key));
    Ok(issues)
}

pub fn get_transitions(auth: &JiraAuth, issue_key: &str) -> Result<Vec<Transition>, FetchError> {
    let path = format!("/rest/api/3/issue/{}/transitions", url_encode(issue_key));
    let value = curl_json(auth, "GET", &path, None)?;
    let transitions = value
        .get("transitions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::api("transitions response missing list"))?;
    Ok(transitions
        .iter()
        .filter_map(|t| {
            Some(Transition {
                id: t.get("id")?.as_str()?.to_string(),
                name: t.get("name")?.as_str()?.to_string(),
            })
        })
        .collect())
}

pub fn do_transition(
    auth: &JiraAuth,
    issue_key: &str,
    transition_id: &str,
) -> Result<(), FetchError> {
    let path = format!("/rest/api/3/issue/{}/transitions", url_encode(issue_key));
    let body = serde_json::json!({ "transition": { "id": transition_id } });
    curl_json(auth, "POST", &path, Some(&body))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_search_page(value: &Value) -> Result<SearchPage, FetchError> {
    let issues = value
        .get("issues")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::api("search response missing issues"))?;
    let total = value
        .get("total")
        .and_then(|v| v.as_u64())
        .unwrap_or(issues.len() as u64) as usize;
    Ok(SearchPage {
        issues: issues.iter().filter_map(parse_issue).collect(),
        total,
    })
}

fn parse_issue(value: &Value) -> Option<JiraIssue> {
    let key = value.get("key")?.as_str()?.to_string();
    let fields = value.get("fields")?;
    let summary = fields
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let status = fields
        .pointer("/status/name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string();
    let assignee = fields.get("assignee").and_then(|a| {
        Some(Assignee {
            account_id: a.get("accountId")?.as_str()?.to_string(),
            display_name: a
                .get("displayName")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        })
    });
    let priority = fields
        .pointer("/priority/name")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());
    let issue_type = fields
        .pointer("/issuetype/name")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());
    Some(JiraIssue {
        key,
        summary,
        status,
        assignee,
        priority,
        issue_type,
        sprint: extract_sprint(fields),
    })
}

/// Find the issue's sprint. The agile API returns `fields.sprint`; plain
/// search responses carry sprints in a customfield whose shape we detect by
/// its members.
fn extract_sprint(fields: &Value) -> Option<Sprint> {
    if let Some(sprint) = fields.get("sprint").and_then(parse_sprint) {
        return Some(sprint);
    }
    let map = fields.as_object()?;
    for (name, value) in map {
        if !name.starts_with("customfield") {
            continue;
        }
        if let Some(list) = value.as_array() {
            // The last entry is the most recent sprint assignment.
            if let Some(sprint) = list.iter().rev().find_map(parse_sprint) {
                return Some(sprint);
            }
        }
    }
    None
}

fn parse_sprint(value: &Value) -> Option<Sprint> {
    // The id distinguishes real sprint objects from other customfield
    // arrays that happen to carry name/state members.
    value.get("id")?.as_u64()?;
    Some(Sprint {
        name: value.get("name")?.as_str()?.to_string(),
        state: value.get("state")?.as_str()?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JQL construction
// ---------------------------------------------------------------------------

/// Escape a user-supplied value for embedding in a quoted JQL string.
pub fn escape_jql(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the search clause for free text typed in the browser. An exact
/// issue key matches by key; anything else becomes a prefix text search.
pub fn create_search_clause(text: &str) -> String {
    let trimmed = text.trim();
    if looks_like_issue_key(trimmed) {
        format!(
            "(key = \"{}\" OR text ~ \"{}*\")",
            escape_jql(&trimmed.to_uppercase()),
            escape_jql(trimmed)
        )
    } else {
        format!("text ~ \"{}*\"", escape_jql(trimmed))
    }
}

fn looks_like_issue_key(text: &str) -> bool {
    let Some((project, number)) = text.split_once('-') else {
        return false;
    };
    !project.is_empty()
        && project.chars().all(|c| c.is_ascii_alphanumeric())
        && project
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// AND a text search onto an existing JQL query, preserving its meaning by
/// parenthesizing the original.
pub fn append_text_search(jql: &str, text: &str) -> String {
    if text.trim().is_empty() {
        return jql.to_string();
    }
    if jql.trim().is_empty() {
        return create_search_clause(text);
    }
    format!("({}) AND {}", jql, create_search_clause(text))
}

fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn issue_key_search_matches_by_key_or_text() {
        assert_eq!(
            create_search_clause("proj-42"),
            "(key = \"PROJ-42\" OR text ~ \"proj-42*\")"
        );
    }

    #[test]
    fn plain_text_becomes_prefix_search() {
        assert_eq!(create_search_clause("login bug"), "text ~ \"login bug*\"");
        // A bare number is not an issue key.
        assert_eq!(create_search_clause("42"), "text ~ \"42*\"");
    }

    #[test]
    fn quotes_are_escaped_in_search_text() {
        assert_eq!(
            create_search_clause("say \"hi\""),
            "text ~ \"say \\\"hi\\\"*\""
        );
    }

    #[test]
    fn text_search_parenthesizes_existing_jql() {
        assert_eq!(
            append_text_search("project = PROJ ORDER BY rank", "login"),
            "(project = PROJ ORDER BY rank) AND text ~ \"login*\""
        );
        assert_eq!(append_text_search("project = PROJ", ""), "project = PROJ");
        assert_eq!(append_text_search("", "login"), "text ~ \"login*\"");
    }

    #[test]
    fn parses_search_page_with_sprint_customfield() {
        let value = serde_json::json!({
            "total": 2,
            "issues": [
                {
                    "key": "PROJ-1",
                    "fields": {
                        "summary": "Fix login",
                        "status": { "name": "In Progress" },
                        "assignee": { "accountId": "u1", "displayName": "Dana" },
                        "priority": { "name": "High" },
                        "issuetype": { "name": "Bug" },
                        "customfield_10020": [
                            { "id": 7, "name": "Sprint 6", "state": "closed" },
                            { "id": 8, "name": "Sprint 7", "state": "active" }
                        ]
                    }
                },
                {
                    "key": "PROJ-2",
                    "fields": {
                        "summary": "Backlog item",
                        "status": { "name": "To Do" },
                        "assignee": null
                    }
                }
            ]
        });
        let page = parse_search_page(&value).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.issues.len(), 2);
        let sprint = page.issues[0].sprint.as_ref().unwrap();
        assert_eq!(sprint.name, "Sprint 7");
        assert_eq!(sprint.state, "active");
        assert_eq!(page.issues[1].sprint, None);
        assert_eq!(page.issues[1].assignee, None);
    }

    #[test]
    fn url_encoding_covers_jql_characters() {
        assert_eq!(url_encode("a = \"b c\""), "a%20%3D%20%22b%20c%22");
    }
}
