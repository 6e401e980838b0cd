use std::path::Path;

use crate::error::{ErrorKind, FetchError};
use crate::model::github::{PrDetail, PrSummary};

use super::{wait_with_output, COMMAND_TIMEOUT};

const PR_LIST_FIELDS: &str =
    "number,title,url,isDraft,headRefName,baseRefName,createdAt,author";
const PR_VIEW_FIELDS: &str = "number,title,state,url,body,isDraft,headRefName,baseRefName,\
                              additions,deletions,reviewDecision,mergeable,author,labels";

/// Run a gh command, returning stdout on success and a classified error
/// otherwise.
fn run_gh(args: &[&str]) -> Result<Vec<u8>, FetchError> {
    let mut child = match std::process::Command::new("gh")
        .args(args)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(FetchError::new(
                ErrorKind::NotInstalled,
                "gh is not installed; install the GitHub CLI to continue",
            ));
        }
        Err(err) => return Err(FetchError::api(format!("failed to run gh: {}", err))),
    };

    let output = wait_with_output(&mut child, COMMAND_TIMEOUT)
        .map_err(|err| FetchError::api(err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.contains("gh auth login") || stderr.contains("authentication") {
            return Err(FetchError::new(
                ErrorKind::NotAuthenticated,
                "not logged in to GitHub; run `gh auth login`",
            ));
        }
        return Err(FetchError::api(format!("gh failed: {}", stderr)));
    }
    Ok(output.stdout)
}

/// Open PRs whose head is the given branch on the given repository.
pub fn list_prs_for_branch(repo_slug: &str, branch: &str) -> Result<Vec<PrSummary>, FetchError> {
    let stdout = run_gh(&[
        "pr",
        "list",
        "--repo",
        repo_slug,
        "--head",
        branch,
        "--state",
        "open",
        "--json",
        PR_LIST_FIELDS,
    ])?;
    serde_json::from_slice(&stdout).map_err(|err| FetchError::api(err.to_string()))
}

/// All open PRs on the repository, newest first as gh returns them.
pub fn list_open_prs(repo_slug: &str) -> Result<Vec<PrSummary>, FetchError> {
    let stdout = run_gh(&[
        "pr",
        "list",
        "--repo",
        repo_slug,
        "--state",
        "open",
        "--limit",
        "100",
        "--json",
        PR_LIST_FIELDS,
    ])?;
    serde_json::from_slice(&stdout).map_err(|err| FetchError::api(err.to_string()))
}

/// Full detail for one PR via `gh pr view`.
pub fn pr_detail(repo_slug: &str, number: u64) -> Result<PrDetail, FetchError> {
    let number = number.to_string();
    let stdout = run_gh(&[
        "pr",
        "view",
        &number,
        "--repo",
        repo_slug,
        "--json",
        PR_VIEW_FIELDS,
    ])?;
    serde_json::from_slice(&stdout).map_err(|err| FetchError::api(err.to_string()))
}

/// Launch the browser-based PR creation flow for the current branch. The
/// actual creation happens outside the app; callers poll for the result.
pub fn open_pr_creation_flow(cwd: &Path, branch: &str) -> Result<(), FetchError> {
    let mut child = std::process::Command::new("gh")
        .args(["pr", "create", "--web", "--head", branch])
        .current_dir(cwd)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::new(ErrorKind::NotInstalled, "gh is not installed")
            } else {
                FetchError::api(format!("failed to run gh: {}", err))
            }
        })?;

    let output = wait_with_output(&mut child, COMMAND_TIMEOUT)
        .map_err(|err| FetchError::api(err.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FetchError::api(format!(
            "gh pr create failed: {}",
            stderr.trim()
        )));
    }
    Ok(())
}

/// Open a URL in the default browser, detached.
pub fn open_in_browser(url: &str) -> Result<(), FetchError> {
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(target_os = "windows")]
    let program = "start";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let program = "xdg-open";

    std::process::Command::new(program)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|err| FetchError::api(format!("failed to open browser: {}", err)))
}
