use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;

use crate::model::github::GitRemote;

/// Local git queries, behind a trait so repo state can be driven by a stub
/// in tests.
pub trait GitOps {
    fn is_repo(&self, cwd: &Path) -> bool;
    fn repo_root(&self, cwd: &Path) -> Result<PathBuf>;
    fn current_branch(&self, cwd: &Path) -> Result<String>;
    fn list_remotes(&self, cwd: &Path) -> Result<Vec<GitRemote>>;
    /// First remote that has a remote-tracking ref for the branch, i.e. the
    /// branch has been pushed somewhere.
    fn find_remote_with_branch(&self, cwd: &Path, branch: &str) -> Result<Option<String>>;
}

/// Runs the real `git` binary.
pub struct SystemGit;

impl GitOps for SystemGit {
    fn is_repo(&self, cwd: &Path) -> bool {
        Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(cwd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn repo_root(&self, cwd: &Path) -> Result<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd)
            .output()?;
        if !output.status.success() {
            anyhow::bail!("not inside a git repository");
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(root))
    }

    fn current_branch(&self, cwd: &Path) -> Result<String> {
        let output = Command::new("git")
            .args(["branch", "--show-current"])
            .current_dir(cwd)
            .output()?;
        if !output.status.success() {
            anyhow::bail!("git branch --show-current failed");
        }
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if branch.is_empty() {
            // Detached HEAD: fall back to the short commit hash.
            let output = Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .current_dir(cwd)
                .output()?;
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        Ok(branch)
    }

    fn list_remotes(&self, cwd: &Path) -> Result<Vec<GitRemote>> {
        let output = Command::new("git")
            .args(["remote", "-v"])
            .current_dir(cwd)
            .output()?;
        if !output.status.success() {
            anyhow::bail!("git remote -v failed");
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_remotes(&stdout))
    }

    fn find_remote_with_branch(&self, cwd: &Path, branch: &str) -> Result<Option<String>> {
        let output = Command::new("git")
            .args(["branch", "-r", "--format=%(refname:short)"])
            .current_dir(cwd)
            .output()?;
        if !output.status.success() {
            anyhow::bail!("git branch -r failed");
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(remote_with_branch(&stdout, branch))
    }
}

/// Find the remote owning `remote/branch` in `git branch -r` output.
pub fn remote_with_branch(output: &str, branch: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (remote, tracked) = line.trim().split_once('/')?;
        (tracked == branch).then(|| remote.to_string())
    })
}

/// Parse `git remote -v` output into unique remotes, preserving order of
/// first appearance.
pub fn parse_remotes(output: &str) -> Vec<GitRemote> {
    let mut remotes: Vec<GitRemote> = Vec::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
            continue;
        };
        if remotes.iter().any(|r| r.name == name) {
            continue;
        }
        remotes.push(GitRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    remotes
}

/// Extract `owner/repo` from a remote URL. Supports SSH
/// (`git@github.com:owner/repo.git`) and HTTPS
/// (`https://github.com/owner/repo.git`) forms.
pub fn parse_repo_slug(url: &str) -> Option<String> {
    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':').map(|(_, p)| p)?
    } else if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("ssh://git@"))
    {
        rest.split_once('/').map(|(_, p)| p)?
    } else {
        return None;
    };
    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let mut segments = path.rsplitn(2, '/');
    let repo = segments.next()?;
    let owner = segments.next()?;
    // ssh:// URLs can carry extra leading path segments; keep the last two.
    let owner = owner.rsplit('/').next()?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_ssh_url() {
        assert_eq!(
            parse_repo_slug("git@github.com:octo/widgets.git").as_deref(),
            Some("octo/widgets")
        );
    }

    #[test]
    fn parses_https_url_with_and_without_suffix() {
        assert_eq!(
            parse_repo_slug("https://github.com/octo/widgets.git").as_deref(),
            Some("octo/widgets")
        );
        assert_eq!(
            parse_repo_slug("https://github.com/octo/widgets").as_deref(),
            Some("octo/widgets")
        );
    }

    #[test]
    fn parses_ssh_scheme_url() {
        assert_eq!(
            parse_repo_slug("ssh://git@github.com/octo/widgets.git").as_deref(),
            Some("octo/widgets")
        );
    }

    #[test]
    fn rejects_unrecognized_urls() {
        assert_eq!(parse_repo_slug("/local/path/repo"), None);
        assert_eq!(parse_repo_slug("git@github.com:broken"), None);
    }

    #[test]
    fn finds_the_remote_tracking_a_branch() {
        let output = "origin/HEAD\norigin/main\nfork/feature/polling\norigin/feature/polling\n";
        assert_eq!(
            remote_with_branch(output, "feature/polling").as_deref(),
            Some("fork")
        );
        assert_eq!(remote_with_branch(output, "gone"), None);
    }

    #[test]
    fn remote_listing_dedupes_fetch_and_push_lines() {
        let output = "origin\tgit@github.com:octo/widgets.git (fetch)\n\
                      origin\tgit@github.com:octo/widgets.git (push)\n\
                      fork\thttps://github.com/me/widgets.git (fetch)\n\
                      fork\thttps://github.com/me/widgets.git (push)\n";
        let remotes = parse_remotes(output);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[0].name, "origin");
        assert_eq!(remotes[1].name, "fork");
        assert_eq!(remotes[1].url, "https://github.com/me/widgets.git");
    }
}
