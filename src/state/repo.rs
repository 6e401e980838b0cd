use std::path::{Path, PathBuf};

use crate::data::git::{parse_repo_slug, GitOps};
use crate::model::github::GitRemote;

/// Repository identity for the working directory: root path, remotes,
/// current branch, and which remote PR queries should target.
///
/// The `owner/repo` slug is derived from the selected remote on demand and
/// never stored, so it cannot drift when the selection changes.
#[derive(Debug, Default)]
pub struct RepoContext {
    /// None until the first probe completes.
    pub is_repo: Option<bool>,
    pub repo_path: Option<PathBuf>,
    pub remotes: Vec<GitRemote>,
    pub current_branch: Option<String>,
    pub selected_remote: Option<String>,
    pub error: Option<String>,
}

/// Remote to target when nothing valid is persisted: the persisted name if
/// it still exists, else `origin`, else the first remote.
pub fn default_remote(remotes: &[GitRemote], persisted: Option<&str>) -> Option<String> {
    if let Some(name) = persisted {
        if remotes.iter().any(|r| r.name == name) {
            return Some(name.to_string());
        }
    }
    if remotes.iter().any(|r| r.name == "origin") {
        return Some("origin".to_string());
    }
    remotes.first().map(|r| r.name.clone())
}

impl RepoContext {
    /// Probe the working directory. Outside a repo every derived field is
    /// cleared; inside, remotes and branch are loaded and a remote selected.
    pub fn initialize(&mut self, git: &impl GitOps, cwd: &Path, persisted_remote: Option<&str>) {
        if !git.is_repo(cwd) {
            *self = Self {
                is_repo: Some(false),
                ..Self::default()
            };
            return;
        }
        self.is_repo = Some(true);
        self.error = None;

        match git.repo_root(cwd) {
            Ok(root) => self.repo_path = Some(root),
            Err(err) => {
                self.error = Some(err.to_string());
                self.repo_path = None;
            }
        }
        match git.list_remotes(cwd) {
            Ok(remotes) => self.remotes = remotes,
            Err(err) => {
                self.error = Some(err.to_string());
                self.remotes = Vec::new();
            }
        }
        match git.current_branch(cwd) {
            Ok(branch) => self.current_branch = Some(branch),
            Err(err) => {
                self.error = Some(err.to_string());
                self.current_branch = None;
            }
        }
        self.selected_remote = default_remote(&self.remotes, persisted_remote);
    }

    /// Re-read the current branch and return the fresh value, so callers can
    /// act on it without re-reading state that may lag behind.
    pub fn refresh_branch(&mut self, git: &impl GitOps, cwd: &Path) -> Option<String> {
        match git.current_branch(cwd) {
            Ok(branch) => {
                self.current_branch = Some(branch.clone());
                Some(branch)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Select a remote by name. Returns true if the selection changed.
    pub fn select_remote(&mut self, name: &str) -> bool {
        if !self.remotes.iter().any(|r| r.name == name) {
            return false;
        }
        if self.selected_remote.as_deref() == Some(name) {
            return false;
        }
        self.selected_remote = Some(name.to_string());
        true
    }

    /// The `owner/repo` slug of the selected remote, computed on demand.
    pub fn current_repo_slug(&self) -> Option<String> {
        let name = self.selected_remote.as_deref()?;
        let remote = self.remotes.iter().find(|r| r.name == name)?;
        parse_repo_slug(&remote.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    struct StubGit {
        is_repo: bool,
        branch: String,
        remotes: Vec<GitRemote>,
    }

    impl StubGit {
        fn with_remotes(remotes: &[(&str, &str)]) -> Self {
            Self {
                is_repo: true,
                branch: "main".into(),
                remotes: remotes
                    .iter()
                    .map(|(name, url)| GitRemote {
                        name: name.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            }
        }
    }

    impl GitOps for StubGit {
        fn is_repo(&self, _cwd: &Path) -> bool {
            self.is_repo
        }
        fn repo_root(&self, _cwd: &Path) -> Result<PathBuf> {
            Ok(PathBuf::from("/src/widgets"))
        }
        fn current_branch(&self, _cwd: &Path) -> Result<String> {
            Ok(self.branch.clone())
        }
        fn list_remotes(&self, _cwd: &Path) -> Result<Vec<GitRemote>> {
            Ok(self.remotes.clone())
        }
        fn find_remote_with_branch(&self, _cwd: &Path, branch: &str) -> Result<Option<String>> {
            Ok((branch == self.branch).then(|| "origin".to_string()))
        }
    }

    #[test]
    fn outside_a_repo_everything_clears() {
        let git = StubGit {
            is_repo: false,
            ..StubGit::with_remotes(&[("origin", "git@github.com:octo/widgets.git")])
        };
        let mut ctx = RepoContext::default();
        ctx.initialize(&git, Path::new("/tmp"), Some("origin"));
        assert_eq!(ctx.is_repo, Some(false));
        assert_eq!(ctx.remotes.len(), 0);
        assert_eq!(ctx.selected_remote, None);
        assert_eq!(ctx.current_repo_slug(), None);
    }

    #[test]
    fn persisted_remote_wins_when_it_exists() {
        let git = StubGit::with_remotes(&[
            ("origin", "git@github.com:octo/widgets.git"),
            ("fork", "git@github.com:me/widgets.git"),
        ]);
        let mut ctx = RepoContext::default();
        ctx.initialize(&git, Path::new("/src/widgets"), Some("fork"));
        assert_eq!(ctx.selected_remote.as_deref(), Some("fork"));
        assert_eq!(ctx.current_repo_slug().as_deref(), Some("me/widgets"));
    }

    #[test]
    fn stale_persisted_remote_falls_back_to_origin_then_first() {
        let remotes = [
            ("upstream", "git@github.com:octo/widgets.git"),
            ("origin", "git@github.com:me/widgets.git"),
        ];
        let git = StubGit::with_remotes(&remotes);
        let mut ctx = RepoContext::default();
        ctx.initialize(&git, Path::new("/src/widgets"), Some("gone"));
        assert_eq!(ctx.selected_remote.as_deref(), Some("origin"));

        let git = StubGit::with_remotes(&[("upstream", "git@github.com:octo/widgets.git")]);
        ctx.initialize(&git, Path::new("/src/widgets"), Some("gone"));
        assert_eq!(ctx.selected_remote.as_deref(), Some("upstream"));

        let git = StubGit::with_remotes(&[]);
        ctx.initialize(&git, Path::new("/src/widgets"), None);
        assert_eq!(ctx.selected_remote, None);
    }

    #[test]
    fn slug_follows_remote_selection_without_restating_it() {
        let git = StubGit::with_remotes(&[
            ("origin", "https://github.com/octo/widgets.git"),
            ("fork", "git@github.com:me/widgets.git"),
        ]);
        let mut ctx = RepoContext::default();
        ctx.initialize(&git, Path::new("/src/widgets"), None);
        assert_eq!(ctx.current_repo_slug().as_deref(), Some("octo/widgets"));

        assert!(ctx.select_remote("fork"));
        assert_eq!(ctx.current_repo_slug().as_deref(), Some("me/widgets"));

        // Re-selecting or selecting an unknown remote reports no change.
        assert!(!ctx.select_remote("fork"));
        assert!(!ctx.select_remote("missing"));
        assert_eq!(ctx.selected_remote.as_deref(), Some("fork"));
    }

    #[test]
    fn refresh_branch_returns_the_fresh_value() {
        let mut git = StubGit::with_remotes(&[("origin", "git@github.com:octo/widgets.git")]);
        let mut ctx = RepoContext::default();
        ctx.initialize(&git, Path::new("/src/widgets"), None);
        assert_eq!(ctx.current_branch.as_deref(), Some("main"));

        git.branch = "feature/polling".into();
        let fresh = ctx.refresh_branch(&git, Path::new("/src/widgets"));
        assert_eq!(fresh.as_deref(), Some("feature/polling"));
        assert_eq!(ctx.current_branch.as_deref(), Some("feature/polling"));
    }
}
