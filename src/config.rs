use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::jira::{JiraAuth, SavedView};

/// How often the tick event fires (ms).
pub const TICK_RATE_MS: u64 = 250;

/// File watcher debounce interval (ms).
pub const DEBOUNCE_MS: u64 = 200;

/// Base path for all standup data.
pub fn standup_home() -> PathBuf {
    dirs_base().join(".standup")
}

pub fn logs_dir() -> PathBuf {
    standup_home().join("logs")
}

fn dirs_base() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

// ---------------------------------------------------------------------------
// Project config (.standup.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub display: Option<DisplayConfig>,
    pub jira: Option<JiraDefaults>,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    pub tick_rate: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct JiraDefaults {
    /// Name of the saved view to preselect in the browser.
    pub default_view: Option<String>,
}

impl ProjectConfig {
    pub fn tick_rate(&self) -> u64 {
        self.display
            .as_ref()
            .and_then(|d| d.tick_rate)
            .unwrap_or(TICK_RATE_MS)
    }

    pub fn jira_default_view(&self) -> Option<&str> {
        self.jira.as_ref().and_then(|j| j.default_view.as_deref())
    }
}

/// Load project config from `.standup.toml` in the given directory.
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load_project_config(cwd: &Path) -> ProjectConfig {
    let path = cwd.join(".standup.toml");
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        toml::from_str(&content).unwrap_or_default()
    } else {
        ProjectConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Global store (~/.standup/config.json)
// ---------------------------------------------------------------------------

/// Per-repository persisted settings, keyed by repo root path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_remote: Option<String>,
    /// branch name -> linked Jira ticket keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub linked_tickets: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repositories: BTreeMap<String, RepoConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira: Option<JiraAuth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_views: Vec<SavedView>,
}

/// Handle to the on-disk store. Every write reloads the file first so a
/// merge never clobbers keys written by another part of the app between
/// our read and our write.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Self {
        Self::new(standup_home().join("config.json"))
    }

    /// Load the store, returning defaults for a missing or unreadable file.
    pub fn load(&self) -> Store {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Store::default(),
        }
    }

    pub fn save(&self, store: &Store) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(store)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Read-modify-write against a fresh snapshot.
    pub fn update(&self, mutate: impl FnOnce(&mut Store)) -> Result<()> {
        let mut store = self.load();
        mutate(&mut store);
        self.save(&store)
    }

    pub fn repo_config(&self, repo_path: &str) -> RepoConfig {
        self.load()
            .repositories
            .get(repo_path)
            .cloned()
            .unwrap_or_default()
    }

    /// Merge an update into one repository's entry, leaving siblings alone.
    pub fn update_repo_config(
        &self,
        repo_path: &str,
        mutate: impl FnOnce(&mut RepoConfig),
    ) -> Result<()> {
        self.update(|store| {
            let entry = store.repositories.entry(repo_path.to_string()).or_default();
            mutate(entry);
        })
    }

    pub fn jira_auth(&self) -> Option<JiraAuth> {
        self.load().jira
    }

    pub fn saved_views(&self) -> Vec<SavedView> {
        self.load().saved_views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::jira::ViewSource;
    use pretty_assertions::assert_eq;

    fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load(), Store::default());
        assert_eq!(store.repo_config("/src/a"), RepoConfig::default());
    }

    #[test]
    fn update_repo_config_persists_selected_remote() {
        let (_dir, store) = temp_store();
        store
            .update_repo_config("/src/a", |repo| {
                repo.selected_remote = Some("upstream".into());
            })
            .unwrap();
        assert_eq!(
            store.repo_config("/src/a").selected_remote.as_deref(),
            Some("upstream")
        );
    }

    #[test]
    fn merge_does_not_clobber_sibling_repositories() {
        let (_dir, store) = temp_store();
        store
            .update_repo_config("/src/a", |repo| {
                repo.selected_remote = Some("origin".into());
            })
            .unwrap();
        // A write to a different repo between our read and write must
        // survive: update() reloads before merging, so simulate it plainly.
        store
            .update_repo_config("/src/b", |repo| {
                repo.selected_remote = Some("fork".into());
            })
            .unwrap();
        store
            .update_repo_config("/src/a", |repo| {
                repo.linked_tickets
                    .insert("main".into(), vec!["PROJ-1".into()]);
            })
            .unwrap();

        let loaded = store.load();
        assert_eq!(
            loaded.repositories["/src/b"].selected_remote.as_deref(),
            Some("fork")
        );
        assert_eq!(
            loaded.repositories["/src/a"].selected_remote.as_deref(),
            Some("origin")
        );
        assert_eq!(
            loaded.repositories["/src/a"].linked_tickets["main"],
            vec!["PROJ-1".to_string()]
        );
    }

    #[test]
    fn saved_views_round_trip() {
        let (_dir, store) = temp_store();
        store
            .update(|s| {
                s.saved_views.push(SavedView {
                    id: "v1".into(),
                    name: "Sprint board".into(),
                    source: ViewSource::Board {
                        board_id: "17".into(),
                    },
                });
            })
            .unwrap();
        let views = store.saved_views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "Sprint board");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let (dir, store) = temp_store();
        std::fs::write(dir.path().join("config.json"), "{not json").unwrap();
        assert_eq!(store.load(), Store::default());
    }
}
