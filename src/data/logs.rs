use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

/// Today's log file name, e.g. `2026-08-24.md`.
pub fn today_file_name() -> String {
    format!("{}.md", Local::now().format("%Y-%m-%d"))
}

fn timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Append one entry to today's log, creating the directory and file as
/// needed. Each day gets a heading on first write.
pub fn append_entry(logs_dir: &Path, text: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("creating {}", logs_dir.display()))?;
    let path = logs_dir.join(today_file_name());
    let mut content = if path.exists() {
        std::fs::read_to_string(&path).unwrap_or_default()
    } else {
        format!("# {}\n", Local::now().format("%Y-%m-%d"))
    };
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!("- {} {}\n", timestamp(), text));
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn log_pr_created(logs_dir: &Path, repo_slug: &str, number: u64, title: &str) -> Result<PathBuf> {
    append_entry(
        logs_dir,
        &format!("Opened PR {}#{}: {}", repo_slug, number, title),
    )
}

pub fn log_status_changed(
    logs_dir: &Path,
    issue_key: &str,
    from: &str,
    to: &str,
) -> Result<PathBuf> {
    append_entry(
        logs_dir,
        &format!("Moved {} from {} to {}", issue_key, from, to),
    )
}

pub fn log_ticket_linked(logs_dir: &Path, branch: &str, issue_key: &str) -> Result<PathBuf> {
    append_entry(logs_dir, &format!("Linked {} to branch {}", issue_key, branch))
}

/// All log days on disk, newest first. Only `YYYY-MM-DD.md` files count.
pub fn list_log_days(logs_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(logs_dir) else {
        return Vec::new();
    };
    let mut days: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let day = name.strip_suffix(".md")?;
            is_day_name(day).then(|| day.to_string())
        })
        .collect();
    days.sort();
    days.reverse();
    days
}

fn is_day_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

pub fn read_log(logs_dir: &Path, day: &str) -> Result<String> {
    let path = logs_dir.join(format!("{}.md", day));
    std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_entry_creates_file_with_heading() {
        let dir = tempfile::tempdir().unwrap();
        let path = append_entry(dir.path(), "hello").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# "));
        assert!(content.contains("hello"));
    }

    #[test]
    fn entries_accumulate_in_order() {
        let dir = tempfile::tempdir().unwrap();
        append_entry(dir.path(), "first").unwrap();
        let path = append_entry(dir.path(), "second").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.find("first").unwrap();
        let second = content.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn listing_ignores_non_day_files_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2026-08-20.md"), "x").unwrap();
        std::fs::write(dir.path().join("2026-08-22.md"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::write(dir.path().join("2026-08.md"), "x").unwrap();
        assert_eq!(list_log_days(dir.path()), vec!["2026-08-22", "2026-08-20"]);
    }

    #[test]
    fn missing_logs_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(list_log_days(&dir.path().join("absent")), Vec::<String>::new());
    }

    #[test]
    fn formatted_events_mention_their_subjects() {
        let dir = tempfile::tempdir().unwrap();
        log_pr_created(dir.path(), "octo/widgets", 7, "Add widgets").unwrap();
        log_status_changed(dir.path(), "PROJ-1", "To Do", "In Progress").unwrap();
        let path = log_ticket_linked(dir.path(), "feature/x", "PROJ-1").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("octo/widgets#7"));
        assert!(content.contains("Moved PROJ-1 from To Do to In Progress"));
        assert!(content.contains("Linked PROJ-1 to branch feature/x"));
    }
}
