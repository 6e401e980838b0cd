use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};

use crate::config::DEBOUNCE_MS;
use crate::event::AppEvent;

/// Watch the logs directory and send LogChanged events for daily log files
/// edited outside the app.
pub fn start_watcher(
    logs_dir: &Path,
    tx: mpsc::Sender<AppEvent>,
) -> Result<notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>> {
    std::fs::create_dir_all(logs_dir)?;

    let mut debouncer = new_debouncer(
        Duration::from_millis(DEBOUNCE_MS),
        move |res: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
            let events = match res {
                Ok(events) => events,
                Err(_) => return,
            };
            for event in events {
                if event.kind != DebouncedEventKind::Any {
                    continue;
                }
                if event.path.extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                let _ = tx.send(AppEvent::LogChanged(event.path.clone()));
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(logs_dir, notify::RecursiveMode::NonRecursive)?;

    Ok(debouncer)
}
