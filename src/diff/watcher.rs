use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::Event;

/// Watches the change-list file and reports when it is rewritten.
///
/// The parent directory is watched (non-recursively) so that editors and
/// tools that replace the file by rename are still picked up.
pub struct InputWatcher {
    /// Whether the watcher is currently forwarding events.
    active: Arc<AtomicBool>,
    /// Handle to the debouncer (dropped to stop watching).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl InputWatcher {
    /// Start watching `input`. Debounced changes are sent as
    /// [`Event::InputChanged`].
    pub fn new(
        input: &Path,
        debounce_duration: Duration,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> notify::Result<Self> {
        let active = Arc::new(AtomicBool::new(true));
        let active_clone = active.clone();
        let target = input.to_path_buf();
        let dir = watch_dir(input);

        let mut debouncer = new_debouncer(
            debounce_duration,
            move |result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                if !active_clone.load(Ordering::Relaxed) {
                    return;
                }

                match result {
                    Ok(events) => {
                        let touched = events
                            .iter()
                            .filter(|e| e.kind == DebouncedEventKind::Any)
                            .any(|e| is_input_event(&e.path, &target));
                        if touched {
                            debug!(path = %target.display(), "change list rewritten");
                            let _ = event_tx.send(Event::InputChanged);
                        }
                    }
                    Err(e) => warn!(error = %e, "input watcher error"),
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        Ok(Self {
            active,
            _debouncer: debouncer,
        })
    }

    /// Pause event forwarding while the app reloads on its own.
    pub fn pause(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Directory to register with the OS watcher for `input`.
fn watch_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether an event on `path` concerns the watched `target` file.
///
/// Compares file names when either side is relative, since the OS reports
/// absolute paths.
pub fn is_input_event(path: &Path, target: &Path) -> bool {
    if path == target {
        return true;
    }
    if path.is_absolute() && target.is_absolute() {
        return false;
    }
    matches!(
        (path.file_name(), target.file_name()),
        (Some(a), Some(b)) if a == b
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_matches() {
        assert!(is_input_event(
            Path::new("/work/changes.diff"),
            Path::new("/work/changes.diff")
        ));
    }

    #[test]
    fn sibling_files_do_not_match() {
        assert!(!is_input_event(
            Path::new("/work/other.diff"),
            Path::new("/work/changes.diff")
        ));
    }

    #[test]
    fn relative_target_matches_by_file_name() {
        assert!(is_input_event(
            Path::new("/work/changes.diff"),
            Path::new("changes.diff")
        ));
    }

    #[test]
    fn absolute_paths_in_other_dirs_do_not_match() {
        assert!(!is_input_event(
            Path::new("/elsewhere/changes.diff"),
            Path::new("/work/changes.diff")
        ));
    }

    #[test]
    fn watch_dir_defaults_to_current_dir() {
        assert_eq!(watch_dir(Path::new("changes.diff")), PathBuf::from("."));
        assert_eq!(
            watch_dir(Path::new("/work/changes.diff")),
            PathBuf::from("/work")
        );
    }

    #[tokio::test]
    async fn watcher_starts_and_pauses() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("changes.diff");
        std::fs::write(&input, "").unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let debounce = Duration::from_millis(crate::config::DEFAULT_DEBOUNCE_MS);
        let watcher = InputWatcher::new(&input, debounce, tx).unwrap();
        assert!(watcher.is_active());
        watcher.pause();
        assert!(!watcher.is_active());
        watcher.resume();
        assert!(watcher.is_active());
    }
}
