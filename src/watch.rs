//! Change notification for a document on disk.
//!
//! The parent directory is watched rather than the file itself, since editors often
//! save by replacing a file, which would otherwise end the watch.

use crate::error::{Error, Result};
use crate::sys::AsString;
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, Debouncer, new_debouncer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// The state of a watched file since it was last polled.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Status {
    Unchanged,
    Modified,
    Removed,
}

pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<DebounceEventResult>,

    /// Canonical path of the watched file.
    path: PathBuf,
}

impl FileWatcher {
    /// Quiet period after which a burst of changes is reported as one.
    const DEBOUNCE: Duration = Duration::from_millis(50);

    /// Starts watching the file at `path`, which must exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<FileWatcher> {
        let path = path.as_ref();
        let path = fs::canonicalize(path).map_err(|e| Error::io(&path.as_string(), e))?;
        let dir = path.parent().unwrap_or(path.as_path()).to_path_buf();

        let (tx, rx) = mpsc::channel();
        let mut debouncer =
            new_debouncer(Self::DEBOUNCE, tx).map_err(|e| Error::watch(&dir.as_string(), &e))?;
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)
            .map_err(|e| Error::watch(&dir.as_string(), &e))?;
        tracing::debug!(path = %path.display(), "watching");

        Ok(FileWatcher {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    /// Drains pending events without blocking and reports whether the file was
    /// touched since the last call.
    pub fn poll(&self) -> Status {
        let mut touched = false;
        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(events) => {
                    touched |= events.iter().any(|event| {
                        event.path == self.path
                            && !matches!(event.kind, DebouncedEventKind::AnyContinuous)
                    });
                }
                Err(e) => tracing::warn!("file watcher error: {e:?}"),
            }
        }
        if !touched {
            Status::Unchanged
        } else if self.path.exists() {
            Status::Modified
        } else {
            Status::Removed
        }
    }
}
