//! File watching for re-assembly.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, Watcher};
use tokio::sync::mpsc as async_mpsc;

pub use notify::RecursiveMode;

/// Quiet period before a burst of changes is reported.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// An HTML source was created or modified
    Changed(PathBuf),

    /// An HTML source was deleted
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Changed(path) | WatchEvent::Removed(path) => path,
        }
    }
}

/// File watcher for the template and fragment sources.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch the given paths, skipping events for anything in `ignore`.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        targets: &[(PathBuf, RecursiveMode)],
        ignore: Vec<PathBuf>,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for (path, mode) in targets {
            if path.exists() {
                watcher
                    .watch(path, *mode)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || {
            forward_debounced(sync_rx, async_tx, &ignore, DEBOUNCE);
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Forward events in bursts: after the first relevant change, keep collecting
/// until `quiet` passes with no new events, then send each path's last event.
fn forward_debounced(
    events: mpsc::Receiver<notify::Event>,
    tx: async_mpsc::Sender<WatchEvent>,
    ignore: &[PathBuf],
    quiet: Duration,
) {
    let relevant = |event: notify::Event| -> Vec<WatchEvent> {
        event
            .paths
            .iter()
            .filter(|path| !ignore.iter().any(|ignored| ignored == *path))
            .filter_map(|path| classify_event(path, &event.kind))
            .collect()
    };

    while let Ok(event) = events.recv() {
        let mut pending = relevant(event);
        if pending.is_empty() {
            continue;
        }

        let mut closed = false;
        loop {
            match events.recv_timeout(quiet) {
                Ok(event) => pending.extend(relevant(event)),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        for e in coalesce(pending) {
            if tx.blocking_send(e).is_err() {
                return;
            }
        }
        if closed {
            return;
        }
    }
}

/// Keep the last event per path, ordered by each path's first appearance.
fn coalesce(events: Vec<WatchEvent>) -> Vec<WatchEvent> {
    let mut merged: Vec<WatchEvent> = Vec::new();
    for event in events {
        match merged.iter_mut().find(|e| e.path() == event.path()) {
            Some(existing) => *existing = event,
            None => merged.push(event),
        }
    }
    merged
}

/// Classify a notify event into a WatchEvent; only HTML sources matter.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != "html" {
        return None;
    }

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Changed(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
        _ => None,
    }
}
