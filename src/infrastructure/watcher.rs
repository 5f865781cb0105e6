//! Single-path file watcher.
//!
//! At most one path is watched at a time. Selecting a new path removes the
//! previous watch and drains anything it queued, so a notification can only
//! ever refer to the currently watched file.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use notify::event::EventKind;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace};

use crate::infrastructure::error::{InfraError, InfraResult};

/// Change notification for the watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file was written and still exists
    Changed(PathBuf),
    /// The file was removed; a replacement may already be in its place
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Changed(path) | WatchEvent::Removed(path) => path,
        }
    }
}

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    /// Notified paths, flagged when the event itself was a removal
    rx: Receiver<(PathBuf, bool)>,
    current: Option<PathBuf>,
}

impl FileWatcher {
    pub fn new() -> InfraResult<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res {
                    if is_content_event(&event.kind) {
                        let removal = matches!(event.kind, EventKind::Remove(_));
                        for path in event.paths {
                            let _ = tx.send((path, removal));
                        }
                    }
                }
            },
            Config::default(),
        )?;
        Ok(Self {
            watcher,
            rx,
            current: None,
        })
    }

    /// Replace the watch set with `path`.
    pub fn watch(&mut self, path: &Path) -> InfraResult<()> {
        self.clear()?;
        let canonical = path
            .canonicalize()
            .map_err(|e| InfraError::io(format!("watch {}", path.display()), e))?;
        self.watcher
            .watch(&canonical, RecursiveMode::NonRecursive)?;
        debug!("watching {}", canonical.display());
        self.current = Some(canonical);
        Ok(())
    }

    /// Stop watching and discard queued notifications.
    pub fn clear(&mut self) -> InfraResult<()> {
        if let Some(previous) = self.current.take() {
            // The file may already be gone, which also ends the watch
            if let Err(e) = self.watcher.unwatch(&previous) {
                debug!("unwatch {}: {}", previous.display(), e);
            }
        }
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }

    /// Settle a `Removed` notification for `path`.
    ///
    /// Editors that save by rename remove the file for a moment. After
    /// `grace`, a file that is back is watched again (its old watch died with
    /// the replaced inode) and `true` is returned; otherwise the watch is
    /// cleared.
    pub fn rewatch_if_replaced(&mut self, path: &Path, grace: Duration) -> InfraResult<bool> {
        thread::sleep(grace);
        if path.is_file() {
            debug!("{} replaced, watching again", path.display());
            self.watch(path)?;
            Ok(true)
        } else {
            self.clear()?;
            Ok(false)
        }
    }

    pub fn watched(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Next pending notification, without blocking.
    pub fn try_next(&self) -> Option<WatchEvent> {
        while let Ok((path, removal)) = self.rx.try_recv() {
            if let Some(event) = route(self.watched(), path, removal) {
                return Some(event);
            }
        }
        None
    }

    /// Wait up to `timeout` for a notification about the watched path.
    pub fn recv_timeout(&self, timeout: Duration) -> InfraResult<Option<WatchEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((path, removal)) => {
                    if let Some(event) = route(self.watched(), path, removal) {
                        return Ok(Some(event));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(InfraError::WatchDisconnected),
            }
        }
    }
}

fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Deliver `path` only if it is the watched one.
///
/// A removal event stays a removal even when a replacement already exists
/// at the path, since the watch on the removed file is gone either way.
fn route(watched: Option<&Path>, path: PathBuf, removal: bool) -> Option<WatchEvent> {
    if watched != Some(path.as_path()) {
        trace!("dropping stale notification for {}", path.display());
        return None;
    }
    if !removal && path.exists() {
        Some(WatchEvent::Changed(path))
    } else {
        Some(WatchEvent::Removed(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_other_path_when_routing_then_dropped() {
        let event = route(Some(Path::new("/a.st")), PathBuf::from("/b.st"), false);
        assert_eq!(event, None);
    }

    #[test]
    fn given_nothing_watched_when_routing_then_dropped() {
        assert_eq!(route(None, PathBuf::from("/a.st"), false), None);
    }

    #[test]
    fn given_existing_watched_path_when_routing_then_changed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.st");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(
            route(Some(file.as_path()), file.clone(), false),
            Some(WatchEvent::Changed(file))
        );
    }

    #[test]
    fn given_missing_watched_path_when_routing_then_removed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("gone.st");
        assert_eq!(
            route(Some(file.as_path()), file.clone(), false),
            Some(WatchEvent::Removed(file))
        );
    }

    #[test]
    fn given_removal_of_replaced_file_when_routing_then_removed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.st");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(
            route(Some(file.as_path()), file.clone(), true),
            Some(WatchEvent::Removed(file))
        );
    }
}
