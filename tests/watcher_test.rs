//! Tests for the single-path FileWatcher

use std::time::Duration;

use tempfile::TempDir;

use stree::infrastructure::{FileWatcher, WatchEvent};
use stree::util::testing;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(500);
const GRACE: Duration = Duration::from_millis(200);

fn touch(path: &std::path::Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

#[test]
fn given_watched_file_when_written_then_changed_event() {
    // Arrange
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.st");
    touch(&file, "one");
    let mut watcher = FileWatcher::new().unwrap();
    watcher.watch(&file).unwrap();
    let watched = watcher.watched().unwrap().to_path_buf();

    // Act
    touch(&file, "two");

    // Assert
    let event = watcher.recv_timeout(WAIT).unwrap();
    assert_eq!(event, Some(WatchEvent::Changed(watched)));
}

#[test]
fn given_watch_moved_to_other_file_when_old_file_written_then_nothing_delivered() {
    // Arrange
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let old = temp.path().join("old.st");
    let new = temp.path().join("new.st");
    touch(&old, "x");
    touch(&new, "x");
    let mut watcher = FileWatcher::new().unwrap();
    watcher.watch(&old).unwrap();
    touch(&old, "queued before switch");

    // Act
    watcher.watch(&new).unwrap();
    touch(&old, "after switch");

    // Assert
    assert_eq!(watcher.recv_timeout(QUIET).unwrap(), None);
    assert!(watcher.watched().unwrap().ends_with("new.st"));
}

#[test]
fn given_cleared_watcher_when_file_written_then_nothing_delivered() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.md");
    touch(&file, "x");
    let mut watcher = FileWatcher::new().unwrap();
    watcher.watch(&file).unwrap();

    watcher.clear().unwrap();
    touch(&file, "y");

    assert_eq!(watcher.watched(), None);
    assert_eq!(watcher.try_next(), None);
    assert_eq!(watcher.recv_timeout(QUIET).unwrap(), None);
}

#[test]
fn given_missing_path_when_watching_then_error() {
    let temp = TempDir::new().unwrap();
    let mut watcher = FileWatcher::new().unwrap();

    assert!(watcher.watch(&temp.path().join("missing.st")).is_err());
    assert_eq!(watcher.watched(), None);
}

#[test]
fn given_file_replaced_after_removal_when_rewatching_then_changes_still_delivered() {
    // Arrange
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.st");
    touch(&file, "one");
    let mut watcher = FileWatcher::new().unwrap();
    watcher.watch(&file).unwrap();
    let watched = watcher.watched().unwrap().to_path_buf();
    let staged = temp.path().join("a.st.tmp");
    touch(&staged, "two");
    std::fs::rename(&staged, &file).unwrap();

    // Act
    let replaced = watcher.rewatch_if_replaced(&watched, GRACE).unwrap();
    touch(&file, "three");

    // Assert
    assert!(replaced);
    assert_eq!(watcher.watched(), Some(watched.as_path()));
    let event = watcher.recv_timeout(WAIT).unwrap();
    assert_eq!(event, Some(WatchEvent::Changed(watched)));
}

#[test]
fn given_file_gone_after_grace_when_rewatching_then_watch_cleared() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.st");
    touch(&file, "one");
    let mut watcher = FileWatcher::new().unwrap();
    watcher.watch(&file).unwrap();
    let watched = watcher.watched().unwrap().to_path_buf();
    std::fs::remove_file(&file).unwrap();

    let replaced = watcher.rewatch_if_replaced(&watched, GRACE).unwrap();

    assert!(!replaced);
    assert_eq!(watcher.watched(), None);
}
