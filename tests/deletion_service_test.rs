//! Tests for DeletionService
//!
//! The backing store is mutated before the tree; a failing store must
//! leave the workspace untouched.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use stree::application::services::{DeletionService, WorkspaceService};
use stree::config::Settings;
use stree::domain::{read_events, NodeKind, Workspace};
use stree::infrastructure::traits::{FileSystem, RealFileSystem};

const DOC: &str = r#"{1, {"Doc", 1, 0, "", ""}, [
{1, {"Sub", 1, 0, "", ""}, [
{0, {"T1", 0, 1, "", "hello"}}
]},
{0, {"T2", 0, 1, "", "bye"}}
]}"#;

/// Real filesystem whose deletes and writes are refused.
struct ReadOnlyFileSystem;

impl FileSystem for ReadOnlyFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        RealFileSystem.read_to_string(path)
    }

    fn write(&self, _path: &Path, _content: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }

    fn exists(&self, path: &Path) -> bool {
        RealFileSystem.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        RealFileSystem.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        RealFileSystem.is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        RealFileSystem.create_dir_all(path)
    }

    fn remove_file(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        RealFileSystem.canonicalize(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        RealFileSystem.list_files(dir)
    }
}

struct Fixture {
    _temp: TempDir,
    workspace: Workspace,
    st_path: PathBuf,
    md_path: PathBuf,
}

/// Workspace with `doc.st` at row 0 and `notes.md` at row 1.
fn setup() -> Fixture {
    let temp = TempDir::new().unwrap();
    let st_path = temp.path().join("doc.st");
    let md_path = temp.path().join("notes.md");
    std::fs::write(&st_path, DOC).unwrap();
    std::fs::write(&md_path, "# Notes\n").unwrap();

    let settings = Settings {
        session_file: temp.path().join("session.toml"),
        ..Settings::default()
    };
    let service = WorkspaceService::new(Arc::new(RealFileSystem), Arc::new(settings));
    let mut workspace = Workspace::new();
    service.add_file(&mut workspace, &st_path).unwrap();
    service.add_file(&mut workspace, &md_path).unwrap();

    let st_path = std::fs::canonicalize(&st_path).unwrap();
    let md_path = std::fs::canonicalize(&md_path).unwrap();
    Fixture {
        _temp: temp,
        workspace,
        st_path,
        md_path,
    }
}

fn real() -> DeletionService {
    DeletionService::new(Arc::new(RealFileSystem))
}

fn failing() -> DeletionService {
    DeletionService::new(Arc::new(ReadOnlyFileSystem))
}

// ============================================================
// Template / Folder removal
// ============================================================

#[test]
fn given_template_when_removed_then_file_rewritten_and_node_gone() {
    // Arrange
    let mut fx = setup();

    // Act
    let outcome = real().remove(&mut fx.workspace, 0, &[1], false);

    // Assert
    assert!(outcome.ok, "{}", outcome.message);
    assert_eq!(outcome.message, "template removed");
    let document = fx.workspace.entry(0).unwrap().document.as_ref().unwrap();
    assert_eq!(document.model().child_count(document.model().root()).unwrap(), 1);
    assert!(!document.is_dirty());

    let on_disk = std::fs::read_to_string(&fx.st_path).unwrap();
    assert!(!on_disk.contains("T2"));
    assert!(on_disk.contains("T1"));
}

#[test]
fn given_folder_when_removed_then_descendants_dropped_from_file() {
    let mut fx = setup();

    let outcome = real().remove(&mut fx.workspace, 0, &[0], false);

    assert!(outcome.ok);
    assert_eq!(outcome.message, "folder removed");
    let events = read_events(&std::fs::read_to_string(&fx.st_path).unwrap()).unwrap();
    assert_eq!(events.len(), 3); // Doc, T2, exit
}

#[test]
fn given_failing_write_when_removing_template_then_tree_unchanged() {
    // Arrange
    let mut fx = setup();
    let before = std::fs::read_to_string(&fx.st_path).unwrap();

    // Act
    let outcome = failing().remove(&mut fx.workspace, 0, &[0, 0], false);

    // Assert
    assert!(!outcome.ok);
    assert!(outcome.message.starts_with("failed to write"), "{}", outcome.message);
    let document = fx.workspace.entry(0).unwrap().document.as_ref().unwrap();
    let model = document.model();
    let t1 = model.resolve(&[0, 0]).unwrap();
    assert_eq!(model.node(t1).unwrap().name(), "T1");
    assert_eq!(std::fs::read_to_string(&fx.st_path).unwrap(), before);
}

#[test]
fn given_invalid_node_path_when_removing_then_not_ok() {
    let mut fx = setup();

    let outcome = real().remove(&mut fx.workspace, 0, &[5], false);

    assert!(!outcome.ok);
    assert!(outcome.message.contains("out of range"), "{}", outcome.message);
}

#[test]
fn given_node_path_into_markdown_when_removing_then_not_ok() {
    let mut fx = setup();

    let outcome = real().remove(&mut fx.workspace, 1, &[0], false);

    assert!(!outcome.ok);
    assert_eq!(fx.workspace.len(), 2);
}

// ============================================================
// File / Markdown removal
// ============================================================

#[test]
fn given_file_without_purge_when_removed_then_detached_and_file_kept() {
    // Arrange
    let mut fx = setup();

    // Act
    let outcome = real().remove(&mut fx.workspace, 0, &[], false);

    // Assert
    assert!(outcome.ok);
    assert!(fx.st_path.exists());
    assert_eq!(fx.workspace.len(), 1);
    let remaining = fx.workspace.entry_id(0).unwrap();
    assert_eq!(
        fx.workspace.model().kind_of(remaining).unwrap(),
        NodeKind::Markdown
    );
}

#[test]
fn given_markdown_with_purge_when_removed_then_file_deleted() {
    let mut fx = setup();

    let outcome = real().remove(&mut fx.workspace, 1, &[], true);

    assert!(outcome.ok);
    assert!(outcome.message.contains("deleted"));
    assert!(!fx.md_path.exists());
    assert_eq!(fx.workspace.len(), 1);
}

#[test]
fn given_failing_delete_when_purging_file_then_not_ok_and_node_attached() {
    // Arrange
    let mut fx = setup();
    let id = fx.workspace.entry_id(0).unwrap();

    // Act
    let outcome = failing().remove(&mut fx.workspace, 0, &[], true);

    // Assert
    assert!(!outcome.ok);
    assert!(outcome.message.starts_with("failed to delete file"));
    assert_eq!(fx.workspace.len(), 2);
    assert_eq!(fx.workspace.model().row_of(id).unwrap(), 0);
    assert!(fx.st_path.exists());
}

#[test]
fn given_row_out_of_range_when_removing_then_not_ok() {
    let mut fx = setup();

    let outcome = real().remove(&mut fx.workspace, 9, &[], true);

    assert!(!outcome.ok);
    assert_eq!(fx.workspace.len(), 2);
}
