//! Node removal across the view and the backing store
//!
//! ```text
//! Requested -> Validating -> [BackingMutation -> TreeMutation] -> Completed
//! ```
//!
//! Folder and Template nodes live inside a persisted document, so removing
//! one always rewrites that document's file. File and Markdown entries are
//! detached from the view, and their file is deleted only on purge. The
//! backing store is always mutated first: when that fails the tree is left
//! untouched.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::{serialize_excluding, FileKind, NodeKind, Workspace};
use crate::infrastructure::traits::FileSystem;

/// Result of one removal request, meant for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub ok: bool,
    pub message: String,
}

impl RemovalOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemovalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Removal service. Never returns `Err`; every failure is an outcome.
pub struct DeletionService {
    fs: Arc<dyn FileSystem>,
}

impl DeletionService {
    /// Create a new deletion service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Remove a node from `workspace`.
    ///
    /// `entry_row` picks the top-level file; `node_path` are the rows from
    /// that file's document root down to the node. An empty `node_path`
    /// addresses the file entry itself, where `purge_backing` also deletes
    /// the file from disk.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn remove(
        &self,
        workspace: &mut Workspace,
        entry_row: usize,
        node_path: &[usize],
        purge_backing: bool,
    ) -> RemovalOutcome {
        let outcome = if node_path.is_empty() {
            self.remove_entry(workspace, entry_row, purge_backing)
        } else {
            self.remove_structural(workspace, entry_row, node_path)
        };
        match outcome {
            Ok(message) => {
                info!("{message}");
                RemovalOutcome::success(message)
            }
            Err(message) => {
                warn!("{message}");
                RemovalOutcome::failure(message)
            }
        }
    }

    fn remove_entry(
        &self,
        workspace: &mut Workspace,
        row: usize,
        purge_backing: bool,
    ) -> Result<String, String> {
        let entry = workspace.entry(row).map_err(|e| e.to_string())?;
        let path = entry.path.clone();
        let noun = match entry.kind {
            FileKind::St => "file",
            FileKind::Markdown => "markdown file",
        };

        if purge_backing {
            self.purge(&path)?;
        }
        workspace.detach(row).map_err(|e| e.to_string())?;

        if purge_backing {
            Ok(format!("{noun} deleted: {}", path.display()))
        } else {
            Ok(format!("{noun} removed from view: {}", path.display()))
        }
    }

    fn purge(&self, path: &Path) -> Result<(), String> {
        self.fs
            .remove_file(path)
            .map_err(|e| format!("failed to delete file: {e}"))
    }

    fn remove_structural(
        &self,
        workspace: &mut Workspace,
        row: usize,
        node_path: &[usize],
    ) -> Result<String, String> {
        let entry = workspace.entry_mut(row).map_err(|e| e.to_string())?;
        let path = entry.path.clone();
        let document = entry
            .document
            .as_mut()
            .ok_or_else(|| format!("{} has no structure to remove from", path.display()))?;

        let model = document.model();
        let target = model.resolve(node_path).map_err(|e| e.to_string())?;
        let kind = model.kind_of(target).map_err(|e| e.to_string())?;
        let noun = match kind {
            NodeKind::Folder => "folder",
            NodeKind::Template => "template",
            other => return Err(format!("cannot remove a {} node", other.label())),
        };
        let parent = model
            .parent_of(target)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "cannot remove the root".to_string())?;
        let child_row = model.row_of(target).map_err(|e| e.to_string())?;

        let text = serialize_excluding(document, target).map_err(|e| e.to_string())?;
        self.fs
            .write(&path, &text)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

        document
            .model_mut()
            .remove_child(parent, child_row)
            .map_err(|e| e.to_string())?;
        document.mark_clean();
        Ok(format!("{noun} removed"))
    }
}
