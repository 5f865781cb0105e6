//! Workspace: the forest of opened files as the UI sees it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::document::Document;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, NodeKind, Subtree};
use crate::domain::tree::TreeModel;

/// Kind of a file that can be opened into a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    St,
    Markdown,
}

impl FileKind {
    pub fn node_kind(self) -> NodeKind {
        match self {
            FileKind::St => NodeKind::File,
            FileKind::Markdown => NodeKind::Markdown,
        }
    }
}

/// Per-file record behind a top-level File/Markdown node.
#[derive(Debug)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: FileKind,
    /// Parsed structure; `None` for Markdown entries
    pub document: Option<Document>,
}

/// One tree model whose root holds a File or Markdown leaf per opened file.
///
/// Entries are keyed by node handle, so the row of an entry always comes
/// from the live model.
#[derive(Debug, Default)]
pub struct Workspace {
    model: TreeModel,
    entries: HashMap<NodeId, Entry>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach a parsed ST document as the last top-level entry.
    pub fn attach_document(&mut self, path: PathBuf, document: Document) -> DomainResult<NodeId> {
        let node = Subtree::file(document.display_name());
        let id = self.model.append_child(self.model.root(), node)?;
        debug!("attached {} as {}", path.display(), document.display_name());
        self.entries.insert(
            id,
            Entry {
                path,
                kind: FileKind::St,
                document: Some(document),
            },
        );
        Ok(id)
    }

    /// Attach a Markdown file; its text becomes the node content.
    pub fn attach_markdown(
        &mut self,
        path: PathBuf,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> DomainResult<NodeId> {
        let id = self
            .model
            .append_child(self.model.root(), Subtree::markdown(name, content))?;
        self.entries.insert(
            id,
            Entry {
                path,
                kind: FileKind::Markdown,
                document: None,
            },
        );
        Ok(id)
    }

    /// Detach the top-level entry at `row` from the view.
    pub fn detach(&mut self, row: usize) -> DomainResult<Entry> {
        let id = self.model.child_at(self.model.root(), row)?;
        self.model.remove_child(self.model.root(), row)?;
        self.entries.remove(&id).ok_or(DomainError::DetachedNode)
    }

    pub fn entry_id(&self, row: usize) -> DomainResult<NodeId> {
        self.model.child_at(self.model.root(), row)
    }

    pub fn entry(&self, row: usize) -> DomainResult<&Entry> {
        let id = self.entry_id(row)?;
        self.entries.get(&id).ok_or(DomainError::DetachedNode)
    }

    pub fn entry_mut(&mut self, row: usize) -> DomainResult<&mut Entry> {
        let id = self.entry_id(row)?;
        self.entries.get_mut(&id).ok_or(DomainError::DetachedNode)
    }

    /// Row of the entry backed by `path`, if it is open.
    pub fn row_of_path(&self, path: &Path) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.path == path)
            .and_then(|(&id, _)| self.model.row_of(id).ok())
    }

    /// Entries in row order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.model
            .node(self.model.root())
            .map(|root| root.children())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.entries.get(id))
    }

    /// Swap in a freshly built document for the ST entry at `row`.
    ///
    /// The entry keeps its row; the node label follows the new display name.
    pub fn replace_document(&mut self, row: usize, document: Document) -> DomainResult<()> {
        let id = self.entry_id(row)?;
        let entry = self.entries.get_mut(&id).ok_or(DomainError::DetachedNode)?;
        if entry.kind != FileKind::St {
            return Err(DomainError::InvalidKind {
                kind: entry.kind.node_kind(),
            });
        }
        self.model.relabel(id, document.display_name())?;
        entry.document = Some(document);
        Ok(())
    }

    /// Replace the text of the Markdown entry at `row`.
    pub fn replace_markdown(&mut self, row: usize, content: impl Into<String>) -> DomainResult<()> {
        let id = self.entry_id(row)?;
        self.model.set_content(id, content)
    }
}
