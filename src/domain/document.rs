//! Document: one opened ST source with its structural tree.

use std::path::{Path, PathBuf};

use crate::domain::tree::TreeModel;

/// The owning aggregate for one ST file: display name, tree, origin, dirty flag.
#[derive(Debug)]
pub struct Document {
    display_name: String,
    path: Option<PathBuf>,
    dirty: bool,
    model: TreeModel,
}

impl Document {
    /// Empty document: a bare root and no children.
    pub fn empty(display_name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::with_model(display_name, path, TreeModel::new())
    }

    pub(crate) fn with_model(
        display_name: impl Into<String>,
        path: Option<PathBuf>,
        model: TreeModel,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            path,
            dirty: false,
            model,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    /// Mutable access to the tree. Marks the document dirty.
    pub fn model_mut(&mut self) -> &mut TreeModel {
        self.dirty = true;
        &mut self.model
    }
}
