//! Persisted list of open files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::FileKind;
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Files to reopen on the next start, in workspace order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub files: Vec<SessionEntry>,
}

impl Session {
    /// Read the session file. A missing file is an empty session.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        if !fs.exists(path) {
            debug!("no session at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs.read_to_string(path).with_path_context("read session", path)?;
        toml::from_str(&content).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        })
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> ApplicationResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize session: {e}"),
        })?;
        fs.ensure_parent(path)
            .with_path_context("create session dir for", path)?;
        fs.write(path, &content).with_path_context("write session", path)?;
        debug!("saved {} session entr(ies) to {}", self.files.len(), path.display());
        Ok(())
    }

    /// Append `path` unless it is already listed. Returns whether it was added.
    pub fn add(&mut self, path: PathBuf, kind: FileKind) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.files.push(SessionEntry { path, kind });
        true
    }

    /// Drop `path`. Returns whether it was listed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.files.len();
        self.files.retain(|entry| entry.path != path);
        self.files.len() != before
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|entry| entry.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
