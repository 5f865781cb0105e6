//! Opening, saving and reloading files in a workspace
//!
//! ST files are read, parsed into structural events and built into a
//! [`Document`]; Markdown files become a single content-bearing node.
//! A file that fails to parse still opens, as an empty document named
//! after its file stem.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, Session};
use crate::config::Settings;
use crate::domain::{
    read_events, serialize, Document, FileKind, NodeId, StructureBuilder, Workspace,
};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::{display_name, has_extension, with_extension_appended};

/// Workspace file management service.
pub struct WorkspaceService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl WorkspaceService {
    /// Create a new workspace service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// File kind by extension.
    pub fn classify(&self, path: &Path) -> ApplicationResult<FileKind> {
        if has_extension(path, &self.settings.st_extension) {
            Ok(FileKind::St)
        } else if has_extension(path, &self.settings.markdown_extension) {
            Ok(FileKind::Markdown)
        } else {
            Err(ApplicationError::UnknownFileKind(path.to_path_buf()))
        }
    }

    /// Read and build an ST file.
    ///
    /// Parse errors are recovered into an empty document so the file still
    /// shows up; I/O errors propagate.
    #[instrument(level = "debug", skip(self))]
    pub fn load_document(&self, path: &Path) -> ApplicationResult<Document> {
        let name = display_name(path, &self.settings.default_display_name);
        let source = self.fs.read_to_string(path).with_path_context("read", path)?;
        match read_events(&source) {
            Ok(events) => Ok(StructureBuilder::new(name).build(events, Some(path.to_path_buf()))),
            Err(e) => {
                warn!("{}: {}; opening as empty document", path.display(), e);
                Ok(Document::empty(name, Some(path.to_path_buf())))
            }
        }
    }

    /// Open `path` as the last top-level entry.
    ///
    /// Opening a path that is already open returns the existing node.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn add_file(&self, workspace: &mut Workspace, path: &Path) -> ApplicationResult<NodeId> {
        let kind = self.classify(path)?;
        let path = self.normalize(path);
        if let Some(row) = workspace.row_of_path(&path) {
            debug!("already open at row {row}");
            return Ok(workspace.entry_id(row)?);
        }

        let id = match kind {
            FileKind::St => {
                let document = self.load_document(&path)?;
                workspace.attach_document(path.clone(), document)?
            }
            FileKind::Markdown => {
                let content = self.fs.read_to_string(&path).with_path_context("read", &path)?;
                let name = display_name(&path, &self.settings.default_display_name);
                workspace.attach_markdown(path.clone(), name, content)?
            }
        };
        info!("opened {}", path.display());
        Ok(id)
    }

    /// Open every ST and Markdown file below `dir`, skipping other files.
    pub fn add_directory(
        &self,
        workspace: &mut Workspace,
        dir: &Path,
    ) -> ApplicationResult<Vec<NodeId>> {
        let files = self.fs.list_files(dir).with_path_context("list", dir)?;
        let mut added = Vec::new();
        for file in files {
            if self.classify(&file).is_err() {
                debug!("skipping {}", file.display());
                continue;
            }
            added.push(self.add_file(workspace, &file)?);
        }
        Ok(added)
    }

    /// Create a new ST file holding a single folder named after its stem,
    /// then open it.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn new_st_file(&self, workspace: &mut Workspace, path: &Path) -> ApplicationResult<NodeId> {
        let path = if has_extension(path, &self.settings.st_extension) {
            path.to_path_buf()
        } else {
            with_extension_appended(path, &self.settings.st_extension)
        };
        if self.fs.exists(&path) {
            return Err::<NodeId, _>(io::Error::from(io::ErrorKind::AlreadyExists))
                .with_path_context("create", &path);
        }

        let name = display_name(&path, &self.settings.default_display_name);
        let text = serialize(&Document::empty(name, None))?;
        self.fs.ensure_parent(&path).with_path_context("create dir for", &path)?;
        self.fs.write(&path, &text).with_path_context("write", &path)?;
        info!("created {}", path.display());
        self.add_file(workspace, &path)
    }

    /// Write the entry at `row` back to its file.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn save(&self, workspace: &mut Workspace, row: usize) -> ApplicationResult<()> {
        let id = workspace.entry_id(row)?;
        let entry = workspace.entry(row)?;
        let path = entry.path.clone();
        let text = match &entry.document {
            Some(document) => serialize(document)?,
            None => workspace
                .model()
                .node(id)?
                .content()
                .unwrap_or_default()
                .to_string(),
        };
        self.fs.write(&path, &text).with_path_context("write", &path)?;

        if let Some(document) = workspace.entry_mut(row)?.document.as_mut() {
            document.mark_clean();
        }
        debug!("saved {}", path.display());
        Ok(())
    }

    /// Re-read an open file in place, keeping its row.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn reload(&self, workspace: &mut Workspace, path: &Path) -> ApplicationResult<()> {
        let path = self.normalize(path);
        let row = workspace
            .row_of_path(&path)
            .ok_or_else(|| ApplicationError::NotOpen(path.clone()))?;
        match workspace.entry(row)?.kind {
            FileKind::St => {
                let document = self.load_document(&path)?;
                workspace.replace_document(row, document)?;
            }
            FileKind::Markdown => {
                let content = self.fs.read_to_string(&path).with_path_context("read", &path)?;
                workspace.replace_markdown(row, content)?;
            }
        }
        info!("reloaded {}", path.display());
        Ok(())
    }

    /// Path of the entry at `row`.
    pub fn entry_path(&self, workspace: &Workspace, row: usize) -> ApplicationResult<PathBuf> {
        Ok(workspace.entry(row)?.path.clone())
    }

    /// Row of the open file at `path`.
    pub fn entry_row(&self, workspace: &Workspace, path: &Path) -> Option<usize> {
        workspace.row_of_path(&self.normalize(path))
    }

    /// Document of the ST entry at `row`; `None` for Markdown entries.
    pub fn document<'a>(
        &self,
        workspace: &'a Workspace,
        row: usize,
    ) -> ApplicationResult<Option<&'a Document>> {
        Ok(workspace.entry(row)?.document.as_ref())
    }

    // ============================================================
    // Session
    // ============================================================

    pub fn session(&self) -> ApplicationResult<Session> {
        Session::load(self.fs.as_ref(), &self.settings.session_file)
    }

    /// Persist the open files of `workspace`, replacing the stored session.
    pub fn save_session(&self, workspace: &Workspace) -> ApplicationResult<()> {
        let mut session = Session::default();
        for entry in workspace.entries() {
            session.add(entry.path.clone(), entry.kind);
        }
        session.save(self.fs.as_ref(), &self.settings.session_file)
    }

    /// Reopen the stored session. Files that no longer exist are skipped.
    ///
    /// Returns the number of entries opened.
    #[instrument(level = "debug", skip(self, workspace))]
    pub fn restore_session(&self, workspace: &mut Workspace) -> ApplicationResult<usize> {
        let session = self.session()?;
        let mut opened = 0;
        for entry in &session.files {
            if !self.fs.is_file(&entry.path) {
                warn!("session file missing: {}", entry.path.display());
                continue;
            }
            self.add_file(workspace, &entry.path)?;
            opened += 1;
        }
        Ok(opened)
    }

    /// Add `paths` to the stored session. Returns how many were new.
    pub fn remember(&self, paths: &[PathBuf]) -> ApplicationResult<usize> {
        let mut session = self.session()?;
        let mut added = 0;
        for path in paths {
            let kind = self.classify(path)?;
            if session.add(self.normalize(path), kind) {
                added += 1;
            }
        }
        session.save(self.fs.as_ref(), &self.settings.session_file)?;
        Ok(added)
    }

    /// Drop `path` from the stored session. Returns whether it was listed.
    pub fn forget(&self, path: &Path) -> ApplicationResult<bool> {
        let mut session = self.session()?;
        let removed = session.remove(&self.normalize(path));
        if removed {
            session.save(self.fs.as_ref(), &self.settings.session_file)?;
        }
        Ok(removed)
    }

    pub fn clear_session(&self) -> ApplicationResult<()> {
        Session::default().save(self.fs.as_ref(), &self.settings.session_file)
    }

    /// Canonical form when the path exists, as given otherwise.
    fn normalize(&self, path: &Path) -> PathBuf {
        self.fs
            .canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
