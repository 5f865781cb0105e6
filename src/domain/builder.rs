//! Builds a document tree from the grammar's structural events.

use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::domain::document::Document;
use crate::domain::node::{NodeId, Subtree};
use crate::domain::tree::TreeModel;

/// One structural event, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEvent {
    EnterFolder(String),
    ExitFolder,
    Template { name: String, content: String },
}

impl StructuralEvent {
    pub fn enter(name: impl Into<String>) -> Self {
        StructuralEvent::EnterFolder(name.into())
    }

    pub fn template(name: impl Into<String>, content: impl Into<String>) -> Self {
        StructuralEvent::Template {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Constructs a [`Document`] from a depth-first event stream.
///
/// The builder never fails: malformed input is rejected earlier by the
/// grammar front-end, and the two tolerated irregularities (the elided
/// first folder and unmatched exits) are handled in their own branches.
#[derive(Debug, Clone)]
pub struct StructureBuilder {
    fallback_name: String,
}

impl StructureBuilder {
    /// `fallback_name` becomes the display name when the stream has no folders.
    pub fn new(fallback_name: impl Into<String>) -> Self {
        Self {
            fallback_name: fallback_name.into(),
        }
    }

    #[instrument(level = "debug", skip(self, events))]
    pub fn build<I>(&self, events: I, path: Option<PathBuf>) -> Document
    where
        I: IntoIterator<Item = StructuralEvent>,
    {
        let mut state = BuildState::new();
        for event in events {
            match event {
                StructuralEvent::EnterFolder(name) => state.open_scope(name),
                StructuralEvent::ExitFolder => state.close_scope(),
                StructuralEvent::Template { name, content } => {
                    state.attach(Subtree::template(name, content))
                }
            }
        }

        let display_name = state
            .display_name
            .unwrap_or_else(|| self.fallback_name.clone());
        debug!(
            "built '{}' with {} node(s)",
            display_name,
            state.model.node_count()
        );
        Document::with_model(display_name, path, state.model)
    }
}

struct BuildState {
    model: TreeModel,
    /// Open scopes; the bottom entry is always the root.
    stack: Vec<NodeId>,
    /// Set by the first folder of the stream, which is not materialized.
    display_name: Option<String>,
}

impl BuildState {
    fn new() -> Self {
        let model = TreeModel::new();
        let stack = vec![model.root()];
        Self {
            model,
            stack,
            display_name: None,
        }
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.model.root())
    }

    fn open_scope(&mut self, name: String) {
        // The first folder of the whole stream names the document and stands
        // for the root itself. Its matching exit lands on the root guard.
        if self.display_name.is_none() {
            debug!("root folder '{}' taken as display name", name);
            self.display_name = Some(name);
            return;
        }

        match self.model.append_child(self.top(), Subtree::folder(name)) {
            Ok(id) => self.stack.push(id),
            Err(e) => debug!("folder not attached: {e}"),
        }
    }

    fn close_scope(&mut self) {
        // Lenient: an exit with no open folder is ignored rather than an error.
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            debug!("unmatched folder exit ignored");
        }
    }

    fn attach(&mut self, subtree: Subtree) {
        if let Err(e) = self.model.append_child(self.top(), subtree) {
            debug!("template not attached: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_exit_on_empty_stack_when_closing_then_root_stays() {
        let mut state = BuildState::new();
        state.close_scope();
        state.close_scope();
        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.top(), state.model.root());
    }

    #[test]
    fn given_folder_after_templates_when_first_then_still_elided() {
        let builder = StructureBuilder::new("fallback");
        let doc = builder.build(
            vec![
                StructuralEvent::template("A", "x"),
                StructuralEvent::enter("Late"),
                StructuralEvent::template("B", "y"),
                StructuralEvent::ExitFolder,
            ],
            None,
        );
        assert_eq!(doc.display_name(), "Late");
        assert_eq!(doc.model().child_count(doc.model().root()).unwrap(), 2);
    }
}
