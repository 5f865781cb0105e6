//! Canonical ST writer, the inverse of the grammar + builder pair.

use tracing::instrument;

use crate::domain::document::Document;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, NodeKind};
use crate::domain::tree::TreeModel;

/// Serialize a whole document.
///
/// The first folder that the builder elided is re-materialized from the
/// document's display name, so the output re-reads into an equal tree.
pub fn serialize(document: &Document) -> DomainResult<String> {
    write_document(document, None)
}

/// Serialize `document` as if the subtree at `skip` had been removed.
///
/// Lets callers persist a deletion before mutating the in-memory tree.
pub fn serialize_excluding(document: &Document, skip: NodeId) -> DomainResult<String> {
    document.model().node(skip)?;
    write_document(document, Some(skip))
}

/// Pending work for the writer's explicit stack.
enum Step {
    /// Write a child record, preceded by a separator unless it is first
    Record { id: NodeId, separated: bool },
    /// Close the folder opened most recently
    Close,
}

#[instrument(level = "debug", skip(document), fields(name = document.display_name()))]
fn write_document(document: &Document, skip: Option<NodeId>) -> DomainResult<String> {
    let model = document.model();
    let mut out = String::new();
    let mut stack = Vec::new();
    open_folder(&mut out, &mut stack, model, document.display_name(), model.root(), skip)?;

    while let Some(step) = stack.pop() {
        match step {
            Step::Close => out.push_str("\n]}"),
            Step::Record { id, separated } => {
                if separated {
                    out.push_str(",\n");
                }
                let node = model.node(id)?;
                match node.kind() {
                    NodeKind::Folder => {
                        open_folder(&mut out, &mut stack, model, node.name(), id, skip)?
                    }
                    NodeKind::Template => {
                        out.push_str(&template_record(node.name(), node.content().unwrap_or("")))
                    }
                    kind => return Err(DomainError::InvalidKind { kind }),
                }
            }
        }
    }
    Ok(out)
}

/// Write a folder header and schedule its children followed by its close.
/// A folder without children is closed on the spot.
fn open_folder(
    out: &mut String,
    stack: &mut Vec<Step>,
    model: &TreeModel,
    name: &str,
    id: NodeId,
    skip: Option<NodeId>,
) -> DomainResult<()> {
    out.push_str(&format!("{{1, {{{}, 1, 0, \"\", \"\"}}, [\n", quote(name)));
    let children: Vec<NodeId> = model
        .node(id)?
        .children()
        .iter()
        .copied()
        .filter(|&child| Some(child) != skip)
        .collect();
    if children.is_empty() {
        out.push_str("]}");
        return Ok(());
    }
    stack.push(Step::Close);
    for (row, &child) in children.iter().enumerate().rev() {
        stack.push(Step::Record {
            id: child,
            separated: row > 0,
        });
    }
    Ok(())
}

fn template_record(name: &str, content: &str) -> String {
    format!("{{0, {{{}, 0, 1, \"\", {}}}}}", quote(name), quote(content))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
