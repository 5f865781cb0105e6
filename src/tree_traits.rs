//! termtree rendering of documents and workspaces.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Document, NodeId, NodeKind, TreeModel, Workspace};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;

    /// Rendered text of `to_tree_string`.
    fn render(&self) -> String {
        let tree = self.to_tree_string();
        let text = tree.to_string();
        dismantle(tree);
        text
    }
}

/// Drop `tree` leaf by leaf; the default drop recurses once per level.
fn dismantle(tree: Tree<String>) {
    let mut stack = vec![tree];
    while let Some(mut node) = stack.pop() {
        stack.append(&mut node.leaves);
    }
}

fn label(model: &TreeModel, id: NodeId) -> String {
    match model.node(id) {
        Ok(node) => match node.kind() {
            NodeKind::Folder => format!("{}/", node.name()),
            NodeKind::Markdown => format!("{} [md]", node.name()),
            _ => node.name().to_string(),
        },
        Err(_) => "<detached>".to_string(),
    }
}

/// Tree for the document in `model`, with the root relabeled `root_label`.
fn model_tree(model: &TreeModel, root_label: &str) -> Tree<String> {
    let root = model.root();
    model
        .fold(
            root,
            |id, _| {
                if id == root {
                    Tree::new(root_label.to_string())
                } else {
                    Tree::new(label(model, id))
                }
            },
            |tree, leaves| {
                for leaf in leaves {
                    tree.push(leaf);
                }
            },
        )
        .unwrap_or_else(|_| Tree::new(root_label.to_string()))
}

impl TreeNodeConvert for Document {
    #[instrument(level = "debug", skip(self), fields(name = self.display_name()))]
    fn to_tree_string(&self) -> Tree<String> {
        model_tree(self.model(), self.display_name())
    }
}

impl TreeNodeConvert for Workspace {
    fn to_tree_string(&self) -> Tree<String> {
        let model = self.model();
        let mut tree = Tree::new("workspace".to_string());
        for (row, entry) in self.entries().enumerate() {
            let entry_label = match self.entry_id(row) {
                Ok(id) => label(model, id),
                Err(_) => continue,
            };
            let entry_tree = match &entry.document {
                Some(document) => model_tree(document.model(), &entry_label),
                None => Tree::new(entry_label),
            };
            tree.push(entry_tree);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StructuralEvent, StructureBuilder};

    #[test]
    fn given_nested_document_when_rendering_then_marks_folders() {
        let document = StructureBuilder::new("Unnamed").build(
            vec![
                StructuralEvent::enter("Doc"),
                StructuralEvent::enter("Sub"),
                StructuralEvent::template("T1", "hello"),
                StructuralEvent::ExitFolder,
                StructuralEvent::ExitFolder,
            ],
            None,
        );

        let rendered = document.render();

        assert!(rendered.starts_with("Doc\n"));
        assert!(rendered.contains("Sub/"));
        assert!(rendered.contains("T1"));
    }

    #[test]
    fn given_deeply_nested_document_when_rendering_then_completes() {
        let depth = 2_000;
        let mut events = vec![StructuralEvent::enter("Doc")];
        for i in 0..depth {
            events.push(StructuralEvent::enter(format!("f{i}")));
        }
        events.push(StructuralEvent::template("leaf", "x"));
        let document = StructureBuilder::new("Unnamed").build(events, None);

        let rendered = document.render();

        assert_eq!(rendered.lines().count(), depth + 2);
        assert!(rendered.lines().last().unwrap().ends_with("leaf"));
    }
}
