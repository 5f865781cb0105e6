//! Tree nodes: the unit stored in a [`TreeModel`](crate::domain::TreeModel) arena.

use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Name given to the synthetic root of every tree.
pub const ROOT_SENTINEL: &str = "Root";

/// Stable handle to a node inside one tree model.
///
/// Handles are generational: once a node is removed, its handle never
/// resolves again, even if the arena slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Folder,
    Template,
    /// Top-level wrapper for an opened ST file
    File,
    /// Top-level wrapper for an opened Markdown file
    Markdown,
}

impl NodeKind {
    /// Root and Folder nodes own children; every other kind is a leaf.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Folder)
    }

    pub fn is_leaf(self) -> bool {
        !self.is_container()
    }

    /// Whether `content` is meaningful for this kind.
    pub fn carries_content(self) -> bool {
        matches!(
            self,
            NodeKind::Template | NodeKind::File | NodeKind::Markdown
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Folder => "folder",
            NodeKind::Template => "template",
            NodeKind::File => "file",
            NodeKind::Markdown => "markdown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Node stored in the arena.
///
/// `parent` is a non-owning back-reference used for upward navigation only;
/// ownership runs through the parent's `children`.
#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) content: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Content for Template/File/Markdown nodes; always `None` otherwise.
    pub fn content(&self) -> Option<&str> {
        if self.kind.carries_content() {
            self.content.as_deref()
        } else {
            None
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Owned, arena-independent copy of a subtree.
///
/// Used both as input for inserts and as the value handed back when a
/// subtree is detached from a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    pub name: String,
    pub kind: NodeKind,
    pub content: Option<String>,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            content: None,
            children: Vec::new(),
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Folder)
    }

    pub fn template(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Template).with_content(content)
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::File)
    }

    pub fn markdown(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Markdown).with_content(content)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: Subtree) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(subtree) = stack.pop() {
            count += 1;
            stack.extend(subtree.children.iter());
        }
        count
    }
}

impl Drop for Subtree {
    // Flatten first: the default drop recurses once per nesting level
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut child) = stack.pop() {
            stack.append(&mut child.children);
        }
    }
}
