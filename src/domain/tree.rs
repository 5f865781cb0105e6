//! Arena-backed tree model with (parent, row) addressing.

use std::collections::HashMap;

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId, NodeKind, Subtree, ROOT_SENTINEL};

/// Presentation hint derived from a node's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleHint {
    pub bold: bool,
    /// `#rrggbb`, or `None` for the default foreground
    pub color: Option<&'static str>,
}

/// Owns one tree of nodes and exposes index-based navigation and mutation.
///
/// Every node in the arena is reachable from the root: removing a child
/// frees its whole subtree, so a handle resolves iff its node is attached.
/// Rows are never cached; they are computed from the live `children` order.
#[derive(Debug)]
pub struct TreeModel {
    arena: Arena<Node>,
    root: NodeId,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node {
            name: ROOT_SENTINEL.to_string(),
            kind: NodeKind::Root,
            content: None,
            parent: None,
            children: Vec::new(),
        }));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of attached nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Resolve a handle, failing with `DetachedNode` for removed nodes.
    pub fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.arena.get(id.0).ok_or(DomainError::DetachedNode)
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.arena.get_mut(id.0).ok_or(DomainError::DetachedNode)
    }

    pub fn child_count(&self, parent: NodeId) -> DomainResult<usize> {
        Ok(self.node(parent)?.children.len())
    }

    pub fn child_at(&self, parent: NodeId, row: usize) -> DomainResult<NodeId> {
        let children = &self.node(parent)?.children;
        children
            .get(row)
            .copied()
            .ok_or(DomainError::IndexOutOfRange {
                row,
                len: children.len(),
            })
    }

    pub fn parent_of(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Live position of `id` among its parent's children. The root reports row 0.
    pub fn row_of(&self, id: NodeId) -> DomainResult<usize> {
        let node = self.node(id)?;
        match node.parent {
            None => Ok(0),
            Some(parent) => self
                .node(parent)?
                .children
                .iter()
                .position(|&child| child == id)
                .ok_or(DomainError::DetachedNode),
        }
    }

    pub fn kind_of(&self, id: NodeId) -> DomainResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    pub fn is_expandable(&self, id: NodeId) -> DomainResult<bool> {
        let node = self.node(id)?;
        Ok(node.kind.is_container() && !node.children.is_empty())
    }

    /// Number of Folder ancestors, Root excluded. Presentation only.
    pub fn depth_of(&self, id: NodeId) -> DomainResult<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor)?;
            if node.kind == NodeKind::Folder {
                depth += 1;
            }
            current = node.parent;
        }
        Ok(depth)
    }

    pub fn style_hint(&self, id: NodeId) -> DomainResult<StyleHint> {
        let hint = match self.kind_of(id)? {
            NodeKind::Root => StyleHint {
                bold: false,
                color: None,
            },
            NodeKind::Folder => StyleHint {
                bold: true,
                color: Some("#006400"),
            },
            NodeKind::Template => StyleHint {
                bold: false,
                color: Some("#00008B"),
            },
            NodeKind::File | NodeKind::Markdown => StyleHint {
                bold: false,
                color: Some("#2a82da"),
            },
        };
        Ok(hint)
    }

    /// Rows from the root down to `id`. Empty for the root itself.
    pub fn path_of(&self, id: NodeId) -> DomainResult<Vec<usize>> {
        let mut rows = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current)? {
            rows.push(self.row_of(current)?);
            current = parent;
        }
        rows.reverse();
        Ok(rows)
    }

    /// Follow `rows` down from the root.
    pub fn resolve(&self, rows: &[usize]) -> DomainResult<NodeId> {
        rows.iter()
            .try_fold(self.root, |parent, &row| self.child_at(parent, row))
    }

    /// Insert `subtree` at `row` under `parent`, shifting later siblings.
    ///
    /// `row == child_count` appends. Fails with `InvalidKind` when `parent`
    /// is a leaf kind, or when the subtree itself would give children to a
    /// leaf or contain a second Root.
    #[instrument(level = "trace", skip(self, subtree), fields(name = %subtree.name))]
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        row: usize,
        subtree: Subtree,
    ) -> DomainResult<NodeId> {
        let parent_node = self.node(parent)?;
        if parent_node.kind.is_leaf() {
            return Err(DomainError::InvalidKind {
                kind: parent_node.kind,
            });
        }
        let len = parent_node.children.len();
        if row > len {
            return Err(DomainError::IndexOutOfRange { row, len });
        }
        validate_subtree(&subtree)?;

        let id = self.graft(parent, subtree);
        self.node_mut(parent)?.children.insert(row, id);
        debug!("inserted node at row {row}");
        Ok(id)
    }

    /// Insert `subtree` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, subtree: Subtree) -> DomainResult<NodeId> {
        let row = self.child_count(parent)?;
        self.insert_child(parent, row, subtree)
    }

    /// Detach the child at `row` and return it as an owned subtree.
    ///
    /// All descendants are freed; their handles stop resolving.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, row: usize) -> DomainResult<Subtree> {
        let child = self.child_at(parent, row)?;
        let subtree = self.snapshot(child)?;
        let doomed: Vec<NodeId> = self.descendants(child).map(|(id, _)| id).collect();
        self.node_mut(parent)?.children.remove(row);
        for id in doomed {
            self.arena.remove(id.0);
        }
        debug!("removed {} node(s) at row {row}", subtree.node_count());
        Ok(subtree)
    }

    /// Rename a node. The root's sentinel name is fixed.
    pub fn relabel(&mut self, id: NodeId, name: impl Into<String>) -> DomainResult<()> {
        let node = self.node_mut(id)?;
        if node.kind == NodeKind::Root {
            return Err(DomainError::InvalidKind { kind: node.kind });
        }
        node.name = name.into();
        Ok(())
    }

    /// Replace the content of a content-bearing node.
    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> DomainResult<()> {
        let node = self.node_mut(id)?;
        if !node.kind.carries_content() {
            return Err(DomainError::InvalidKind { kind: node.kind });
        }
        node.content = Some(content.into());
        Ok(())
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn snapshot(&self, id: NodeId) -> DomainResult<Subtree> {
        self.fold(
            id,
            |_, node| Subtree {
                name: node.name.clone(),
                kind: node.kind,
                content: node.content().map(str::to_string),
                children: Vec::new(),
            },
            |subtree, children| subtree.children = children,
        )
    }

    /// Build a value for the subtree at `id` bottom-up, without recursion.
    ///
    /// `make` creates the value for one node; `join` hands it the values of
    /// that node's children, in row order.
    pub fn fold<T>(
        &self,
        id: NodeId,
        mut make: impl FnMut(NodeId, &Node) -> T,
        mut join: impl FnMut(&mut T, Vec<T>),
    ) -> DomainResult<T> {
        self.node(id)?;
        let mut slots: HashMap<NodeId, usize> = HashMap::new();
        let mut items: Vec<(Option<usize>, T)> = Vec::new();
        for (current, node) in self.descendants(id) {
            let parent = if current == id {
                None
            } else {
                node.parent.and_then(|p| slots.get(&p).copied())
            };
            slots.insert(current, items.len());
            items.push((parent, make(current, node)));
        }

        // Reverse pre-order: every child is finished before its parent
        let mut pending: Vec<Vec<T>> = std::iter::repeat_with(Vec::new)
            .take(items.len())
            .collect();
        while let Some((parent, mut value)) = items.pop() {
            let mut children = std::mem::take(&mut pending[items.len()]);
            children.reverse();
            join(&mut value, children);
            match parent {
                Some(slot) => pending[slot].push(value),
                None => return Ok(value),
            }
        }
        Err(DomainError::DetachedNode)
    }

    /// Pre-order traversal starting at the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, id)
    }

    fn graft(&mut self, parent: NodeId, mut subtree: Subtree) -> NodeId {
        let children = std::mem::take(&mut subtree.children);
        let top = self.alloc(parent, subtree);
        let mut pending: Vec<(NodeId, Subtree)> =
            children.into_iter().rev().map(|child| (top, child)).collect();
        while let Some((owner, mut child)) = pending.pop() {
            let grandchildren = std::mem::take(&mut child.children);
            let id = self.alloc(owner, child);
            if let Some(node) = self.arena.get_mut(owner.0) {
                node.children.push(id);
            }
            pending.extend(grandchildren.into_iter().rev().map(|g| (id, g)));
        }
        top
    }

    /// Store one node with no children yet.
    fn alloc(&mut self, parent: NodeId, mut subtree: Subtree) -> NodeId {
        let kind = subtree.kind;
        let content = if kind.carries_content() {
            subtree.content.take()
        } else {
            None
        };
        NodeId(self.arena.insert(Node {
            name: std::mem::take(&mut subtree.name),
            kind,
            content,
            parent: Some(parent),
            children: Vec::new(),
        }))
    }
}

fn validate_subtree(subtree: &Subtree) -> DomainResult<()> {
    let mut stack = vec![subtree];
    while let Some(current) = stack.pop() {
        if current.kind == NodeKind::Root
            || (current.kind.is_leaf() && !current.children.is_empty())
        {
            return Err(DomainError::InvalidKind { kind: current.kind });
        }
        stack.extend(current.children.iter());
    }
    Ok(())
}

pub struct TreeIterator<'a> {
    model: &'a TreeModel,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(model: &'a TreeModel, start: NodeId) -> Self {
        let stack = if model.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { model, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.model.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
