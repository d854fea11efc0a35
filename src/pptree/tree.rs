//! Translation-unit tree model
//!
//! This module provides the mutable n-ary tree that the driver builds from
//! the upstream tag stream and that the pipeline rules restructure in place.
//! Nodes live in an arena owned by [`Tree`] and are addressed through copyable
//! [`NodeId`] handles, so "the same node" always means "the same handle":
//! `replace` and `remove` match children by identity, never by value, and the
//! chain references between an `#if` and its `#elif`/`#else` branches are
//! plain handles instead of owning links.
//!
//! # Structure
//!
//! - `Composite`: a labeled grammar element (`"function"`, `"block"`, `"if"`, ...)
//! - `Text`: a raw source token between structural tags
//! - `If` / `Else`: preprocessor conditional branches with raw and effective
//!   condition text
//! - `EndIf`: a transient marker closing an if-chain; it only exists between
//!   directive translation and block restructuring
//!
//! Detached subtrees stay allocated in the arena but become unreachable from
//! the root; the pipeline never revisits them.

use std::fmt;

/// Handle to a node inside a [`Tree`] arena.
///
/// Comparing two `NodeId`s compares node identity, not node contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Which directive started an if-chain.
///
/// `#ifndef` is stored as `Ifdef` with a pre-negated condition; no separate
/// kind exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfKind {
    If,
    Ifdef,
}

/// Which continuation directive an [`NodeKind::Else`] node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElseKind {
    ElseIf,
    Else,
}

/// The typed payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A labeled node for all non-preprocessor structure.
    Composite { tag: String },

    /// An immutable raw text token; never has children.
    Text(String),

    /// The starting branch of an if-chain (`#if`, `#ifdef`, `#ifndef`).
    If {
        kind: IfKind,
        /// Condition text as assembled from the directive tokens.
        condition: String,
        /// Set by condition computation; equals `condition` for a starting if.
        effective: Option<String>,
        /// Non-owning references to the `#elif`/`#else` branches of this
        /// chain, in source order. The referenced nodes are owned by their
        /// tree parent, which need not be this node.
        chain: Vec<NodeId>,
    },

    /// A continuation branch (`#elif`, `#else`) of an if-chain.
    Else {
        kind: ElseKind,
        /// Raw condition text; `None` for a bare `#else`.
        condition: Option<String>,
        /// Set by condition computation from the whole chain.
        effective: Option<String>,
        /// Non-owning back-reference to the starting if of the chain.
        start: NodeId,
    },

    /// Marker closing an if-chain. Consumed by block restructuring and never
    /// present in a finished tree.
    EndIf,
}

impl NodeKind {
    /// Short variant label used in diagnostics.
    fn label(&self) -> &str {
        match self {
            NodeKind::Composite { tag } => tag,
            NodeKind::Text(_) => "text",
            NodeKind::If { .. } => "if-block",
            NodeKind::Else { .. } => "else-block",
            NodeKind::EndIf => "endif-marker",
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// Errors raised by the tree itself.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A child index outside `[0, child_count)` was requested.
    IndexOutOfBounds {
        index: usize,
        len: usize,
        node: String,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::IndexOutOfBounds { index, len, node } => write!(
                f,
                "child index {} out of bounds for node '{}' with {} children",
                index, node, len
            ),
        }
    }
}

impl std::error::Error for TreeError {}

/// Arena-backed translation-unit tree.
///
/// Every node is created through [`Tree::alloc`] (or [`Tree::new`] for the
/// root) and owned by the arena; parent/child structure is a separate layer
/// of `NodeId` lists. Reparenting is always an explicit `remove` followed by
/// an `append`.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// Creates a tree whose root is a composite with the given tag.
    pub fn new(root_tag: &str) -> Self {
        let root_data = NodeData {
            kind: NodeKind::Composite {
                tag: root_tag.to_string(),
            },
            children: Vec::new(),
        };
        Tree {
            nodes: vec![root_data],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocates a new, detached node.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            children: Vec::new(),
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// The node's immediate children, in order. Iteration over this slice is
    /// non-recursive.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    /// Random access to a child by 0-based index.
    pub fn child(&self, id: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let children = &self.nodes[id.0].children;
        children
            .get(index)
            .copied()
            .ok_or_else(|| TreeError::IndexOutOfBounds {
                index,
                len: children.len(),
                node: self.nodes[id.0].kind.label().to_string(),
            })
    }

    /// Appends `child` to the end of `parent`'s child list.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Substitutes `new` at the position of `old` among `parent`'s children.
    /// Matches by identity; no-op if `old` is not a child of `parent`.
    pub fn replace(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if let Some(pos) = children.iter().position(|&c| c == old) {
            children[pos] = new;
        }
    }

    /// Removes the first identity match of `old` from `parent`'s children.
    /// No-op if `old` is not a child of `parent`.
    pub fn remove(&mut self, parent: NodeId, old: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if let Some(pos) = children.iter().position(|&c| c == old) {
            children.remove(pos);
        }
    }

    /// Detaches all children of `parent`, discarding the subtrees.
    pub fn clear_children(&mut self, parent: NodeId) {
        self.nodes[parent.0].children.clear();
    }

    /// Detaches and returns all children of `parent`, in order.
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        std::mem::take(&mut self.nodes[parent.0].children)
    }

    /// Raw condition text of a conditional node, `None` for a bare `#else`
    /// and for non-conditional nodes.
    pub fn condition(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::If { condition, .. } => Some(condition),
            NodeKind::Else { condition, .. } => condition.as_deref(),
            _ => None,
        }
    }

    /// Effective condition of a conditional node, if computed.
    pub fn effective_condition(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::If { effective, .. } | NodeKind::Else { effective, .. } => {
                effective.as_deref()
            }
            _ => None,
        }
    }

    /// Tag of a composite node, `None` otherwise.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Composite { tag } => Some(tag),
            _ => None,
        }
    }

    /// Text of a leaf token node, `None` otherwise.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// All nodes reachable from `id`, preorder, `id` first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Renders the subtree at `id` as indented text, one structural node per
    /// line with text tokens inlined. Used for diagnostics and test output.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, 0, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, depth: usize, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::EndIf => out.push_str("#ENDIF"),
            NodeKind::Composite { tag } => {
                out.push_str(&tag.to_uppercase());
                out.push(':');
                self.render_children(id, depth, out);
            }
            NodeKind::If {
                kind, condition, ..
            } => {
                out.push_str(match kind {
                    IfKind::If => "#IF ",
                    IfKind::Ifdef => "#IFDEF ",
                });
                out.push_str(condition);
                if let Some(effective) = self.effective_condition(id) {
                    if effective != condition {
                        out.push_str(" [");
                        out.push_str(effective);
                        out.push(']');
                    }
                }
                self.render_children(id, depth, out);
            }
            NodeKind::Else {
                kind, condition, ..
            } => {
                out.push_str(match kind {
                    ElseKind::ElseIf => "#ELSEIF",
                    ElseKind::Else => "#ELSE",
                });
                if let Some(condition) = condition {
                    out.push(' ');
                    out.push_str(condition);
                }
                if let Some(effective) = self.effective_condition(id) {
                    out.push_str(" [");
                    out.push_str(effective);
                    out.push(']');
                }
                self.render_children(id, depth, out);
            }
        }
    }

    fn render_children(&self, id: NodeId, depth: usize, out: &mut String) {
        let pad = "    ".repeat(depth + 1);
        for &child in self.children(id) {
            if let NodeKind::Text(text) = self.kind(child) {
                out.push(' ');
                out.push_str(text);
            } else {
                out.push('\n');
                out.push_str(&pad);
                self.render_into(child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tree: &mut Tree, s: &str) -> NodeId {
        tree.alloc(NodeKind::Text(s.to_string()))
    }

    #[test]
    fn append_and_child_access() {
        let mut tree = Tree::new("unit");
        let a = text(&mut tree, "a");
        let b = text(&mut tree, "b");
        tree.append(tree.root(), a);
        tree.append(tree.root(), b);

        assert_eq!(tree.child_count(tree.root()), 2);
        assert_eq!(tree.child(tree.root(), 0), Ok(a));
        assert_eq!(tree.child(tree.root(), 1), Ok(b));
    }

    #[test]
    fn child_out_of_bounds_is_an_error() {
        let tree = Tree::new("unit");
        let err = tree.child(tree.root(), 0).unwrap_err();
        assert_eq!(
            err,
            TreeError::IndexOutOfBounds {
                index: 0,
                len: 0,
                node: "unit".to_string(),
            }
        );
    }

    #[test]
    fn replace_matches_by_identity_not_value() {
        let mut tree = Tree::new("unit");
        // Two structurally identical leaves; only the second may be replaced.
        let first = text(&mut tree, "x");
        let second = text(&mut tree, "x");
        let replacement = text(&mut tree, "y");
        tree.append(tree.root(), first);
        tree.append(tree.root(), second);

        tree.replace(tree.root(), second, replacement);
        assert_eq!(tree.children(tree.root()), &[first, replacement]);
    }

    #[test]
    fn replace_of_missing_node_is_a_noop() {
        let mut tree = Tree::new("unit");
        let child = text(&mut tree, "x");
        let stranger = text(&mut tree, "x");
        let replacement = text(&mut tree, "y");
        tree.append(tree.root(), child);

        tree.replace(tree.root(), stranger, replacement);
        assert_eq!(tree.children(tree.root()), &[child]);
    }

    #[test]
    fn remove_detaches_first_identity_match() {
        let mut tree = Tree::new("unit");
        let a = text(&mut tree, "a");
        let b = text(&mut tree, "b");
        tree.append(tree.root(), a);
        tree.append(tree.root(), b);

        tree.remove(tree.root(), a);
        assert_eq!(tree.children(tree.root()), &[b]);

        // Removing again is a no-op.
        tree.remove(tree.root(), a);
        assert_eq!(tree.children(tree.root()), &[b]);
    }

    #[test]
    fn take_children_leaves_node_empty() {
        let mut tree = Tree::new("unit");
        let a = text(&mut tree, "a");
        tree.append(tree.root(), a);

        let taken = tree.take_children(tree.root());
        assert_eq!(taken, vec![a]);
        assert_eq!(tree.child_count(tree.root()), 0);
    }

    #[test]
    fn render_shows_nested_structure() {
        let mut tree = Tree::new("unit");
        let block = tree.alloc(NodeKind::Composite {
            tag: "block".to_string(),
        });
        let token = text(&mut tree, "x");
        tree.append(tree.root(), block);
        tree.append(block, token);

        assert_eq!(tree.render(tree.root()), "UNIT:\n    BLOCK: x");
    }

    #[test]
    fn descendants_is_preorder() {
        let mut tree = Tree::new("unit");
        let block = tree.alloc(NodeKind::Composite {
            tag: "block".to_string(),
        });
        let inner = text(&mut tree, "x");
        let after = text(&mut tree, "y");
        tree.append(tree.root(), block);
        tree.append(block, inner);
        tree.append(tree.root(), after);

        assert_eq!(
            tree.descendants(tree.root()),
            vec![tree.root(), block, inner, after]
        );
    }
}
