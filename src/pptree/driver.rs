//! Upstream tag-stream interface
//!
//! The structural-markup parser that produces the flat parse lives outside
//! this crate; it talks to us through the three-operation [`TagSink`]
//! interface (element start, element end, text). [`TreeBuilder`] is the sink
//! that turns such a stream into the flat [`Tree`] the pipeline consumes.
//!
//! Only tags in [`SUPPORTED_TAGS`] create tree nodes. Unrecognized tags are
//! transparent: they create nothing, but text inside them still attaches to
//! the nearest enclosing recognized node. Whitespace-only text is discarded.
//!
//! [`TagEvent`] is a serde-friendly recording of a tag stream, so streams can
//! be stored as JSON and replayed by the CLI and by tests.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::pptree::tree::{NodeId, NodeKind, Tree};

/// Tags that create tree nodes. These are the top-level elements of the
/// srcML C/CPP grammar.
pub static SUPPORTED_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut tags = HashSet::new();
    // C preprocessor
    tags.insert("cpp:include");
    tags.insert("cpp:if");
    tags.insert("cpp:ifdef");
    tags.insert("cpp:ifndef");
    tags.insert("cpp:else");
    tags.insert("cpp:elif");
    tags.insert("cpp:endif");
    tags.insert("cpp:define");
    tags.insert("cpp:undef");
    tags.insert("cpp:pragma");
    tags.insert("cpp:error");
    tags.insert("cpp:warning");
    tags.insert("cpp:line");
    tags.insert("cpp:empty");
    // Translation unit
    tags.insert("unit");
    // Structs and other type definitions
    tags.insert("struct_decl");
    tags.insert("struct");
    tags.insert("union_decl");
    tags.insert("union");
    tags.insert("enum");
    tags.insert("typedef");
    // Functions
    tags.insert("function_decl");
    tags.insert("function");
    // Control structures
    tags.insert("if");
    tags.insert("else");
    tags.insert("elseif");
    tags.insert("while");
    tags.insert("for");
    tags.insert("do");
    tags.insert("switch");
    tags.insert("case");
    tags.insert("default");
    tags.insert("break");
    tags.insert("continue");
    tags.insert("goto");
    tags.insert("label");
    // Statements
    tags.insert("block");
    tags.insert("decl_stmt");
    tags.insert("expr_stmt");
    tags.insert("empty_stmt");
    tags.insert("return");
    // Comments
    tags.insert("comment");
    tags
});

/// Streaming interface fed by the external structural-markup parser.
pub trait TagSink {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]);
    fn end_element(&mut self, name: &str);
    fn text(&mut self, content: &str);
}

/// Errors raised when finishing a [`TreeBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError {
    /// The stream ended without any recognized element.
    NoRoot,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NoRoot => {
                write!(f, "tag stream contained no recognized root element")
            }
        }
    }
}

impl std::error::Error for DriverError {}

/// Builds the flat translation-unit tree from a tag stream.
///
/// The first recognized element becomes the tree root. The root is never
/// popped, so recognized elements arriving after it closes still attach to
/// it rather than being lost.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Option<Tree>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Consumes the builder and returns the built tree.
    pub fn finish(self) -> Result<Tree, DriverError> {
        self.tree.ok_or(DriverError::NoRoot)
    }

    fn current(&self) -> Option<NodeId> {
        self.open.last().copied()
    }
}

impl TagSink for TreeBuilder {
    fn start_element(&mut self, name: &str, _attributes: &[(String, String)]) {
        if !SUPPORTED_TAGS.contains(name) {
            return;
        }

        match &mut self.tree {
            None => {
                let tree = Tree::new(name);
                self.open.push(tree.root());
                self.tree = Some(tree);
            }
            Some(tree) => {
                let node = tree.alloc(NodeKind::Composite {
                    tag: name.to_string(),
                });
                // The root stays open, so a parent always exists here.
                if let Some(parent) = self.open.last().copied() {
                    tree.append(parent, node);
                }
                self.open.push(node);
            }
        }
    }

    fn end_element(&mut self, name: &str) {
        if !SUPPORTED_TAGS.contains(name) {
            return;
        }
        // Keep the root open so trailing elements still find a parent.
        if self.open.len() > 1 {
            self.open.pop();
        }
    }

    fn text(&mut self, content: &str) {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return;
        }

        let parent = self.current();
        match (&mut self.tree, parent) {
            (Some(tree), Some(parent)) => {
                let leaf = tree.alloc(NodeKind::Text(trimmed.to_string()));
                tree.append(parent, leaf);
            }
            _ => {
                log::warn!("discarding text before any recognized element: {:?}", trimmed);
            }
        }
    }
}

/// One recorded tag-stream event. A `Vec<TagEvent>` in JSON is the storable
/// form of a driver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagEvent {
    Start {
        name: String,
        #[serde(default)]
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text {
        content: String,
    },
}

/// Replays recorded events into a sink, in order.
pub fn replay(events: &[TagEvent], sink: &mut impl TagSink) {
    for event in events {
        match event {
            TagEvent::Start { name, attributes } => sink.start_element(name, attributes),
            TagEvent::End { name } => sink.end_element(name),
            TagEvent::Text { content } => sink.text(content),
        }
    }
}
