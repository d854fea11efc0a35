//! Transformation rule trait and error types

use std::fmt;

use crate::pptree::tree::{Tree, TreeError};

/// A single restructuring pass over one translation-unit tree.
///
/// Rules mutate the tree in place and may carry per-run state (open-block
/// stacks, pending-move lists). A rule instance must not be reused for a
/// second tree; the converter constructs fresh instances for every
/// conversion.
pub trait TransformationRule {
    /// Name used in diagnostics when a pass fails.
    fn name(&self) -> &'static str;

    /// Transforms the whole tree, starting from its root.
    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError>;
}

/// Errors raised by transformation rules.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformationError {
    /// A node's shape violates an invariant the rule relies on. Carries the
    /// offending node's rendered text.
    StructuralMismatch(String),
    /// A bounds violation surfaced by the tree.
    Tree(TreeError),
}

impl fmt::Display for TransformationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformationError::StructuralMismatch(detail) => {
                write!(f, "structural mismatch: {}", detail)
            }
            TransformationError::Tree(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TransformationError {}

impl From<TreeError> for TransformationError {
    fn from(err: TreeError) -> Self {
        TransformationError::Tree(err)
    }
}

/// How shape fixups react to nodes that do not match their expected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Abort the conversion with a structural mismatch.
    #[default]
    Strict,
    /// Log the offending node and leave its subtree unmodified.
    Permissive,
}
