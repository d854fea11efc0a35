//! Else-if unwrapping rule
//!
//! The upstream grammar represents `else if` as an `elseif` composite whose
//! second child is a nested `if` composite. That wrapper carries no
//! information of its own, so the inner if's children are spliced up into the
//! `elseif` node and the wrapper is discarded.
//!
//! Any `elseif` composite that does not match the expected two-child shape is
//! a structural mismatch. In strict mode that aborts the conversion; in
//! permissive mode the offending node is logged and its subtree left
//! unmodified.

use crate::pptree::pipeline::rule::{Strictness, TransformationError, TransformationRule};
use crate::pptree::tree::{NodeId, Tree};

#[derive(Debug, Default)]
pub struct ElseIfUnwrap {
    strictness: Strictness,
}

impl ElseIfUnwrap {
    pub fn new() -> Self {
        ElseIfUnwrap::default()
    }

    pub fn with_strictness(strictness: Strictness) -> Self {
        ElseIfUnwrap { strictness }
    }

    fn visit(&self, tree: &mut Tree, node: NodeId) -> Result<(), TransformationError> {
        if tree.tag(node) == Some("elseif") {
            self.unwrap_else_if(tree, node)?;
        }

        // The spliced children are visited here too.
        for i in 0..tree.child_count(node) {
            let child = tree.child(node, i)?;
            self.visit(tree, child)?;
        }
        Ok(())
    }

    fn unwrap_else_if(&self, tree: &mut Tree, node: NodeId) -> Result<(), TransformationError> {
        let matches_shape = tree.child_count(node) == 2
            && tree.tag(tree.child(node, 1)?) == Some("if");

        if !matches_shape {
            match self.strictness {
                Strictness::Strict => {
                    return Err(TransformationError::StructuralMismatch(format!(
                        "unexpected shape of elseif node: {}",
                        tree.render(node)
                    )))
                }
                Strictness::Permissive => {
                    log::error!(
                        "leaving elseif node with unexpected shape unmodified: {}",
                        tree.render(node)
                    );
                    return Ok(());
                }
            }
        }

        let inner = tree.child(node, 1)?;
        tree.remove(node, inner);
        for child in tree.take_children(inner) {
            tree.append(node, child);
        }
        Ok(())
    }
}

impl TransformationRule for ElseIfUnwrap {
    fn name(&self) -> &'static str {
        "else-if-unwrapping"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        self.visit(tree, tree.root())
    }
}
