//! Block restructuring rule
//!
//! After directive translation the conditional blocks sit as flat siblings at
//! their original lexical depth; everything between a branch and the next
//! branch (or the closing `#endif`) still sits beside it. This rule re-nests
//! that code into the branch that encloses it, at every nesting depth
//! simultaneously, and consumes the `EndIf` markers.
//!
//! The pass is two-phase so that no child list is mutated while it is being
//! walked: phase one records pending moves `(original parent, node, target
//! block)` while maintaining a stack of currently open blocks, phase two
//! applies the recorded moves in discovery order. Entering an `#elif`/`#else`
//! swaps the open block at the current depth; entering an `#endif` closes it.
//! A conditional node encountered while an *outer* block is open is itself
//! moved into that block, which is what produces proper nesting for
//! `#if` inside `#if`.
//!
//! Only direct siblings of an open block are candidates for moving: each
//! stack entry remembers the parent the block was found under, and a node is
//! reparented only when it sits under that same parent. Nodes already nested
//! deeper (the contents of a statement that is itself being moved, say) keep
//! their parent.

use crate::pptree::pipeline::rule::{TransformationError, TransformationRule};
use crate::pptree::tree::{NodeId, NodeKind, Tree};

#[derive(Debug, Clone, Copy)]
enum PendingMove {
    /// Detach `child` from `parent` and append it to `target`.
    Reparent {
        parent: NodeId,
        child: NodeId,
        target: NodeId,
    },
    /// Detach `child` from `parent` and discard it (EndIf markers).
    Discard { parent: NodeId, child: NodeId },
}

/// A conditional block collecting siblings, and the parent it was found
/// under.
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    parent: NodeId,
    block: NodeId,
}

#[derive(Debug, Default)]
pub struct BlockStructure {
    open: Vec<OpenBlock>,
    moves: Vec<PendingMove>,
}

impl BlockStructure {
    pub fn new() -> Self {
        BlockStructure::default()
    }

    fn record(&mut self, parent: NodeId, child: NodeId) {
        if let Some(&OpenBlock {
            parent: block_parent,
            block,
        }) = self.open.last()
        {
            // Move only siblings of the open block, not anything nested
            // deeper, and never the block into itself.
            if block != parent && block_parent == parent {
                self.moves.push(PendingMove::Reparent {
                    parent,
                    child,
                    target: block,
                });
            }
        }
    }

    fn visit(
        &mut self,
        tree: &Tree,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), TransformationError> {
        match tree.kind(child) {
            NodeKind::If { .. } => {
                // The if itself belongs to whatever block was open around it.
                self.record(parent, child);
                self.open.push(OpenBlock {
                    parent,
                    block: child,
                });
            }
            NodeKind::Else { .. } => {
                // The previous branch of this chain is closed now; siblings
                // that follow accumulate into this branch instead.
                self.open.pop().ok_or_else(|| {
                    TransformationError::StructuralMismatch(format!(
                        "else block outside any open chain: {}",
                        tree.render(child)
                    ))
                })?;
                self.record(parent, child);
                self.open.push(OpenBlock {
                    parent,
                    block: child,
                });
            }
            NodeKind::EndIf => {
                self.open.pop().ok_or_else(|| {
                    TransformationError::StructuralMismatch(format!(
                        "endif marker outside any open chain: {}",
                        tree.render(parent)
                    ))
                })?;
                self.moves.push(PendingMove::Discard { parent, child });
            }
            _ => self.record(parent, child),
        }

        for i in 0..tree.child_count(child) {
            let grandchild = tree.child(child, i)?;
            self.visit(tree, child, grandchild)?;
        }
        Ok(())
    }
}

impl TransformationRule for BlockStructure {
    fn name(&self) -> &'static str {
        "block-restructuring"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        let root = tree.root();
        for i in 0..tree.child_count(root) {
            let child = tree.child(root, i)?;
            self.visit(tree, root, child)?;
        }

        // Apply phase: reparent in the order discovered, which preserves the
        // original relative order inside each target block.
        for &pending in &self.moves {
            match pending {
                PendingMove::Reparent {
                    parent,
                    child,
                    target,
                } => {
                    tree.remove(parent, child);
                    tree.append(target, child);
                }
                PendingMove::Discard { parent, child } => {
                    tree.remove(parent, child);
                }
            }
        }
        Ok(())
    }
}
