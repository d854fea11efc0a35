//! Condition computation rule
//!
//! Computes each branch's effective condition: the condition, relative to its
//! own chain, under which the branch's code is compiled. Enclosing chains are
//! not folded in; that is the downstream consumer's job.
//!
//! For the starting if the effective condition is its raw condition. For a
//! continuation branch it is the negation of the starting if's condition,
//! followed by the negation of every earlier branch in the chain, joined with
//! `&&`. The branch's own condition, when present, is negated and appended
//! too: `#if A / #elif B` yields `!A&&!B` for the elif, not `!A&&B`. Keep it
//! that way unless every downstream consumer is updated in lockstep.
//!
//! Terms are joined without spaces, consistent with the space-free output of
//! condition normalization.

use crate::pptree::pipeline::rule::{TransformationError, TransformationRule};
use crate::pptree::tree::{ElseKind, NodeId, NodeKind, Tree};

#[derive(Debug, Default)]
pub struct ConditionComputation;

impl ConditionComputation {
    pub fn new() -> Self {
        ConditionComputation
    }

    fn visit(&self, tree: &mut Tree, node: NodeId) -> Result<(), TransformationError> {
        match tree.kind(node) {
            NodeKind::If { condition, .. } => {
                let computed = condition.clone();
                if let NodeKind::If { effective, .. } = tree.kind_mut(node) {
                    *effective = Some(computed);
                }
            }
            NodeKind::Else { .. } => {
                let computed = self.compute_else(tree, node)?;
                if let NodeKind::Else { effective, .. } = tree.kind_mut(node) {
                    *effective = Some(computed);
                }
            }
            _ => {}
        }

        for i in 0..tree.child_count(node) {
            let child = tree.child(node, i)?;
            self.visit(tree, child)?;
        }
        Ok(())
    }

    fn compute_else(&self, tree: &Tree, node: NodeId) -> Result<String, TransformationError> {
        let (kind, own_condition, start) = match tree.kind(node) {
            NodeKind::Else {
                kind,
                condition,
                start,
                ..
            } => (*kind, condition.clone(), *start),
            _ => unreachable!("compute_else is only called on else blocks"),
        };

        let (start_condition, chain) = match tree.kind(start) {
            NodeKind::If {
                condition, chain, ..
            } => (condition.clone(), chain.clone()),
            _ => {
                return Err(TransformationError::StructuralMismatch(format!(
                    "else block chained to a non-if node: {}",
                    tree.render(node)
                )))
            }
        };

        let mut effective = format!("!{}", start_condition);
        for &sibling in &chain {
            if sibling == node {
                break;
            }
            let sibling_condition = tree.condition(sibling).ok_or_else(|| {
                TransformationError::StructuralMismatch(format!(
                    "conditionless branch before an #elif in the same chain: {}",
                    tree.render(start)
                ))
            })?;
            effective.push_str("&&!");
            effective.push_str(sibling_condition);
        }

        if kind == ElseKind::ElseIf {
            let own = own_condition.ok_or_else(|| {
                TransformationError::StructuralMismatch(format!(
                    "#elif without a condition: {}",
                    tree.render(node)
                ))
            })?;
            effective.push_str("&&!");
            effective.push_str(&own);
        }

        Ok(effective)
    }
}

impl TransformationRule for ConditionComputation {
    fn name(&self) -> &'static str {
        "condition-computation"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        self.visit(tree, tree.root())
    }
}
