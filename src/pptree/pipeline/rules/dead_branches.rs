//! Dead-branch elimination rule
//!
//! A conditional whose raw condition is the literal `0` can never be
//! compiled; its enclosed code is dropped wholesale so later passes and the
//! downstream consumer never see it. Runs after normalization, which is what
//! turns unguarded macro references into `0` in the first place.
//!
//! The removed subtree is not descended into; sibling branches of the same
//! chain are processed normally.

use crate::pptree::pipeline::rule::{TransformationError, TransformationRule};
use crate::pptree::tree::{NodeId, Tree};

#[derive(Debug, Default)]
pub struct DeadBranchElimination;

impl DeadBranchElimination {
    pub fn new() -> Self {
        DeadBranchElimination
    }

    fn visit(&self, tree: &mut Tree, node: NodeId) -> Result<(), TransformationError> {
        if tree.condition(node) == Some("0") {
            tree.clear_children(node);
            return Ok(());
        }

        for i in 0..tree.child_count(node) {
            let child = tree.child(node, i)?;
            self.visit(tree, child)?;
        }
        Ok(())
    }
}

impl TransformationRule for DeadBranchElimination {
    fn name(&self) -> &'static str {
        "dead-branch-elimination"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        self.visit(tree, tree.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptree::tree::{ElseKind, IfKind, NodeKind};

    #[test]
    fn drops_children_of_if_zero_but_not_of_siblings() {
        let mut tree = Tree::new("unit");
        let root = tree.root();
        let dead = tree.alloc(NodeKind::If {
            kind: IfKind::If,
            condition: "0".to_string(),
            effective: None,
            chain: Vec::new(),
        });
        let alive = tree.alloc(NodeKind::Else {
            kind: ElseKind::Else,
            condition: None,
            effective: None,
            start: dead,
        });
        if let NodeKind::If { chain, .. } = tree.kind_mut(dead) {
            chain.push(alive);
        }
        tree.append(root, dead);
        tree.append(root, alive);

        let x = tree.alloc(NodeKind::Text("x".to_string()));
        let y = tree.alloc(NodeKind::Text("y".to_string()));
        let z = tree.alloc(NodeKind::Text("z".to_string()));
        tree.append(dead, x);
        tree.append(dead, y);
        tree.append(alive, z);

        DeadBranchElimination::new().transform(&mut tree).unwrap();

        assert_eq!(tree.child_count(dead), 0);
        assert_eq!(tree.children(alive), &[z]);
    }

    #[test]
    fn non_zero_conditions_are_left_alone() {
        let mut tree = Tree::new("unit");
        let root = tree.root();
        let block = tree.alloc(NodeKind::If {
            kind: IfKind::If,
            condition: "defined(A)".to_string(),
            effective: None,
            chain: Vec::new(),
        });
        tree.append(root, block);
        let x = tree.alloc(NodeKind::Text("x".to_string()));
        tree.append(block, x);

        DeadBranchElimination::new().transform(&mut tree).unwrap();
        assert_eq!(tree.children(block), &[x]);
    }
}
