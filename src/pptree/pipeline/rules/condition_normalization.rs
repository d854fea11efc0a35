//! Condition normalization rule
//!
//! Rewrites every raw condition so that the only macro references left are
//! the ones guarded by a literal `defined ( ... )`. A bare identifier token
//! is an unguarded macro reference whose value this pipeline cannot know, so
//! it is conservatively forced to `0` (undefined/false). All spaces are
//! removed in the process: `defined ( A ) & & B` becomes `defined(A)&&0`.
//!
//! Tokenization is a plain split on single spaces, matching how directive
//! translation assembled the text. Operator and parenthesis tokens pass
//! through unchanged, as does the word `defined` itself when a `(` follows.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pptree::pipeline::rule::{TransformationError, TransformationRule};
use crate::pptree::tree::{NodeId, NodeKind, Tree};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

#[derive(Debug, Default)]
pub struct ConditionNormalization;

impl ConditionNormalization {
    pub fn new() -> Self {
        ConditionNormalization
    }

    fn visit(&self, tree: &mut Tree, node: NodeId) -> Result<(), TransformationError> {
        match tree.kind_mut(node) {
            NodeKind::If { condition, .. } => {
                *condition = normalize(condition);
            }
            NodeKind::Else {
                condition: Some(condition),
                ..
            } => {
                *condition = normalize(condition);
            }
            _ => {}
        }

        for i in 0..tree.child_count(node) {
            let child = tree.child(node, i)?;
            self.visit(tree, child)?;
        }
        Ok(())
    }
}

impl TransformationRule for ConditionNormalization {
    fn name(&self) -> &'static str {
        "condition-normalization"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        self.visit(tree, tree.root())
    }
}

/// Space-tokenized rewrite of one condition string.
pub fn normalize(condition: &str) -> String {
    let parts: Vec<&str> = condition.split(' ').collect();
    let mut result = String::new();

    for (i, part) in parts.iter().enumerate() {
        // "defined" followed by "(" is the guard keyword, not a variable.
        let is_defined_keyword = *part == "defined" && parts.get(i + 1) == Some(&"(");

        if !is_defined_keyword && IDENTIFIER.is_match(part) {
            let guarded = i >= 2
                && parts[i - 2] == "defined"
                && parts[i - 1] == "("
                && parts.get(i + 1) == Some(&")");
            if guarded {
                result.push_str(part);
            } else {
                result.push('0');
            }
        } else {
            result.push_str(part);
        }
    }

    result
}
