//! Directive translation rule
//!
//! Converts flat `cpp:*` composites (as built by the driver) into typed
//! conditional nodes: `cpp:if`/`cpp:ifdef`/`cpp:ifndef` become [`NodeKind::If`],
//! `cpp:elif`/`cpp:else` become [`NodeKind::Else`] registered on their
//! starting if's chain, and `cpp:endif` becomes the transient
//! [`NodeKind::EndIf`] marker. A stack of currently open ifs matches chains
//! at arbitrary nesting depth.
//!
//! A directive composite carries its tokens as text children: `#`, the
//! keyword, then the condition tokens. Condition text is assembled by joining
//! the condition tokens with single spaces (non-text children, such as
//! trailing comments, are skipped); the later normalization pass removes the
//! spaces again.
//!
//! `#ifdef M` becomes `defined(M)` and `#ifndef M` the pre-negated
//! `!defined(M)`, both with kind [`IfKind::Ifdef`]; nothing downstream
//! distinguishes the two spellings beyond the negation.

use crate::pptree::pipeline::rule::{TransformationError, TransformationRule};
use crate::pptree::tree::{ElseKind, IfKind, NodeId, NodeKind, Tree};

#[derive(Debug, Default)]
pub struct DirectiveTranslation {
    open: Vec<NodeId>,
}

impl DirectiveTranslation {
    pub fn new() -> Self {
        DirectiveTranslation::default()
    }

    fn visit(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), TransformationError> {
        if let Some(tag) = tree.tag(child).map(String::from) {
            if tag.starts_with("cpp:if") {
                self.translate_if(tree, parent, child)?;
            } else if tag.starts_with("cpp:el") {
                self.translate_else(tree, parent, child)?;
            } else if tag == "cpp:endif" {
                self.translate_endif(tree, parent, child)?;
            }
        }

        // Descend regardless of conversion so nested directive families are
        // translated too. For a just-translated directive this walks its
        // detached token list, which contains no directives.
        for i in 0..tree.child_count(child) {
            let grandchild = tree.child(child, i)?;
            self.visit(tree, child, grandchild)?;
        }
        Ok(())
    }

    fn translate_if(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        unit: NodeId,
    ) -> Result<(), TransformationError> {
        let keyword = directive_keyword(tree, unit)?;
        let condition = condition_text(tree, unit);

        let kind = match keyword.as_str() {
            "if" => NodeKind::If {
                kind: IfKind::If,
                condition,
                effective: None,
                chain: Vec::new(),
            },
            "ifdef" => NodeKind::If {
                kind: IfKind::Ifdef,
                condition: format!("defined({})", condition),
                effective: None,
                chain: Vec::new(),
            },
            "ifndef" => NodeKind::If {
                kind: IfKind::Ifdef,
                condition: format!("!defined({})", condition),
                effective: None,
                chain: Vec::new(),
            },
            other => {
                return Err(TransformationError::StructuralMismatch(format!(
                    "unknown if-family directive keyword '{}' in: {}",
                    other,
                    tree.render(unit)
                )))
            }
        };

        let block = tree.alloc(kind);
        tree.replace(parent, unit, block);
        self.open.push(block);
        Ok(())
    }

    fn translate_else(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        unit: NodeId,
    ) -> Result<(), TransformationError> {
        let keyword = directive_keyword(tree, unit)?;
        let start = *self.open.last().ok_or_else(|| {
            TransformationError::StructuralMismatch(format!(
                "#{} without an open #if: {}",
                keyword,
                tree.render(unit)
            ))
        })?;

        let kind = match keyword.as_str() {
            "else" => NodeKind::Else {
                kind: ElseKind::Else,
                condition: None,
                effective: None,
                start,
            },
            "elif" => NodeKind::Else {
                kind: ElseKind::ElseIf,
                condition: Some(condition_text(tree, unit)),
                effective: None,
                start,
            },
            other => {
                return Err(TransformationError::StructuralMismatch(format!(
                    "unknown else-family directive keyword '{}' in: {}",
                    other,
                    tree.render(unit)
                )))
            }
        };

        let block = tree.alloc(kind);
        if let NodeKind::If { chain, .. } = tree.kind_mut(start) {
            chain.push(block);
        }
        tree.replace(parent, unit, block);
        Ok(())
    }

    fn translate_endif(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        unit: NodeId,
    ) -> Result<(), TransformationError> {
        if self.open.pop().is_none() {
            return Err(TransformationError::StructuralMismatch(format!(
                "#endif without an open #if: {}",
                tree.render(parent)
            )));
        }
        let marker = tree.alloc(NodeKind::EndIf);
        tree.replace(parent, unit, marker);
        Ok(())
    }
}

impl TransformationRule for DirectiveTranslation {
    fn name(&self) -> &'static str {
        "directive-translation"
    }

    fn transform(&mut self, tree: &mut Tree) -> Result<(), TransformationError> {
        let root = tree.root();
        for i in 0..tree.child_count(root) {
            let child = tree.child(root, i)?;
            self.visit(tree, root, child)?;
        }
        Ok(())
    }
}

/// The directive keyword token (`if`, `ifdef`, `elif`, ...) following the
/// leading `#` token.
fn directive_keyword(tree: &Tree, unit: NodeId) -> Result<String, TransformationError> {
    if tree.child_count(unit) < 2 {
        return Err(TransformationError::StructuralMismatch(format!(
            "directive with malformed token list: {}",
            tree.render(unit)
        )));
    }
    let keyword = tree.child(unit, 1)?;
    tree.text(keyword).map(String::from).ok_or_else(|| {
        TransformationError::StructuralMismatch(format!(
            "directive keyword is not a token: {}",
            tree.render(unit)
        ))
    })
}

/// Raw condition text: all text tokens after the keyword, space-joined.
fn condition_text(tree: &Tree, unit: NodeId) -> String {
    let mut parts = Vec::new();
    for &child in tree.children(unit).iter().skip(2) {
        if let Some(token) = tree.text(child) {
            parts.push(token);
        }
    }
    parts.join(" ")
}
