//! Property-based tests for directive restructuring
//!
//! Random balanced directive scripts (arbitrarily nested if/elif/else chains
//! interleaved with code tokens) are laid out flat, the way the driver would
//! build them, and converted with the structural pipeline. The finished tree
//! must mirror the script: every chain hangs its body under the right branch,
//! no end marker survives, and effective conditions follow the chain.

use proptest::prelude::*;

use pptree::pptree::pipeline::{Converter, PipelineSpec};
use pptree::pptree::tree::{ElseKind, NodeId, NodeKind, Tree};

#[derive(Debug, Clone)]
enum Item {
    Code(String),
    Chain {
        condition: String,
        body: Vec<Item>,
        elifs: Vec<(String, Vec<Item>)>,
        else_body: Option<Vec<Item>>,
    },
}

fn item_strategy() -> impl Strategy<Value = Item> {
    let code = "[a-z]{1,6}".prop_map(Item::Code);
    code.prop_recursive(3, 24, 5, |inner| {
        (
            "[A-Z]{1,3}",
            prop::collection::vec(inner.clone(), 0..3),
            prop::collection::vec(("[A-Z]{1,3}", prop::collection::vec(inner.clone(), 0..2)), 0..2),
            prop::option::of(prop::collection::vec(inner, 0..2)),
        )
            .prop_map(|(condition, body, elifs, else_body)| Item::Chain {
                condition,
                body,
                elifs,
                else_body,
            })
    })
}

fn directive(tree: &mut Tree, parent: NodeId, tag: &str, tokens: &[&str]) {
    let unit = tree.alloc(NodeKind::Composite {
        tag: tag.to_string(),
    });
    for token in tokens {
        let leaf = tree.alloc(NodeKind::Text(token.to_string()));
        tree.append(unit, leaf);
    }
    tree.append(parent, unit);
}

/// Lays the script out flat, the way the upstream parse is shaped.
fn emit(tree: &mut Tree, parent: NodeId, items: &[Item]) {
    for item in items {
        match item {
            Item::Code(text) => {
                let leaf = tree.alloc(NodeKind::Text(text.clone()));
                tree.append(parent, leaf);
            }
            Item::Chain {
                condition,
                body,
                elifs,
                else_body,
            } => {
                directive(tree, parent, "cpp:if", &["#", "if", condition]);
                emit(tree, parent, body);
                for (elif_condition, elif_body) in elifs {
                    directive(tree, parent, "cpp:elif", &["#", "elif", elif_condition]);
                    emit(tree, parent, elif_body);
                }
                if let Some(else_body) = else_body {
                    directive(tree, parent, "cpp:else", &["#", "else"]);
                    emit(tree, parent, else_body);
                }
                directive(tree, parent, "cpp:endif", &["#", "endif"]);
            }
        }
    }
}

fn count_code(items: &[Item]) -> usize {
    items
        .iter()
        .map(|item| match item {
            Item::Code(_) => 1,
            Item::Chain {
                body,
                elifs,
                else_body,
                ..
            } => {
                count_code(body)
                    + elifs.iter().map(|(_, b)| count_code(b)).sum::<usize>()
                    + else_body.as_deref().map_or(0, count_code)
            }
        })
        .sum()
}

/// Checks that `children` starting at `*index` spell out `items`; a chain
/// occupies one slot for its if plus one per elif/else sibling.
fn check_items(tree: &Tree, children: &[NodeId], index: &mut usize, items: &[Item]) {
    for item in items {
        match item {
            Item::Code(text) => {
                let node = children[*index];
                *index += 1;
                assert_eq!(tree.text(node), Some(text.as_str()));
            }
            Item::Chain {
                condition,
                body,
                elifs,
                else_body,
            } => {
                let start = children[*index];
                *index += 1;

                match tree.kind(start) {
                    NodeKind::If {
                        condition: raw,
                        effective,
                        chain,
                        ..
                    } => {
                        assert_eq!(raw, condition);
                        assert_eq!(effective.as_deref(), Some(condition.as_str()));
                        let expected_chain_len =
                            elifs.len() + usize::from(else_body.is_some());
                        assert_eq!(chain.len(), expected_chain_len);
                    }
                    other => panic!("expected if block, got {:?}", other),
                }
                check_branch(tree, start, body);

                let mut negations = format!("!{}", condition);
                for (elif_condition, elif_body) in elifs {
                    let branch = children[*index];
                    *index += 1;
                    negations.push_str("&&!");
                    negations.push_str(elif_condition);
                    match tree.kind(branch) {
                        NodeKind::Else {
                            kind,
                            condition: raw,
                            effective,
                            start: chained_to,
                        } => {
                            assert_eq!(*kind, ElseKind::ElseIf);
                            assert_eq!(raw.as_deref(), Some(elif_condition.as_str()));
                            assert_eq!(effective.as_deref(), Some(negations.as_str()));
                            assert_eq!(*chained_to, start);
                        }
                        other => panic!("expected elif block, got {:?}", other),
                    }
                    check_branch(tree, branch, elif_body);
                }

                if let Some(else_body) = else_body {
                    let branch = children[*index];
                    *index += 1;
                    match tree.kind(branch) {
                        NodeKind::Else {
                            kind,
                            condition: raw,
                            effective,
                            start: chained_to,
                        } => {
                            assert_eq!(*kind, ElseKind::Else);
                            assert_eq!(*raw, None);
                            assert_eq!(effective.as_deref(), Some(negations.as_str()));
                            assert_eq!(*chained_to, start);
                        }
                        other => panic!("expected else block, got {:?}", other),
                    }
                    check_branch(tree, branch, else_body);
                }
            }
        }
    }
}

fn check_branch(tree: &Tree, branch: NodeId, items: &[Item]) {
    let children = tree.children(branch);
    let mut index = 0;
    check_items(tree, children, &mut index, items);
    assert_eq!(index, children.len(), "branch has extra children");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn restructuring_mirrors_the_script(items in prop::collection::vec(item_strategy(), 0..5)) {
        let mut tree = Tree::new("unit");
        let root = tree.root();
        emit(&mut tree, root, &items);

        Converter::with_spec(PipelineSpec::Structural)
            .convert(&mut tree)
            .unwrap();

        check_branch(&tree, tree.root(), &items);

        // No end marker anywhere, and every code token survived.
        let mut code_leaves = 0;
        for node in tree.descendants(tree.root()) {
            prop_assert_ne!(tree.kind(node), &NodeKind::EndIf);
            if matches!(tree.kind(node), NodeKind::Text(_)) {
                code_leaves += 1;
            }
        }
        prop_assert_eq!(code_leaves, count_code(&items));
    }
}
