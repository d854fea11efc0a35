//! # pptree
//!
//! Converts a flat, tag-annotated parse of C/C++ source (as emitted by an
//! external structural-markup parser) into a nested tree in which
//! preprocessor conditionals are first-class block nodes carrying a computed
//! effective condition. The finished tree is consumed by a downstream
//! variability-aware analysis.
//!
//! The external parser feeds a tag stream into [`pptree::driver::TreeBuilder`];
//! [`pptree::pipeline::Converter`] then restructures the resulting flat tree
//! in place:
//!
//! - directive composites become typed conditional blocks
//! - flat siblings are re-nested into the branch that encloses them
//! - raw conditions are normalized (unguarded macro references become `0`)
//! - statically dead `#if 0` branches are emptied
//! - each branch's chain-relative effective condition is computed
//! - grammar artifacts such as nested `else if` wrappers are unwrapped

pub mod pptree;
