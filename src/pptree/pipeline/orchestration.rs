//! Pipeline orchestration
//!
//! [`Converter`] runs the transformation rules over one freshly built tree,
//! in a fixed order; every rule's invariants depend on the previous rules
//! having run. `convert` must be called exactly once per tree: the passes are
//! not idempotent and a second application is undefined.

use std::fmt;

use crate::pptree::pipeline::rule::{Strictness, TransformationRule};
use crate::pptree::pipeline::rules::{
    BlockStructure, ConditionComputation, ConditionNormalization, DeadBranchElimination,
    DirectiveTranslation, ElseIfUnwrap,
};
use crate::pptree::tree::Tree;

/// Which rule sequence to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineSpec {
    /// The production sequence: directive translation, block restructuring,
    /// condition normalization, dead-branch elimination, condition
    /// computation, else-if unwrapping.
    #[default]
    Full,
    /// Development sequence that skips normalization, dead-branch
    /// elimination and shape fixups; raw conditions survive verbatim.
    Structural,
}

/// Errors during a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    TransformationFailed { rule: &'static str, message: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::TransformationFailed { rule, message } => {
                write!(f, "rule '{}' failed: {}", rule, message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Runs the restructuring pipeline over translation-unit trees.
///
/// Rule instances are constructed fresh for every `convert` call, so one
/// converter may be used for many trees (each tree built and converted
/// independently; conversions of different files may run in parallel as long
/// as each gets its own tree).
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    spec: PipelineSpec,
    strictness: Strictness,
}

impl Converter {
    /// The full pipeline in strict mode.
    pub fn new() -> Self {
        Converter::default()
    }

    pub fn with_spec(spec: PipelineSpec) -> Self {
        Converter {
            spec,
            strictness: Strictness::default(),
        }
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Mutates the tree in place. Must be invoked exactly once per freshly
    /// built tree.
    pub fn convert(&self, tree: &mut Tree) -> Result<(), ConversionError> {
        let mut rules: Vec<Box<dyn TransformationRule>> = match self.spec {
            PipelineSpec::Full => vec![
                Box::new(DirectiveTranslation::new()),
                Box::new(BlockStructure::new()),
                Box::new(ConditionNormalization::new()),
                Box::new(DeadBranchElimination::new()),
                Box::new(ConditionComputation::new()),
                Box::new(ElseIfUnwrap::with_strictness(self.strictness)),
            ],
            PipelineSpec::Structural => vec![
                Box::new(DirectiveTranslation::new()),
                Box::new(BlockStructure::new()),
                Box::new(ConditionComputation::new()),
            ],
        };

        for rule in rules.iter_mut() {
            rule.transform(tree)
                .map_err(|e| ConversionError::TransformationFailed {
                    rule: rule.name(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}
