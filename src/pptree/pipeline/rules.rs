//! The transformation rules, one module per pass.

pub mod block_structure;
pub mod condition_computation;
pub mod condition_normalization;
pub mod dead_branches;
pub mod directive_translation;
pub mod else_if_unwrap;

pub use block_structure::BlockStructure;
pub use condition_computation::ConditionComputation;
pub use condition_normalization::ConditionNormalization;
pub use dead_branches::DeadBranchElimination;
pub use directive_translation::DirectiveTranslation;
pub use else_if_unwrap::ElseIfUnwrap;
