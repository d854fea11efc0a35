//! Restructuring pipeline for translation-unit trees
//!
//! This module provides:
//! - The rule abstraction (`TransformationRule`, `TransformationError`)
//! - The concrete passes (`rules`)
//! - The fixed-order orchestrator (`Converter`)

pub mod orchestration;
pub mod rule;
pub mod rules;

pub use orchestration::{ConversionError, Converter, PipelineSpec};
pub use rule::{Strictness, TransformationError, TransformationRule};
