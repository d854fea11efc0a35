//! Main module for pptree library functionality

pub mod driver;
pub mod pipeline;
pub mod tree;
