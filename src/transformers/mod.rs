//! # Transformer Implementations
//!
//! The submodules contain the transformer implementations and the value model
//! they share.

pub mod grouping;
pub mod levels;
