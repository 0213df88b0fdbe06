//! ## Custom Errors for Rare Levels
//!
//! This module defines the error types used across the Rare Levels library.
//! It uses the `thiserror` crate to derive the `Error` trait, and the
//! `RareLevelsResult` type alias keeps signatures short.
//!
//! ### Example
//!
//! ```rust
//! use rare_levels::exceptions::{RareLevelsError, RareLevelsResult};
//!
//! fn check_threshold(t: f64) -> RareLevelsResult<()> {
//!     if t <= 0.0 || t >= 1.0 {
//!         return Err(RareLevelsError::InvalidParameter(
//!             "threshold must be > 0 and < 1".into(),
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors specific to the Rare Levels library.
#[derive(Debug, Error)]
pub enum RareLevelsError {
    /// Wraps errors from DataFusion.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    /// Wraps errors from Arrow.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Indicates that an invalid parameter was provided (e.g., an out-of-range
    /// threshold or a placeholder of the wrong type).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Indicates that a required column does not exist in the DataFrame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Indicates the transform method was called before calling fit for a stateful transformer.
    #[error("Transform called before fit for stateful transformer")]
    FitNotCalled,
}

/// A convenient result type for Rare Levels operations.
pub type RareLevelsResult<T> = std::result::Result<T, RareLevelsError>;
