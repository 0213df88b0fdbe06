//! # Rare Levels
//!
//! Rare Levels is a small feature-engineering library for grouping infrequent
//! categorical values ("rare levels") into a single placeholder value, built on
//! top of Apache Arrow and Apache DataFusion.
//!
//! The central type is [`transformers::grouping::RareLevelGrouper`]: at fit time
//! it learns, per target column, which distinct levels hold at least a
//! configurable share of the total row count (or of a weight column's total),
//! and at transform time it rewrites every other level to the placeholder.
//! Transformers implement the [`pipeline::Transformer`] trait so they can be
//! chained in a [`pipeline::Pipeline`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use rare_levels::transformers::grouping::RareLevelGrouper;
//! use rare_levels::transformers::levels::RareLevel;
//! # async fn run(df: datafusion::prelude::DataFrame) -> rare_levels::exceptions::RareLevelsResult<()> {
//! let mut grouper = RareLevelGrouper::new(
//!     vec!["city".to_string()],
//!     0.05,
//!     None,
//!     RareLevel::text("rare"),
//!     false,
//!     true,
//! )?;
//! grouper.fit(&df).await?;
//! let transformed = grouper.transform(df)?;
//! # Ok(())
//! # }
//! ```

pub mod exceptions;
pub mod logging;
pub mod pipeline;
pub mod transformers;
