//! ## Transformer Lifecycle and Pipelines
//!
//! This module provides the base lifecycle shared by every transformer in the
//! Rare Levels library.
//!
//! - The [`Transformer`] trait is the fixed contract a transformer implements:
//!   an asynchronous `fit` that may collect data to learn parameters, a
//!   synchronous `transform` that rewrites the DataFrame's logical plan
//!   without executing it, and an `is_stateful` flag.
//! - The [`Pipeline`] struct chains transformers, feeding each step's output
//!   plan into the next.
//! - The [`crate::impl_transformer`] and [`crate::make_pipeline`] macros cut
//!   down the boilerplate of wiring a concrete type into a pipeline.

use crate::exceptions::{RareLevelsError, RareLevelsResult};
use async_trait::async_trait;
use datafusion::prelude::*;
use std::time::Instant;
use tracing::info;

/// Trait for components used in the data transformation pipeline.
///
/// Stateful transformers learn parameters in `fit` and must be fitted before
/// `transform` is called; stateless ones may treat `fit` as validation only.
#[async_trait]
pub trait Transformer {
    /// Fit the transformer on the given DataFrame, learning any parameters it
    /// needs for later transformation.
    async fn fit(&mut self, df: &DataFrame) -> RareLevelsResult<()>;

    /// Transform the input DataFrame, returning a new DataFrame with the
    /// transformation applied to its logical plan.
    fn transform(&self, df: DataFrame) -> RareLevelsResult<DataFrame>;

    /// Returns true if the transformer requires a call to `fit` before
    /// `transform` can be called.
    fn is_stateful(&self) -> bool;
}

/// Macro to implement the [`Transformer`] trait for a transformer type.
///
/// The type must already have inherent methods:
/// - `async fn fit(&mut self, &DataFrame) -> RareLevelsResult<()>`
/// - `fn transform(&self, DataFrame) -> RareLevelsResult<DataFrame>`
/// - `fn inherent_is_stateful(&self) -> bool`
#[macro_export]
macro_rules! impl_transformer {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl $crate::pipeline::Transformer for $ty {
            async fn fit(
                &mut self,
                df: &datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::RareLevelsResult<()> {
                <$ty>::fit(self, df).await
            }
            fn transform(
                &self,
                df: datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::RareLevelsResult<datafusion::prelude::DataFrame> {
                <$ty>::transform(self, df)
            }
            fn is_stateful(&self) -> bool {
                <$ty>::inherent_is_stateful(self)
            }
        }
    };
}

/// A pipeline that chains a sequence of transformers.
///
/// Each transformer's output plan is passed as input to the next transformer,
/// so the chain stays lazy until a terminal action (like `collect`) runs.
pub struct Pipeline {
    steps: Vec<(String, Box<dyn Transformer + Send + Sync>)>,
    verbose: bool,
}

impl Pipeline {
    /// Creates a new pipeline from (name, transformer) pairs. When `verbose`
    /// is true, per-step timing is logged at `info` level.
    pub fn new(steps: Vec<(String, Box<dyn Transformer + Send + Sync>)>, verbose: bool) -> Self {
        Self { steps, verbose }
    }

    /// Fits each transformer sequentially, transforming the plan between steps.
    pub async fn fit(&mut self, df: &DataFrame) -> RareLevelsResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(RareLevelsError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let mut current_df = df.clone();
        for (name, step) in self.steps.iter_mut() {
            let start = Instant::now();
            step.fit(&current_df).await.map_err(|e| {
                RareLevelsError::InvalidParameter(format!(
                    "Error fitting transformer '{}': {:?}",
                    name, e
                ))
            })?;
            current_df = step.transform(current_df).map_err(|e| {
                RareLevelsError::InvalidParameter(format!(
                    "Error transforming in '{}': {:?}",
                    name, e
                ))
            })?;
            if self.verbose {
                info!("Step '{}' fitted in {:?}", name, start.elapsed());
            }
        }
        Ok(current_df)
    }

    /// Applies the `transform` method of each transformer (without fitting).
    pub fn transform(&self, df: DataFrame) -> RareLevelsResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(RareLevelsError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let mut current_df = df;
        for (name, step) in self.steps.iter() {
            if self.verbose {
                info!("Applying transformer: {}", name);
            }
            current_df = step.transform(current_df).map_err(|e| {
                RareLevelsError::InvalidParameter(format!(
                    "Error in transformer '{}': {:?}",
                    name, e
                ))
            })?;
        }
        Ok(current_df)
    }

    /// Convenience method to call `fit` and then return the final transformed DataFrame.
    pub async fn fit_transform(&mut self, df: &DataFrame) -> RareLevelsResult<DataFrame> {
        self.fit(df).await
    }
}

/// Macro to simplify pipeline creation by automatically boxing transformers.
///
/// # Example
///
/// ```rust,no_run
/// use rare_levels::make_pipeline;
/// use rare_levels::transformers::grouping::RareLevelGrouper;
/// use rare_levels::transformers::levels::RareLevel;
///
/// let grouper = RareLevelGrouper::new(
///     vec!["b".to_string()],
///     0.05,
///     None,
///     RareLevel::text("rare"),
///     false,
///     true,
/// ).unwrap();
/// let pipeline = make_pipeline!(false, ("group_rare", grouper));
/// ```
#[macro_export]
macro_rules! make_pipeline {
    ($verbose:expr, $(($name:expr, $transformer:expr)),+ $(,)?) => {
        {
            let steps: Vec<(String, Box<dyn $crate::pipeline::Transformer + Send + Sync>)> = vec![
                $(
                    ($name.to_string(), Box::new($transformer)),
                )+
            ];
            $crate::pipeline::Pipeline::new(steps, $verbose)
        }
    };
}
