//! ## Rare-Level Grouping
//!
//! This module provides the [`RareLevelGrouper`] transformer, which collapses
//! infrequent categorical levels into a single placeholder value.
//!
//! At fit time the grouper computes, per target column, each distinct level's
//! share of the total row count (or, when a weight column is configured, of
//! the weight column's total) and retains the levels whose share reaches the
//! cut-off. Missing values form their own level and follow the same rule, so
//! a null group that clears the cut-off passes through transform untouched.
//!
//! At transform time every value outside the retained set is rewritten to the
//! placeholder. With `encode_unseen_levels` disabled, only values that were
//! seen during fit but fell below the cut-off are rewritten; values never seen
//! in training pass through unchanged. Dictionary-encoded (categorical)
//! columns keep their dictionary representation: the rewritten expression is
//! cast back to the column's original type, which extends the value domain
//! with the placeholder instead of silently widening the column to plain text.
//!
//! Errors are returned as `RareLevelsError` and results are wrapped in
//! `RareLevelsResult`.

use crate::exceptions::{RareLevelsError, RareLevelsResult};
use crate::transformers::levels::{Level, RareLevel, TypeFamily};
use arrow::array::{Array, Float64Array};
use arrow::datatypes::DataType;
use datafusion::logical_expr::{Case as DFCase, ExprSchemable};
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use std::collections::HashMap;
use tracing::debug;

/// Validates that every column in `target_cols` exists in the DataFrame.
/// Returns an error if any target column is missing.
fn validate_columns(df: &DataFrame, target_cols: &[String]) -> RareLevelsResult<()> {
    let schema = df.schema();
    for col_name in target_cols {
        if schema.field_with_name(None, col_name).is_err() {
            return Err(RareLevelsError::MissingColumn(format!(
                "Column '{}' not found in DataFrame",
                col_name
            )));
        }
    }
    Ok(())
}

/// Literal expression for a concrete (non-missing) level value.
fn level_lit(value: &ScalarValue) -> Expr {
    lit(value.clone())
}

/// Groups rare levels of categorical columns into a single placeholder value.
pub struct RareLevelGrouper {
    /// Columns whose levels are grouped.
    pub columns: Vec<String>,
    /// Minimum share of the total count (or weight) a level needs to be retained.
    pub cut_off_percent: f64,
    /// Optional weight column; when set, shares are weight sums instead of row counts.
    pub weight: Option<String>,
    /// Placeholder written over rare and unseen levels.
    pub rare_level_name: RareLevel,
    /// When true, the rare level lists are kept on the instance after fit.
    pub record_rare_levels: bool,
    /// When false, levels never seen during fit pass through transform unchanged.
    pub encode_unseen_levels: bool,
    /// Retained levels per column, in first-encountered order. `None` until fit succeeds.
    pub mapping: Option<HashMap<String, Vec<Level>>>,
    /// Below-cutoff levels per column; populated only when `record_rare_levels` is true.
    pub rare_levels: HashMap<String, Vec<Level>>,
    /// All levels observed during fit; populated only when `encode_unseen_levels` is false.
    pub training_levels: HashMap<String, Vec<Level>>,
}

impl RareLevelGrouper {
    /// Create a new grouper for the given columns.
    ///
    /// `cut_off_percent` must lie in the open interval (0, 1) and `weight`,
    /// when given, must be a single non-empty column name. Violations are
    /// reported immediately as `InvalidParameter`.
    pub fn new(
        columns: Vec<String>,
        cut_off_percent: f64,
        weight: Option<String>,
        rare_level_name: RareLevel,
        record_rare_levels: bool,
        encode_unseen_levels: bool,
    ) -> RareLevelsResult<Self> {
        if columns.is_empty() {
            return Err(RareLevelsError::InvalidParameter(
                "RareLevelGrouper: columns must not be empty".to_string(),
            ));
        }
        if !(cut_off_percent > 0.0 && cut_off_percent < 1.0) {
            return Err(RareLevelsError::InvalidParameter(
                "RareLevelGrouper: cut_off_percent must be > 0 and < 1".to_string(),
            ));
        }
        if let Some(w) = &weight {
            if w.is_empty() {
                return Err(RareLevelsError::InvalidParameter(
                    "RareLevelGrouper: weight should be a single column name".to_string(),
                ));
            }
        }
        Ok(Self {
            columns,
            cut_off_percent,
            weight,
            rare_level_name,
            record_rare_levels,
            encode_unseen_levels,
            mapping: None,
            rare_levels: HashMap::new(),
            training_levels: HashMap::new(),
        })
    }

    /// Checks that the placeholder's type family matches the family of every
    /// target column. Column types are only known once data is present, so
    /// this runs during fit rather than construction.
    fn check_placeholder_type(&self, df: &DataFrame) -> RareLevelsResult<()> {
        let schema = df.schema();
        for col_name in &self.columns {
            let field = schema
                .field_with_name(None, col_name)
                .map_err(RareLevelsError::from)?;
            let family = TypeFamily::of_data_type(field.data_type()).ok_or_else(|| {
                RareLevelsError::InvalidParameter(format!(
                    "RareLevelGrouper: column '{}' has unsupported data type {}",
                    col_name,
                    field.data_type()
                ))
            })?;
            if family != self.rare_level_name.family() {
                return Err(RareLevelsError::InvalidParameter(
                    "RareLevelGrouper: rare_level_name must be of the same type as the columns"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Checks that the configured weight column exists and is numeric.
    fn check_weight_column(&self, df: &DataFrame) -> RareLevelsResult<()> {
        let Some(weight) = &self.weight else {
            return Ok(());
        };
        let schema = df.schema();
        let field = schema.field_with_name(None, weight).map_err(|_| {
            RareLevelsError::MissingColumn(format!(
                "RareLevelGrouper: weight column '{}' not found in DataFrame",
                weight
            ))
        })?;
        match TypeFamily::of_data_type(field.data_type()) {
            Some(TypeFamily::Integer) | Some(TypeFamily::Float) => Ok(()),
            _ => Err(RareLevelsError::InvalidParameter(format!(
                "RareLevelGrouper: weight column '{}' must be numeric, got {}",
                weight,
                field.data_type()
            ))),
        }
    }

    /// Collects a column and folds it into `(level, weight sum)` pairs in
    /// first-encountered order, together with the grand total. Unweighted rows
    /// count 1 each; null weights contribute 0.
    async fn level_totals(
        &self,
        df: &DataFrame,
        col_name: &str,
    ) -> RareLevelsResult<(Vec<(Level, f64)>, f64)> {
        let projection = match &self.weight {
            Some(weight) => df.clone().select(vec![
                col(col_name),
                cast(col(weight), DataType::Float64).alias("__weight"),
            ])?,
            None => df.clone().select(vec![col(col_name)])?,
        };
        let batches = projection.collect().await.map_err(RareLevelsError::from)?;

        let mut totals: Vec<(Level, f64)> = Vec::new();
        let mut grand_total = 0.0_f64;
        for batch in &batches {
            let values = batch.column(0);
            let weights = match &self.weight {
                Some(_) => Some(
                    batch
                        .column(1)
                        .as_any()
                        .downcast_ref::<Float64Array>()
                        .ok_or_else(|| {
                            RareLevelsError::DataFusionError(
                                datafusion::error::DataFusionError::Plan(
                                    "Expected Float64 array for weight column".into(),
                                ),
                            )
                        })?,
                ),
                None => None,
            };
            for i in 0..batch.num_rows() {
                let level = if values.is_null(i) {
                    Level::Missing
                } else {
                    let value =
                        ScalarValue::try_from_array(values, i).map_err(RareLevelsError::from)?;
                    // Scalars read from a dictionary column carry the key
                    // type; levels hold the plain value so the learned state
                    // is independent of the column's encoding.
                    let value = match value {
                        ScalarValue::Dictionary(_, inner) => *inner,
                        other => other,
                    };
                    Level::Value(value)
                };
                let weight = match weights {
                    Some(arr) if arr.is_null(i) => 0.0,
                    Some(arr) => arr.value(i),
                    None => 1.0,
                };
                match totals.iter().position(|(l, _)| *l == level) {
                    Some(idx) => totals[idx].1 += weight,
                    None => totals.push((level, weight)),
                }
                grand_total += weight;
            }
        }
        Ok((totals, grand_total))
    }

    /// Learn the retained level set per target column.
    ///
    /// All learned state is computed into locals and assigned in one step at
    /// the end, so a failure part way through leaves the previous state
    /// intact and no column is ever fitted partially. Re-fitting replaces the
    /// learned state wholesale.
    pub async fn fit(&mut self, df: &DataFrame) -> RareLevelsResult<()> {
        validate_columns(df, &self.columns)?;
        self.check_weight_column(df)?;
        self.check_placeholder_type(df)?;

        let mut mapping: HashMap<String, Vec<Level>> = HashMap::new();
        let mut rare_levels: HashMap<String, Vec<Level>> = HashMap::new();
        let mut training_levels: HashMap<String, Vec<Level>> = HashMap::new();
        for col_name in &self.columns {
            let (totals, grand_total) = self.level_totals(df, col_name).await?;
            let mut retained = Vec::new();
            let mut rare = Vec::new();
            for (level, total) in &totals {
                if grand_total > 0.0 && total / grand_total >= self.cut_off_percent {
                    retained.push(level.clone());
                } else {
                    rare.push(level.clone());
                }
            }
            debug!(
                "column '{}': retained {} of {} levels",
                col_name,
                retained.len(),
                totals.len()
            );
            // Seen/unseen bookkeeping is only needed when unseen levels are
            // left alone at transform time.
            if !self.encode_unseen_levels {
                training_levels.insert(
                    col_name.clone(),
                    totals.iter().map(|(l, _)| l.clone()).collect(),
                );
            }
            if self.record_rare_levels {
                rare_levels.insert(col_name.clone(), rare);
            }
            mapping.insert(col_name.clone(), retained);
        }

        self.mapping = Some(mapping);
        self.rare_levels = rare_levels;
        self.training_levels = training_levels;
        Ok(())
    }

    /// CASE expression that keeps retained levels and writes the placeholder
    /// over everything else, including levels never seen during fit. A null
    /// comparison is not true, so unretained missing values also fall through
    /// to the placeholder unless `Level::Missing` was retained.
    fn recode_all_expr(&self, col_name: &str, retained: &[Level]) -> Expr {
        if retained.is_empty() {
            return self.rare_level_name.to_expr();
        }
        let when_then_expr = retained
            .iter()
            .map(|level| match level {
                Level::Missing => (
                    Box::new(col(col_name).is_null()),
                    Box::new(col(col_name)),
                ),
                Level::Value(v) => (
                    Box::new(col(col_name).eq(level_lit(v))),
                    Box::new(col(col_name)),
                ),
            })
            .collect();
        Expr::Case(DFCase {
            expr: None,
            when_then_expr,
            else_expr: Some(Box::new(self.rare_level_name.to_expr())),
        })
    }

    /// CASE expression that writes the placeholder only over levels that were
    /// seen during fit but fell below the cut-off. Levels absent from the
    /// training data hit no arm and pass through unchanged.
    fn recode_seen_expr(&self, col_name: &str, retained: &[Level], seen: &[Level]) -> Expr {
        let when_then_expr: Vec<_> = seen
            .iter()
            .filter(|level| !retained.contains(level))
            .map(|level| match level {
                Level::Missing => (
                    Box::new(col(col_name).is_null()),
                    Box::new(self.rare_level_name.to_expr()),
                ),
                Level::Value(v) => (
                    Box::new(col(col_name).eq(level_lit(v))),
                    Box::new(self.rare_level_name.to_expr()),
                ),
            })
            .collect();
        if when_then_expr.is_empty() {
            return col(col_name);
        }
        Expr::Case(DFCase {
            expr: None,
            when_then_expr,
            else_expr: Some(Box::new(col(col_name))),
        })
    }

    /// Builds the projection for transform. Dictionary columns get the CASE
    /// expression cast back to their original type so the placeholder joins
    /// the value domain without dropping the dictionary encoding.
    fn build_transform_exprs(&self, df: &DataFrame) -> RareLevelsResult<Vec<Expr>> {
        let mapping = self.mapping.as_ref().ok_or(RareLevelsError::FitNotCalled)?;
        let schema = df.schema();
        let mut exprs = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let name = field.name();
            if !self.columns.contains(name) {
                exprs.push(col(name));
                continue;
            }
            let retained = mapping.get(name).ok_or(RareLevelsError::FitNotCalled)?;
            let expr = if self.encode_unseen_levels {
                self.recode_all_expr(name, retained)
            } else {
                let seen = self
                    .training_levels
                    .get(name)
                    .ok_or(RareLevelsError::FitNotCalled)?;
                self.recode_seen_expr(name, retained, seen)
            };
            let expr = if matches!(field.data_type(), DataType::Dictionary(_, _)) {
                expr.cast_to(field.data_type(), schema)?
            } else {
                expr
            };
            exprs.push(expr.alias(name));
        }
        Ok(exprs)
    }

    /// Returns a new DataFrame with rare (and, by default, unseen) levels of
    /// the target columns replaced by the placeholder. Requires a prior fit.
    pub fn transform(&self, df: DataFrame) -> RareLevelsResult<DataFrame> {
        validate_columns(&df, &self.columns)?;
        let exprs = self.build_transform_exprs(&df)?;
        df.select(exprs).map_err(RareLevelsError::from)
    }

    /// The grouper learns its mapping in fit, so it is stateful.
    pub fn inherent_is_stateful(&self) -> bool {
        true
    }
}

crate::impl_transformer!(RareLevelGrouper);
