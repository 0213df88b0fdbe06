//! ## Level Value Model
//!
//! This module defines the value model shared by the grouping transformers:
//!
//! - **[`Level`]**: a distinct value observed in a column during fit. Missing
//!   values are a first-class level rather than a sentinel mixed in with real
//!   values, so a null group that clears the frequency cutoff can be retained
//!   like any other level.
//! - **[`RareLevel`]**: the placeholder value written over rare or unseen
//!   levels. It carries its own type tag so it can be checked against a
//!   column's dtype at fit time instead of failing (or silently coercing)
//!   during transform.
//! - **[`TypeFamily`]**: a small closed enumeration of the column type
//!   families the grouper supports, used for that placeholder check.

use arrow::datatypes::DataType;
use datafusion::logical_expr::{lit, Expr};
use datafusion::scalar::ScalarValue;

/// A distinct value observed in a column. Missing values form their own level.
#[derive(Debug, Clone, PartialEq)]
pub enum Level {
    /// The missing-value marker (an Arrow null).
    Missing,
    /// A concrete non-null value.
    Value(ScalarValue),
}

impl Level {
    /// Returns true for the missing-value level.
    pub fn is_missing(&self) -> bool {
        matches!(self, Level::Missing)
    }
}

/// The placeholder written for rare and unseen levels.
///
/// The variant determines the [`TypeFamily`] the placeholder is compatible
/// with: a text placeholder can only be written into text (or text-valued
/// dictionary) columns, and likewise for the numeric variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RareLevel {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RareLevel {
    /// Convenience constructor for the common string placeholder.
    pub fn text(s: impl Into<String>) -> Self {
        RareLevel::Text(s.into())
    }

    /// The type family this placeholder belongs to.
    pub fn family(&self) -> TypeFamily {
        match self {
            RareLevel::Text(_) => TypeFamily::Text,
            RareLevel::Int(_) => TypeFamily::Integer,
            RareLevel::Float(_) => TypeFamily::Float,
        }
    }

    /// The placeholder as a literal expression.
    pub fn to_expr(&self) -> Expr {
        match self {
            RareLevel::Text(s) => lit(s.clone()),
            RareLevel::Int(v) => lit(*v),
            RareLevel::Float(v) => lit(*v),
        }
    }
}

/// The closed set of column type families supported by the grouper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Text,
    Integer,
    Float,
}

impl TypeFamily {
    /// Maps an Arrow data type to its family. Dictionary columns belong to the
    /// family of their value type. Returns `None` for types the grouper does
    /// not support.
    pub fn of_data_type(data_type: &DataType) -> Option<TypeFamily> {
        match data_type {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(TypeFamily::Text),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Some(TypeFamily::Integer),
            DataType::Float16 | DataType::Float32 | DataType::Float64 => Some(TypeFamily::Float),
            DataType::Dictionary(_, value_type) => TypeFamily::of_data_type(value_type),
            _ => None,
        }
    }
}
