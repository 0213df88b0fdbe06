// Run `cargo run --example basic_usage` to execute this example

use std::error::Error;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::memory::MemTable;
use datafusion::prelude::*;

use rare_levels::make_pipeline;
use rare_levels::transformers::grouping::RareLevelGrouper;
use rare_levels::transformers::levels::RareLevel;

/// Builds a small in-memory DataFrame with a "city" column where "london"
/// dominates and the other cities are rare.
async fn load_data() -> Result<DataFrame, datafusion::error::DataFusionError> {
    let schema = Arc::new(Schema::new(vec![Field::new("city", DataType::Utf8, true)]));
    let city: ArrayRef = Arc::new(StringArray::from(vec![
        Some("london"),
        Some("london"),
        Some("london"),
        Some("london"),
        Some("london"),
        Some("london"),
        Some("paris"),
        Some("oslo"),
        Some("rome"),
        None,
    ]));
    let batch = RecordBatch::try_new(schema.clone(), vec![city])?;
    let mem_table = MemTable::try_new(schema, vec![vec![batch]])?;
    let ctx = SessionContext::new();
    ctx.register_table("cities", Arc::new(mem_table))?;
    ctx.table("cities").await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let input_df = load_data().await?;

    // Show the input data
    input_df.clone().show().await?;

    // Keep cities holding at least 20% of the rows; everything else becomes "other"
    let grouper = RareLevelGrouper::new(
        vec!["city".to_string()],
        0.2,
        None,
        RareLevel::text("other"),
        false,
        true,
    )?;
    let mut pipeline = make_pipeline!(true, ("group_rare_cities", grouper));

    // Fit the pipeline and show the transformed data
    let output_df = pipeline.fit_transform(&input_df).await?;
    output_df.show().await?;

    Ok(())
}
