use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::memory::MemTable;
use datafusion::prelude::*;
use tokio;

use rare_levels::exceptions::RareLevelsResult;
use rare_levels::make_pipeline;
use rare_levels::pipeline::Pipeline;
use rare_levels::transformers::grouping::RareLevelGrouper;
use rare_levels::transformers::levels::RareLevel;

async fn create_city_df() -> DataFrame {
    let schema = Arc::new(Schema::new(vec![Field::new("city", DataType::Utf8, true)]));
    let city: ArrayRef = Arc::new(StringArray::from(vec![
        Some("london"),
        Some("london"),
        Some("london"),
        Some("paris"),
        Some("oslo"),
    ]));
    let batch = RecordBatch::try_new(schema.clone(), vec![city]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("t", Arc::new(mem_table)).unwrap();
    ctx.table("t").await.unwrap()
}

#[tokio::test]
async fn test_grouper_in_pipeline() -> RareLevelsResult<()> {
    let df = create_city_df().await;
    let grouper = RareLevelGrouper::new(
        vec!["city".to_string()],
        0.3,
        None,
        RareLevel::text("other"),
        false,
        true,
    )?;
    let mut pipeline = make_pipeline!(false, ("group_rare_cities", grouper));

    let fitted = pipeline.fit_transform(&df).await?;
    let batches = fitted.collect().await?;
    let batch = batches.first().expect("Expected at least one batch");
    let city = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("Expected StringArray");
    let expected = ["london", "london", "london", "other", "other"];
    for (i, exp) in expected.into_iter().enumerate() {
        assert_eq!(city.value(i), exp, "Row {}: expected {}", i, exp);
    }

    // The fitted pipeline applies the same recoding to fresh data.
    let transformed = pipeline.transform(create_city_df().await)?;
    let batches = transformed.collect().await?;
    let batch = batches.first().expect("Expected at least one batch");
    let city = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("Expected StringArray");
    assert_eq!(city.value(4), "other");
    Ok(())
}

#[tokio::test]
async fn test_empty_pipeline_errors() {
    let df = create_city_df().await;
    let mut pipeline = Pipeline::new(vec![], false);
    assert!(pipeline.fit(&df).await.is_err(), "Empty pipeline must error");
    assert!(pipeline.transform(df).is_err(), "Empty pipeline must error");
}
