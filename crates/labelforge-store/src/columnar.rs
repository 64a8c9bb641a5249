//! Flattened examples → one Arrow RecordBatch.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, FixedSizeListBuilder, Float64Builder, Int64Builder, ListBuilder, StringArray,
    StringBuilder,
};
use arrow::record_batch::RecordBatch;
use labelforge_core::FlattenedExample;
use labelforge_core::schema::dataset::{self, BBOX_WIDTH};

use crate::StoreError;

/// Build a RecordBatch with [`dataset::flattened_schema`], one row per example.
pub fn examples_to_batch(examples: &[FlattenedExample]) -> Result<RecordBatch, StoreError> {
    if let Some(bad) = examples
        .iter()
        .find(|e| e.bboxes.len() != e.tokens.len() || e.label_ids.len() != e.tokens.len())
    {
        return Err(StoreError::Other(format!(
            "example {} has misaligned arrays: {} tokens, {} bboxes, {} tags",
            bad.id,
            bad.tokens.len(),
            bad.bboxes.len(),
            bad.label_ids.len()
        )));
    }

    let ids = StringArray::from(examples.iter().map(|e| e.id.as_str()).collect::<Vec<_>>());
    let images = StringArray::from(examples.iter().map(|e| e.image.as_str()).collect::<Vec<_>>());

    let mut tokens = ListBuilder::new(StringBuilder::new());
    let mut bboxes = ListBuilder::new(FixedSizeListBuilder::new(Float64Builder::new(), BBOX_WIDTH));
    let mut tags = ListBuilder::new(Int64Builder::new());

    for example in examples {
        for token in &example.tokens {
            tokens.values().append_value(token);
        }
        tokens.append(true);

        for bbox in &example.bboxes {
            let quad = bboxes.values();
            quad.values().append_slice(bbox);
            quad.append(true);
        }
        bboxes.append(true);

        tags.values().append_slice(&example.label_ids);
        tags.append(true);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ids),
        Arc::new(images),
        Arc::new(tokens.finish()),
        Arc::new(bboxes.finish()),
        Arc::new(tags.finish()),
    ];

    Ok(RecordBatch::try_new(
        Arc::new(dataset::flattened_schema()),
        columns,
    )?)
}
