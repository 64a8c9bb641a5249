/// Arrow schema definitions for the flattened token-classification dataset.
pub mod dataset {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    /// Values per bounding box: `[x, y, width, height]`.
    pub const BBOX_WIDTH: i32 = 4;

    pub fn bbox_type() -> DataType {
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float64, true)),
            BBOX_WIDTH,
        )
    }

    /// Schema for one row per document: aligned tokens, boxes and tag ids.
    pub fn flattened_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("image", DataType::Utf8, false),
            Field::new(
                "tokens",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                false,
            ),
            Field::new(
                "bboxes",
                DataType::List(Arc::new(Field::new("item", bbox_type(), true))),
                false,
            ),
            Field::new(
                "ner_tags",
                DataType::List(Arc::new(Field::new("item", DataType::Int64, true))),
                false,
            ),
        ])
    }
}
