pub mod config;
pub mod geometry;
pub mod image_url;
pub mod interchange;
pub mod labels;
pub mod page_order;
pub mod schema;

pub use config::ProducerConfig;
pub use geometry::{Detection, GeometryError, NormalizedBox, Point};
pub use image_url::ImageUrlConfig;
pub use interchange::{
    AnnotationRecord, ExportError, ExportId, ExportRecord, FlattenedExample, GeometryRecord,
    LabelEntry, Prediction, Task, TranscriptionRecord, TranscriptionValue,
};
pub use labels::{LabelError, LabelVocabulary, UNKNOWN_LABEL_ID};
pub use page_order::page_order_key;
pub use schema::dataset;
