//! Annotation layer: OCR detections → weak tasks, corrected exports → aligned training arrays.

pub mod batch;
pub mod detector;
pub mod flatten;
pub mod ids;
pub mod page;
pub mod pairing;
pub mod producer;

pub use batch::{FlattenBatch, FlattenPolicy, PageOutcome, flatten_batch, produce_pages};
pub use detector::{DetectError, SidecarDetector, TextDetector};
pub use flatten::{FlattenReport, flatten, flatten_with_report};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use page::{PageError, PageImage, collect_page_images};
pub use pairing::{PairingError, validate_pairing};
pub use producer::produce;
