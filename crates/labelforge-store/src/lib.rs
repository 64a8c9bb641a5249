//! Storage layer: flattened examples → Arrow RecordBatch → Parquet / JSON lines.

mod error;
pub use error::StoreError;

mod columnar;
pub use columnar::examples_to_batch;

mod parquet_io;
pub use parquet_io::{read_parquet, write_parquet};

mod jsonl;
pub use jsonl::write_jsonl;
