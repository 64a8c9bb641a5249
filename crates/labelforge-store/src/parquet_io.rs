//! Parquet read/write for dataset batches.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::StoreError;

/// Write one batch to a Parquet file, replacing any existing file.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::ParquetNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples_to_batch;
    use arrow::array::{Array, ListArray, StringArray};
    use labelforge_core::FlattenedExample;
    use tempfile::TempDir;

    fn examples() -> Vec<FlattenedExample> {
        (0..3)
            .map(|i| FlattenedExample {
                id: i.to_string(),
                image: format!("page_{i}.png"),
                tokens: vec![format!("tok{i}"); i],
                bboxes: vec![[0.0, 0.0, 1.0, 1.0]; i],
                label_ids: vec![i as i64; i],
            })
            .collect()
    }

    #[test]
    fn write_then_read_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("dataset.parquet");
        let batch = examples_to_batch(&examples()).unwrap();

        write_parquet(&path, &batch).unwrap();
        assert!(path.exists());

        let batches = read_parquet(&path).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 3);
        assert_eq!(batches[0].schema().fields().len(), 5);

        let ids = batches[0]
            .column_by_name("id")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(ids.value(2), "2");

        let tokens = batches[0]
            .column_by_name("tokens")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert_eq!(tokens.value(2).len(), 2);
    }

    #[test]
    fn rewrite_replaces_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dataset.parquet");
        let batch = examples_to_batch(&examples()).unwrap();

        write_parquet(&path, &batch).unwrap();
        write_parquet(&path, &batch).unwrap();

        let rows: usize = read_parquet(&path).unwrap().iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 3);
    }

    #[test]
    fn missing_parquet_errors() {
        let result = read_parquet(Path::new("/nonexistent/file.parquet"));
        assert!(matches!(result, Err(StoreError::ParquetNotFound(_))));
    }
}
