//! Text renderings for the `labels` and `inspect` commands.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use labelforge_core::LabelVocabulary;
use labelforge_store::read_parquet;

/// `{"id2label": ..., "label2id": ...}` as pretty JSON.
pub fn vocabulary_json(vocab: &LabelVocabulary) -> anyhow::Result<String> {
    let value = serde_json::json!({
        "id2label": vocab.id2label(),
        "label2id": vocab.label2id(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// First `limit` rows of a Parquet dataset as a table, preceded by a row count.
pub fn preview_dataset(path: &Path, limit: usize) -> anyhow::Result<String> {
    let batches = read_parquet(path)?;
    let total: usize = batches.iter().map(RecordBatch::num_rows).sum();

    let mut head = Vec::new();
    let mut remaining = limit;
    for batch in &batches {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.num_rows());
        head.push(batch.slice(0, take));
        remaining -= take;
    }

    let shown = limit.min(total);
    let table = pretty_format_batches(&head)?;
    Ok(format!("{}: {shown} of {total} rows\n{table}", path.display()))
}
