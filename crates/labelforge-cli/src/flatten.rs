use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use labelforge_annotate::{FlattenPolicy, flatten_batch};
use labelforge_core::{ExportError, ExportRecord};
use labelforge_store::{examples_to_batch, write_jsonl, write_parquet};
use tracing::info;

use crate::VocabArgs;

#[derive(Args, Clone)]
pub struct FlattenArgs {
    /// Corrected export JSON (array of records).
    #[arg(long)]
    pub export: PathBuf,

    /// Parquet dataset to write.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Also write the examples as JSON lines.
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Leave malformed records out instead of failing.
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(Debug)]
pub struct FlattenStats {
    pub examples: usize,
    pub tokens: usize,
    pub misaligned: usize,
    pub dropped_tokens: usize,
    pub dropped_labels: usize,
    pub unknown_labels: usize,
    pub skipped: usize,
}

pub fn run_flatten(args: &FlattenArgs) -> anyhow::Result<FlattenStats> {
    let vocab = args.vocab.load()?;
    let records = read_export(&args.export)?;
    info!(records = records.len(), labels = vocab.len(), "read export");

    let policy = if args.skip_invalid {
        FlattenPolicy::SkipInvalid
    } else {
        FlattenPolicy::FailFast
    };
    let batch = flatten_batch(records, &vocab, policy).context("flattening export")?;

    let columns = examples_to_batch(&batch.examples)?;
    write_parquet(&args.output, &columns)?;
    if let Some(path) = &args.jsonl {
        write_jsonl(path, &batch.examples)?;
    }

    Ok(FlattenStats {
        examples: batch.examples.len(),
        tokens: batch.tokens(),
        misaligned: batch.misaligned(),
        dropped_tokens: batch.dropped_tokens(),
        dropped_labels: batch.dropped_labels(),
        unknown_labels: batch.unknown_labels(),
        skipped: batch.failures.len(),
    })
}

/// Per-record decode results; only an unreadable or non-array file fails here.
fn read_export(path: &Path) -> anyhow::Result<Vec<Result<ExportRecord, ExportError>>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ExportRecord::parse_batch(&raw).with_context(|| format!("parsing {}", path.display()))
}
