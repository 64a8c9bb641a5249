//! Batch drivers: many pages → tasks, many export records → examples.
//!
//! Units of work are independent, so both run on the rayon pool. Output
//! order always matches input order. A failing unit is reported on its own
//! and never takes down the rest of the batch unless the caller asks for it.

use std::path::{Path, PathBuf};

use labelforge_core::{
    ExportError, ExportRecord, FlattenedExample, ImageUrlConfig, LabelVocabulary, ProducerConfig,
    Task,
};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::detector::TextDetector;
use crate::flatten::{FlattenReport, flatten_with_report};
use crate::ids::IdGenerator;
use crate::page::{PageError, PageImage};
use crate::producer::produce;

/// Result of producing one page.
#[derive(Debug)]
pub struct PageOutcome {
    pub path: PathBuf,
    pub result: Result<Task, PageError>,
}

/// Produce one task per page image.
///
/// `new_ids` is called once per page so that correlation ids are scoped to
/// the task they belong to.
pub fn produce_pages<D, F, G>(
    pages: &[PathBuf],
    detector: &D,
    urls: &ImageUrlConfig,
    config: &ProducerConfig,
    new_ids: F,
) -> Vec<PageOutcome>
where
    D: TextDetector + ?Sized,
    F: Fn() -> G + Sync,
    G: IdGenerator,
{
    let outcomes: Vec<PageOutcome> = pages
        .par_iter()
        .map(|path| {
            let result = produce_page(path, detector, urls, config, &mut new_ids());
            if let Err(e) = &result {
                warn!(page = %path.display(), error = %e, "skipping page");
            }
            PageOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();

    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(pages = pages.len(), ok, failed = pages.len() - ok, "produced tasks");
    outcomes
}

fn produce_page<D: TextDetector + ?Sized>(
    path: &Path,
    detector: &D,
    urls: &ImageUrlConfig,
    config: &ProducerConfig,
    ids: &mut dyn IdGenerator,
) -> Result<Task, PageError> {
    let page = PageImage::open(path)?;
    let detections = detector.detect(&page)?;
    produce(&page, &urls.url_for(path), &detections, config, ids).map_err(|source| {
        PageError::Geometry {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// What to do with a record that fails structural checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlattenPolicy {
    /// Stop at the first bad record (in input order).
    #[default]
    FailFast,
    /// Log and leave bad records out of the dataset.
    SkipInvalid,
}

/// Flattened examples plus per-record reports and skipped failures.
#[derive(Debug, Default)]
pub struct FlattenBatch {
    pub examples: Vec<FlattenedExample>,
    pub reports: Vec<FlattenReport>,
    /// Records left out under [`FlattenPolicy::SkipInvalid`].
    pub failures: Vec<ExportError>,
}

impl FlattenBatch {
    pub fn tokens(&self) -> usize {
        self.reports.iter().map(|r| r.kept).sum()
    }

    pub fn dropped_tokens(&self) -> usize {
        self.reports.iter().map(FlattenReport::dropped_tokens).sum()
    }

    pub fn dropped_labels(&self) -> usize {
        self.reports.iter().map(FlattenReport::dropped_labels).sum()
    }

    pub fn unknown_labels(&self) -> usize {
        self.reports.iter().map(|r| r.unknown_labels.len()).sum()
    }

    /// Records whose token and label counts differed.
    pub fn misaligned(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_aligned()).count()
    }
}

/// Flatten every record against one shared vocabulary.
///
/// Takes records as decoded by [`ExportRecord::parse_batch`]: an element that
/// failed to decode is handled by `policy` like any other structural error.
pub fn flatten_batch(
    records: Vec<Result<ExportRecord, ExportError>>,
    vocab: &LabelVocabulary,
    policy: FlattenPolicy,
) -> Result<FlattenBatch, ExportError> {
    let total = records.len();
    let results: Vec<_> = records
        .into_par_iter()
        .map(|record| record.and_then(|r| flatten_with_report(&r, vocab)))
        .collect();

    let mut batch = FlattenBatch::default();
    for result in results {
        match result {
            Ok((example, report)) => {
                batch.examples.push(example);
                batch.reports.push(report);
            }
            Err(e) if policy == FlattenPolicy::SkipInvalid => {
                warn!(error = %e, "skipping export record");
                batch.failures.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        records = total,
        examples = batch.examples.len(),
        skipped = batch.failures.len(),
        tokens = batch.tokens(),
        misaligned = batch.misaligned(),
        unknown_labels = batch.unknown_labels(),
        "flattened export"
    );
    Ok(batch)
}
