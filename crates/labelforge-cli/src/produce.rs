//! Produce pipeline: page folders → OCR sidecars → one tasks JSON file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use labelforge_annotate::{
    PageOutcome, SequentialIds, SidecarDetector, UuidIds, collect_page_images, produce_pages,
    validate_pairing,
};
use labelforge_core::config::{
    DEFAULT_IMAGE_KEY, DEFAULT_PREDICTION_SCORE, DEFAULT_TRANSCRIPTION_SCORE,
};
use labelforge_core::image_url::{DEFAULT_BASE_FOLDER, DEFAULT_BASE_URL};
use labelforge_core::{ImageUrlConfig, ProducerConfig, Task};
use tracing::info;

#[derive(Args, Clone)]
pub struct ProduceArgs {
    /// Folders of rendered page images, one folder per document.
    #[arg(long, required = true, num_args = 1..)]
    pub images: Vec<PathBuf>,

    /// Root of OCR sidecar folders, laid out as `<root>/<image folder name>/<page>.ocr.json`.
    /// Without it, sidecars are read from beside each page.
    #[arg(long, env = "LABELFORGE_DETECTIONS")]
    pub detections: Option<PathBuf>,

    /// Tasks JSON to write.
    #[arg(long, short)]
    pub output: PathBuf,

    #[arg(long, env = "LABELFORGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Folder the image server is rooted at.
    #[arg(long, env = "LABELFORGE_BASE_FOLDER", default_value = DEFAULT_BASE_FOLDER)]
    pub base_folder: String,

    /// Data key of the image in each task.
    #[arg(long, env = "LABELFORGE_IMAGE_KEY", default_value = DEFAULT_IMAGE_KEY)]
    pub image_key: String,

    #[arg(long, default_value_t = DEFAULT_PREDICTION_SCORE)]
    pub prediction_score: f64,

    #[arg(long, default_value_t = DEFAULT_TRANSCRIPTION_SCORE)]
    pub transcription_score: f32,

    /// Use the OCR engine's own confidence for transcription records.
    #[arg(long)]
    pub use_detector_score: bool,

    /// Deterministic correlation ids (`r0`, `r1`, ...) instead of random ones.
    #[arg(long)]
    pub sequential_ids: bool,

    /// Exit with an error if any page failed.
    #[arg(long)]
    pub strict: bool,
}

impl ProduceArgs {
    fn producer_config(&self) -> ProducerConfig {
        ProducerConfig {
            image_key: self.image_key.clone(),
            prediction_score: self.prediction_score,
            transcription_score: self.transcription_score,
            use_detector_score: self.use_detector_score,
        }
    }

    fn detector_for(&self, folder: &Path) -> SidecarDetector {
        match &self.detections {
            Some(root) => {
                SidecarDetector::in_dir(root.join(folder.file_name().unwrap_or_default()))
            }
            None => SidecarDetector::beside_pages(),
        }
    }
}

#[derive(Debug)]
pub struct ProduceStats {
    pub pages: usize,
    pub tasks: usize,
    pub pairs: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
}

/// Run the full produce pipeline and write every successful task to one file.
pub fn run_produce(args: &ProduceArgs) -> anyhow::Result<ProduceStats> {
    let start = Instant::now();
    let config = args.producer_config();
    let urls = ImageUrlConfig::new(args.base_url.clone(), args.base_folder.clone());

    let mut tasks: Vec<Task> = Vec::new();
    let mut pages = 0usize;
    let mut failed = 0usize;

    for folder in &args.images {
        let paths = collect_page_images(folder)
            .with_context(|| format!("listing page images in {}", folder.display()))?;
        info!(folder = %folder.display(), pages = paths.len(), "processing document");

        let detector = args.detector_for(folder);
        let outcomes = if args.sequential_ids {
            produce_pages(&paths, &detector, &urls, &config, SequentialIds::default)
        } else {
            produce_pages(&paths, &detector, &urls, &config, UuidIds::default)
        };

        pages += outcomes.len();
        for PageOutcome { result, .. } in outcomes {
            match result {
                Ok(task) => tasks.push(task),
                Err(_) => failed += 1,
            }
        }
    }

    let pairs = tasks
        .iter()
        .map(|t| t.records().count() / 2)
        .sum();

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&tasks).context("serialising tasks")?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("writing {}", args.output.display()))?;

    Ok(ProduceStats {
        pages,
        tasks: tasks.len(),
        pairs,
        failed,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// Check pairing in every task of a tasks file; returns the total pair count.
pub fn validate_tasks_file(path: &Path) -> anyhow::Result<usize> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let tasks: Vec<Task> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing tasks in {}", path.display()))?;

    let mut pairs = 0;
    for (index, task) in tasks.iter().enumerate() {
        let image = task.data.values().next().map(String::as_str).unwrap_or("?");
        pairs += validate_pairing(task).with_context(|| format!("task {index} ({image})"))?;
    }
    Ok(pairs)
}
