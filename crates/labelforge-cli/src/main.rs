mod display;
mod flatten;
mod produce;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use labelforge_core::LabelVocabulary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labelforge", version, about = "Build token-classification datasets from OCR'd page images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn page images and their OCR detections into labelling tasks.
    Produce(produce::ProduceArgs),
    /// Turn a corrected export into a columnar dataset.
    Flatten(flatten::FlattenArgs),
    /// Check geometry/transcription pairing in a tasks file.
    Validate {
        /// Tasks JSON written by `produce`.
        #[arg(long)]
        tasks: PathBuf,
    },
    /// Print the label vocabulary as id2label/label2id JSON.
    Labels(VocabArgs),
    /// Show the first rows of a Parquet dataset.
    Inspect {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Args, Clone, Default)]
pub struct VocabArgs {
    /// JSON array of class names replacing the built-in vocabulary.
    #[arg(long, env = "LABELFORGE_LABELS")]
    pub labels: Option<PathBuf>,
}

impl VocabArgs {
    pub fn load(&self) -> anyhow::Result<LabelVocabulary> {
        match &self.labels {
            Some(path) => LabelVocabulary::from_json_file(path).context("loading label vocabulary"),
            None => Ok(LabelVocabulary::default()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("labelforge v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Produce(args) => {
            let stats = produce::run_produce(&args)?;
            eprintln!(
                "  {} tasks ({} pairs) from {} pages, {} failed, in {:.1}s → {}",
                stats.tasks,
                stats.pairs,
                stats.pages,
                stats.failed,
                stats.elapsed_secs,
                args.output.display()
            );
            if args.strict && stats.failed > 0 {
                anyhow::bail!("{} page(s) failed", stats.failed);
            }
        }
        Command::Flatten(args) => {
            let stats = flatten::run_flatten(&args)?;
            eprintln!(
                "  {} examples, {} tokens ({} misaligned, {} tokens / {} labels dropped, {} unknown labels, {} skipped) → {}",
                stats.examples,
                stats.tokens,
                stats.misaligned,
                stats.dropped_tokens,
                stats.dropped_labels,
                stats.unknown_labels,
                stats.skipped,
                args.output.display()
            );
        }
        Command::Validate { tasks } => {
            let pairs = produce::validate_tasks_file(&tasks)?;
            eprintln!("  {} pairs OK in {}", pairs, tasks.display());
        }
        Command::Labels(args) => {
            let vocab = args.load()?;
            println!("{}", display::vocabulary_json(&vocab)?);
        }
        Command::Inspect { dataset, limit } => {
            println!("{}", display::preview_dataset(&dataset, limit)?);
        }
    }
    Ok(())
}
