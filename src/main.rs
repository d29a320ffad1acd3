use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod batch;
mod config;
mod error;
mod export;
mod filter;
mod ingest;
mod models;
mod report;
mod risk;
mod sentiment;

use export::ExportFormat;
use filter::ResultFilter;
use models::{BatchOutcome, DropoutRisk, SentimentLabel};
use risk::ScoringEngine;
use sentiment::{FixedPolarity, LexiconAnalyzer, PolarityAnalyzer};

#[derive(Parser)]
#[command(name = "student-early-warning")]
#[command(about = "Dropout risk scoring and advisor alerts for student cohorts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score students and print the matching ones
    Score {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// List highest risk first instead of in input order
        #[arg(long)]
        rank: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export scored students, advisor alerts only unless --all is given
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long, default_value = "at_risk_students.csv")]
        out: PathBuf,
    },
    /// Write the sample cohort as a CSV file
    Sample {
        #[arg(long, default_value = "students.csv")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Student CSV; the sample cohort is scored when omitted
    #[arg(long)]
    csv: Option<PathBuf>,
    /// JSON file overriding the rule thresholds
    #[arg(long, env = "EARLY_WARNING_THRESHOLDS")]
    thresholds: Option<PathBuf>,
    /// Blocking workers used for scoring
    #[arg(long)]
    workers: Option<usize>,
    /// Use this polarity for every message instead of analyzing the text
    #[arg(long, allow_hyphen_values = true)]
    polarity: Option<f64>,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, value_enum)]
    risk: Option<DropoutRisk>,
    #[arg(long, value_enum)]
    sentiment: Option<SentimentLabel>,
    #[arg(long)]
    alerts_only: bool,
}

impl ViewArgs {
    fn filter(&self) -> ResultFilter {
        ResultFilter {
            dropout_risk: self.risk,
            sentiment: self.sentiment,
            alerts_only: self.alerts_only,
        }
    }
}

struct Run {
    id: Uuid,
    source: String,
    outcome: BatchOutcome,
}

async fn score_input(input: &InputArgs) -> anyhow::Result<Run> {
    let id = Uuid::new_v4();
    let thresholds = config::load_thresholds(input.thresholds.as_deref())?;
    let engine = ScoringEngine::new(thresholds);

    let (source, rows) = match &input.csv {
        Some(path) => (path.display().to_string(), ingest::read_csv(path)?),
        None => {
            tracing::info!("no --csv given, scoring the sample cohort");
            let rows = ingest::sample_records().into_iter().map(Ok).collect();
            ("sample cohort".to_string(), rows)
        }
    };

    let workers = input.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let analyzer: Arc<dyn PolarityAnalyzer> = match input.polarity {
        Some(polarity) => Arc::new(FixedPolarity(polarity)),
        None => Arc::new(LexiconAnalyzer),
    };

    tracing::info!(
        run = %id,
        source = %source,
        rows = rows.len(),
        thresholds = ?engine.thresholds(),
        "scoring students"
    );
    let outcome = batch::score_batch_parallel(rows, engine, analyzer, workers).await?;

    Ok(Run {
        id,
        source,
        outcome,
    })
}

fn write_file(out: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            input,
            view,
            limit,
            rank,
        } => {
            let run = score_input(&input).await?;
            let filter = view.filter();
            let mut matched = filter.apply(&run.outcome.scored);
            if rank {
                matched = report::rank_by_risk(&matched);
            }

            if matched.is_empty() {
                println!("No students match {}.", filter.describe());
            } else {
                let order = if rank { "by risk score" } else { "in input order" };
                println!("Students {order} ({}):", filter.describe());
                for student in matched.iter().take(limit) {
                    println!("- {}", report::describe_student(student));
                }
            }

            let mix = report::summarize_risk(&run.outcome.scored);
            println!(
                "Scored {} students from {}: {} advisor alerts, {} skipped.",
                run.outcome.scored.len(),
                run.source,
                mix.alerts,
                run.outcome.failed.len()
            );
            for failed in &run.outcome.failed {
                println!("  skipped {}: {}", failed.student_id, failed.error);
            }
        }
        Commands::Report {
            input,
            view,
            limit,
            out,
        } => {
            let run = score_input(&input).await?;
            let mut filter = view.filter();
            if filter == ResultFilter::default() {
                filter = ResultFilter::at_risk();
            }
            let context = report::ReportContext {
                source: &run.source,
                filter,
                limit,
                generated_at: chrono::Utc::now(),
                run_id: run.id,
            };
            let report = report::build_report(&context, &run.outcome);
            write_file(&out, &report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            input,
            view,
            all,
            format,
            out,
        } => {
            let run = score_input(&input).await?;
            let mut filter = view.filter();
            if !all {
                filter.alerts_only = true;
            }
            let selected = filter.apply(&run.outcome.scored);

            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_export(std::io::BufWriter::new(file), format, &selected)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Exported {} students ({}) to {}.",
                selected.len(),
                filter.describe(),
                out.display()
            );
        }
        Commands::Sample { out } => {
            let written = ingest::write_sample_csv(&out)?;
            println!("Wrote {written} sample students to {}.", out.display());
        }
    }

    Ok(())
}
