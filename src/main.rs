use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod aggregate;
mod config;
mod db;
mod insights;
mod models;
mod narrative;
mod narrator;
mod report;
mod sentiment;

use models::FeedbackFilters;
use narrator::{GeminiNarrator, Narrator};

#[derive(Parser)]
#[command(name = "feedback-triage")]
#[command(about = "Course feedback sentiment and priority analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze feedback per type and rank by priority
    #[command(group(
        ArgGroup::new("source")
            .args(["csv", "database"])
            .required(true)
            .multiple(false)
    ))]
    Analyze {
        /// Read feedback rows from a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Read feedback rows from Postgres (DATABASE_URL)
        #[arg(long)]
        database: bool,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Skip the remote narrative service
        #[arg(long)]
        no_ai: bool,
    },
    /// Print the sentiment score of a single text
    Score {
        text: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    from_date: Option<NaiveDate>,
    #[arg(long)]
    to_date: Option<NaiveDate>,
    #[arg(long)]
    student_group: Option<String>,
    #[arg(long)]
    student: Option<String>,
    /// Course feedback type
    #[arg(long)]
    category: Option<String>,
}

impl From<FilterArgs> for FeedbackFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            from_date: args.from_date,
            to_date: args.to_date,
            student_group: args.student_group,
            student: args.student,
            category: args.category,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn build_narrator(no_ai: bool) -> anyhow::Result<Option<Arc<dyn Narrator>>> {
    if no_ai {
        return Ok(None);
    }
    match config::NarratorConfig::from_env()? {
        Some(config) => {
            info!(api_url = %config.api_url, "Remote narratives enabled");
            let narrator: Arc<dyn Narrator> = Arc::new(GeminiNarrator::new(config)?);
            Ok(Some(narrator))
        }
        None => {
            info!("GEMINI_API_KEY not set, using rule-based narratives");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            database,
            filters,
            format,
            out,
            no_ai,
        } => {
            let filters = FeedbackFilters::from(filters);

            let records = match csv {
                Some(path) => db::load_csv(&path, &filters)?,
                None if database => {
                    let database_url = std::env::var("DATABASE_URL")
                        .context("DATABASE_URL must be set to read feedback from Postgres")?;
                    let pool = PgPoolOptions::new()
                        .max_connections(5)
                        .connect(&database_url)
                        .await
                        .context("failed to connect to Postgres")?;
                    db::fetch_feedback(&pool, &filters).await?
                }
                None => anyhow::bail!("either --csv or --database is required"),
            };
            info!(records = records.len(), "Loaded feedback");

            let mut categories = aggregate::aggregate(&records);
            let summary = aggregate::summarize(&categories);
            let insights = insights::insights(&records);

            let narrator = build_narrator(no_ai)?;
            let timeout = config::narrative_timeout()?;
            narrator::attach_narratives(&mut categories, narrator, timeout).await;

            let rendered = match format {
                Format::Markdown => {
                    report::build_markdown(&filters, &summary, &insights, &categories)
                }
                Format::Json => report::build_json(&summary, &insights, &categories)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Score { text } => {
            let score = sentiment::score(&text);
            let label = if sentiment::is_negative(score) {
                "negative"
            } else {
                "not negative"
            };
            println!("{score:.3} ({label})");
        }
    }

    Ok(())
}
