mod generate;
mod insights;
mod predict;
mod train;

use std::path::PathBuf;

use brandpulse_core::AppConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "brandpulse-cli")]
#[command(about = "Brand sentiment training and reporting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a seeded synthetic corpus of labeled posts
    Generate {
        /// Number of posts to generate
        #[arg(long, default_value_t = 12_000)]
        posts: usize,

        /// Seed for the generator (defaults to BRANDPULSE_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV (defaults to <data dir>/social_posts_raw.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Evaluate on a held-out split, refit on all posts, save the model and brand summary
    Train {
        /// Labeled corpus CSV
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the refit pipeline
        #[arg(long)]
        model: Option<PathBuf>,

        /// Where to write the brand summary CSV
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Print the evaluation report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Classify free text with a saved pipeline
    Predict {
        #[arg(long)]
        model: Option<PathBuf>,

        /// Texts to classify
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Print the brand summary with best and most negative brands
    Insights {
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

/// Config from `.env` plus the process environment, and the log filter it implies.
fn startup() -> anyhow::Result<(AppConfig, EnvFilter)> {
    let config = brandpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_log_filter()))?;
    Ok((config, env_filter))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, env_filter) = startup()?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Generate {
            posts,
            seed,
            output,
        }) => generate::run_generate(&config, posts, seed, output),
        Some(Commands::Train {
            input,
            model,
            summary,
            json,
        }) => {
            let paths = train::TrainPaths::resolve(&config, input, model, summary);
            train::run_train(&config, &paths, json)
        }
        Some(Commands::Predict { model, texts }) => predict::run_predict(&config, model, &texts),
        Some(Commands::Insights { summary }) => insights::run_insights(&config, summary),
        None => {
            println!("brandpulse-cli: choose a command (generate, train, predict, insights); see --help");
            Ok(())
        }
    }
}
