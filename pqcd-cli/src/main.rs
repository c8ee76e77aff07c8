//! pqcd CLI - cognitive decoy generation and scoring tool

#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use pqcd_core::config::ResolvedConfig;
use pqcd_core::{
    render_evaluate_text, render_generate_text, render_json, DecoyEngine, EvaluateRequest,
    GenerateRequest, StoredDecoy,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pqcd")]
#[command(about = "Cognitive decoy generation for post-quantum algorithm identifiers")]
#[command(version = env!("PQCD_VERSION"))]
struct Cli {
    /// Path to config file (default: auto-discover)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed random seed (overrides config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate decoys for a target identifier
    Generate {
        /// Real algorithm identifier to derive decoys from
        target: String,

        /// Mutation intensity, 1 (near-identical) to 10 (heavily rewritten);
        /// out-of-range values fall back to 5
        #[arg(long)]
        complexity: Option<i64>,

        /// Number of decoys to generate; out-of-range values fall back to 10
        #[arg(long)]
        count: Option<i64>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Evaluate candidate decoys against a target identifier
    Evaluate {
        /// Real algorithm identifier the decoys imitate
        target: String,

        /// Candidate decoy strings
        #[arg(required = true)]
        decoys: Vec<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Retrain the plausibility model and persist a fresh snapshot
    Train,
    /// Show recently generated decoys from the history store
    History {
        /// Only show decoys generated for this target
        #[arg(long)]
        target: Option<String>,

        /// Maximum number of rows to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn render_history_text(rows: &[StoredDecoy]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<6} {:<6} {:<8} {:<20} {:<20} {}\n",
        "ID", "CPLX", "SCORE", "CREATED", "TARGET", "DECOY"
    ));
    for row in rows {
        output.push_str(&format!(
            "{:<6} {:<6} {:<8.2} {:<20} {:<20} {}\n",
            row.id,
            row.complexity,
            row.effectiveness_score,
            row.created_at,
            row.target_text,
            row.decoy_text,
        ));
    }
    output
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = ResolvedConfig::resolve(&root, cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let engine = DecoyEngine::new(config);

    match cli.command {
        Commands::Generate {
            target,
            complexity,
            count,
            format,
        } => {
            let response = engine.generate(&GenerateRequest {
                target,
                complexity,
                count,
            })?;
            match format {
                OutputFormat::Text => print!("{}", render_generate_text(&response)),
                OutputFormat::Json => println!("{}", render_json(&response)),
            }
        }
        Commands::Evaluate {
            target,
            decoys,
            format,
        } => {
            let response = engine.evaluate(&EvaluateRequest { target, decoys })?;
            match format {
                OutputFormat::Text => print!("{}", render_evaluate_text(&response)),
                OutputFormat::Json => println!("{}", render_json(&response)),
            }
        }
        Commands::Train => {
            engine.train(cli.seed)?;
            println!(
                "model retrained and persisted to {}",
                engine.config().model_path.display()
            );
        }
        Commands::History {
            target,
            limit,
            format,
        } => {
            let rows = engine.history(target.as_deref(), limit)?;
            match format {
                OutputFormat::Text => print!("{}", render_history_text(&rows)),
                OutputFormat::Json => println!("{}", render_json(&rows)),
            }
        }
    }

    Ok(())
}
