//! CodeAtlas CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "codeatlas")]
#[command(about = "Code graph extraction for JavaScript and TypeScript repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding codeatlas.toml and the graph cache (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local directory or a GitHub repository and print its graph as JSON
    Analyze {
        /// Local directory or GitHub URL (defaults to the root directory)
        target: Option<String>,

        /// Analyze a file tree JSON document instead of a directory or repository
        #[arg(long, conflicts_with = "target")]
        tree: Option<PathBuf>,

        /// Write the graph to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ignore any cached graph and analyze again
        #[arg(long)]
        refresh: bool,
    },
    /// Clear the graph cache
    Clear,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codeatlas={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("CodeAtlas v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            target,
            tree,
            output,
            refresh,
        } => {
            let request = commands::AnalyzeRequest {
                target,
                tree,
                output,
                refresh,
            };
            commands::analyze(cli.root, request).await
        }
        Commands::Clear => commands::clear(cli.root),
        Commands::Version => {
            println!("CodeAtlas v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
