mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about = "Validate data against declarative schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a data file against a schema definition
    Validate {
        /// Path to the schema definition (YAML, TOML or JSON)
        schema: String,

        /// Path to the data file (JSON or YAML)
        input: String,

        /// Stop at the first issue anywhere in the input
        #[arg(long)]
        abort_early: bool,

        /// Stop each pipe at its first issue
        #[arg(long)]
        abort_pipe_early: bool,

        /// Language used to pick messages from the messages file
        #[arg(long)]
        lang: Option<String>,

        /// Messages file (YAML, TOML or JSON) keyed by language
        #[arg(short, long)]
        messages: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check a schema definition without validating data
    Check {
        /// Path to the schema definition (YAML, TOML or JSON)
        schema: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Validate {
            schema,
            input,
            abort_early,
            abort_pipe_early,
            lang,
            messages,
            format,
        } => {
            let options = commands::validate::Options {
                abort_early,
                abort_pipe_early,
                lang,
                messages,
            };
            commands::validate::execute(&schema, &input, options, format).await
        }

        Commands::Check { schema, format } => commands::check::execute(&schema, format),
    }
}
