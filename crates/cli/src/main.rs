//! RustedReason CLI: the main entry point.
//!
//! Commands:
//! - `run`    : Single question or interactive reason-act session
//! - `tools`  : List the built-in tools
//! - `config` : Show the effective or default configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rustedreason",
    about = "RustedReason: a reason-act loop over language models and tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question, or start an interactive session
    Run {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override agent.max_iterations
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Prompt mode: execute or plan
        #[arg(long)]
        mode: Option<String>,

        /// Read a custom prompt from this file
        #[arg(long)]
        prompt_file: Option<std::path::PathBuf>,
    },

    /// List the built-in tools
    Tools,

    /// Show configuration
    Config {
        /// Print the default config.toml instead of the effective config
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            message,
            max_iterations,
            mode,
            prompt_file,
        } => {
            commands::run::run(commands::run::RunOptions {
                message,
                max_iterations,
                mode,
                prompt_file,
            })
            .await?
        }
        Commands::Tools => commands::tools::run()?,
        Commands::Config { default } => commands::config_cmd::run(default)?,
    }

    Ok(())
}
