use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prompter_core::script::DEFAULT_WORDS_PER_MINUTE;
use prompter_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "prompter")]
#[command(author, version, about = "A terminal teleprompter with reading-line highlighting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to present (shorthand for `run --script`)
    #[arg(short = 's', long = "script")]
    script: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prompter
    Run {
        /// Plain-text script file
        #[arg(short = 's', long)]
        script: Option<PathBuf>,
    },
    /// Word count and estimated reading time of a script
    Stats {
        /// Plain-text script file
        #[arg(short = 's', long)]
        script: Option<PathBuf>,
        /// Reading pace in words per minute
        #[arg(long, default_value_t = DEFAULT_WORDS_PER_MINUTE)]
        wpm: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

/// Route logs to stderr, or to the log file while the terminal UI owns the screen
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let runs_tui = matches!(cli.command, None | Some(Commands::Run { .. }));
    init_logging(&config, runs_tui)?;

    match cli.command {
        Some(Commands::Run { script }) => {
            let script = commands::load_script(script.or(cli.script).as_deref(), &config).await?;
            commands::run::run(config, script).await
        }
        None => {
            let script = commands::load_script(cli.script.as_deref(), &config).await?;
            commands::run::run(config, script).await
        }
        Some(Commands::Stats { script, wpm, json }) => {
            let script = commands::load_script(script.or(cli.script).as_deref(), &config).await?;
            commands::stats::run(&script, wpm, json)
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
