use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consecutive_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "consecutive")]
#[command(author, version, about = "Consecutive scrolling playground and gesture simulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of ~/.config/consecutive/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the terminal playground
    Run,
    /// Run a scripted gesture scenario and print the event trace
    Simulate {
        /// Scenario file (TOML)
        scenario: PathBuf,
        /// Print the trace as JSON
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
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print where the configuration file lives
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // The playground owns the terminal, so its logs go to a file
    let playground = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, playground)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate { scenario, json }) => {
            commands::simulate::run(&scenario, json).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}

fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        std::fs::create_dir_all(config.data_dir())?;
        let log_file = std::fs::File::create(config.log_path())?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(log_file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
