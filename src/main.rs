use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AuthCommand, ConfigCommand, CreateCommand, DashboardCommand, ListCommand, UpdateCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "sitesync")]
#[command(version)]
#[command(about = "Construction-management client for the SiteSync backend", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, log out, or show the current session
    Auth(AuthCommand),

    /// List records of a resource kind
    List(ListCommand),

    /// Create a record
    Create(CreateCommand),

    /// Update a record
    Update(UpdateCommand),

    /// Show role-specific statistics
    Dashboard(DashboardCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitesync=warn,sitesync_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config init
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Auth(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::List(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Create(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Update(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Dashboard(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
