//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use climate_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "climate")]
#[command(version)]
#[command(about = "Climate viewer timeline shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overridden by CLIMATE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the selectable years
    Years {
        /// Print every year on its own line
        #[arg(long)]
        list: bool,
    },
    /// List the supported aggregate statistics
    Stats,
    /// Play the timeline, printing each year as it is rendered
    Play(commands::timeline::PlayArgs),
    /// Print the absolute API URL for a path
    Url {
        /// API path (leading slash optional)
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Fetch an API path and print the response body
    Get {
        /// API path (leading slash optional)
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Show the effective configuration
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    // single-threaded event loop, like the browser the core was written for
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Years { list } => commands::timeline::years(&load_config()?, list),
        Commands::Stats => {
            commands::timeline::stats();
            Ok(())
        }
        Commands::Play(args) => commands::timeline::play(&load_config()?, args).await,
        Commands::Url { path } => commands::api::url(&load_config()?, &path),
        Commands::Get { path } => commands::api::get(&load_config()?, &path).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(),
        },
    }
}

fn load_config() -> Result<config::Config> {
    config::Config::load().context("load config")
}
