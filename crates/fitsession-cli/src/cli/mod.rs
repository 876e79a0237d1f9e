//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use fitsession_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "fitsession")]
#[command(version = "0.1")]
#[command(about = "Sign in, sign out and manage the stored Fit session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password (password read from stdin)
    Login {
        /// Account email
        #[arg(long, required_unless_present = "google")]
        email: Option<String>,
        /// Sign in with a Google account instead
        #[arg(long, conflicts_with = "email")]
        google: bool,
    },

    /// Sign out and remove the stored session
    Logout,

    /// Create an account (password and confirmation read from stdin)
    Register {
        /// Account email
        #[arg(long, required_unless_present = "google")]
        email: Option<String>,
        /// Register with a Google account instead
        #[arg(long, conflicts_with = "email")]
        google: bool,
    },

    /// Send a password recovery email
    Recover {
        /// Account email
        #[arg(long)]
        email: String,
    },

    /// Show the stored session
    Status,

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
    /// Generate a fresh config from Rust defaults
    Generate,
    /// Save the identity provider API key
    SetApiKey {
        /// Web API key of the identity project
        #[arg(value_name = "KEY")]
        key: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli.command, &config).await })
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    match command {
        Commands::Login { email, google } => match (email, google) {
            (_, true) => commands::auth::login_google(),
            (Some(email), false) => commands::auth::login(config, &email).await,
            (None, false) => anyhow::bail!("Please specify --email or --google"),
        },

        Commands::Logout => commands::auth::logout(config).await,

        Commands::Register { email, google } => match (email, google) {
            (_, true) => commands::auth::register_google(),
            (Some(email), false) => commands::auth::register(config, &email).await,
            (None, false) => anyhow::bail!("Please specify --email or --google"),
        },

        Commands::Recover { email } => commands::auth::recover(config, &email).await,

        Commands::Status => commands::session::status(config),

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
            ConfigCommands::SetApiKey { key } => commands::config::set_api_key(&key),
        },
    }
}
