//! Boutique CLI - operator tools for the commerce API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the commerce API answers
//! boutique-cli health
//!
//! # Verify staff credentials (password from BOUTIQUE_ADMIN_PASSWORD)
//! boutique-cli login -e admin@boutique.vn
//!
//! # List order statuses and their customer-facing messages
//! boutique-cli statuses -e admin@boutique.vn
//!
//! # Compare imported provinces (or one province's districts) with the
//! # public provinces API
//! boutique-cli provinces
//! boutique-cli provinces --code 79
//! ```
//!
//! # Environment Variables
//!
//! - `BOUTIQUE_API_URL` - Commerce API root (required)
//! - `BOUTIQUE_API_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `BOUTIQUE_ADMIN_PASSWORD` - Password for `login` and `statuses`
//! - `PROVINCES_API_URL` - Public provinces API (default: provinces.open-api.vn)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "boutique-cli")]
#[command(author, version, about = "Boutique operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the commerce API is reachable
    Health,
    /// Verify staff credentials and print the account's roles
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// List order statuses with their display messages
    Statuses {
        /// Account to sign in with
        #[arg(short, long)]
        email: String,
    },
    /// Compare backend locations with the public provinces API
    Provinces {
        /// Province code; compares that province's districts instead
        #[arg(short, long)]
        code: Option<i32>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let api = commands::api_client()?;
    match cli.command {
        Commands::Health => commands::health::run(&api).await,
        Commands::Login { email } => commands::login::run(&api, &email).await,
        Commands::Statuses { email } => commands::statuses::run(&api, &email).await,
        Commands::Provinces { code } => commands::provinces::run(&api, code).await,
    }
}
