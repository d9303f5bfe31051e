//! Velvet Fig CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! vf-cli migrate
//!
//! # Seed the catalog with demo products
//! vf-cli seed
//!
//! # Create an admin account
//! vf-cli admin create -e admin@example.com -f Ada -l Lovelace
//!
//! # Promote an existing account to admin
//! vf-cli admin promote -e someone@example.com
//!
//! # Backfill image_urls from the legacy image_url column
//! vf-cli backfill-images
//!
//! # Delete used/expired sign-in codes and tokens
//! vf-cli cleanup
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vf-cli")]
#[command(author, version, about = "Velvet Fig CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo products
    Seed {
        /// Insert even when the catalog is not empty
        #[arg(long)]
        force: bool,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Backfill the products.image_urls column from the legacy image_url column
    BackfillImages,
    /// Delete used/expired sign-in codes, verification tokens, and bearer tokens
    Cleanup,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Given name
        #[arg(short, long, default_value = "")]
        first_name: String,

        /// Family name
        #[arg(short, long, default_value = "")]
        last_name: String,
    },
    /// Promote an existing account to admin
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => commands::seed::run(force).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                first_name,
                last_name,
            } => {
                commands::admin::create(&email, &first_name, &last_name).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
        Commands::BackfillImages => commands::backfill_images::execute().await?,
        Commands::Cleanup => commands::cleanup::run().await?,
    }
    Ok(())
}
