//! Rosella CLI - Data seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the data file with the default profile, article, and a demo
//! # ambassador page
//! rosella-cli seed -f data.json
//!
//! # Create admin user
//! rosella-cli admin create -e admin@example.com -n "Admin Name"
//! ```
//!
//! # Commands
//!
//! - `seed` - Seed the data file with starter content
//! - `admin create` - Create admin users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rosella-cli")]
#[command(author, version, about = "Rosella CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the data file with starter content
    Seed {
        /// Data file to seed (defaults to `ROSELLA_DATA_FILE`)
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Data file to write to (defaults to `ROSELLA_DATA_FILE`)
        #[arg(short, long)]
        file: Option<String>,
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
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name, file } => {
                commands::admin::create_user(&email, &name, file.as_deref()).await?;
            }
        },
    }
    Ok(())
}
