//! Storeroom CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! storeroom-cli migrate
//!
//! # Create a store for an identity-provider subject
//! storeroom-cli store create --owner user_2abc --name "Corner Shop"
//!
//! # Print dashboard aggregates for a store
//! storeroom-cli report revenue --store 0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69
//! ```
//!
//! # Environment Variables
//!
//! - `STOREROOM_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `STRIPE_CURRENCY` - Currency for report amounts (default: usd)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use storeroom_core::{CurrencyCode, StoreId};

mod commands;

#[derive(Parser)]
#[command(name = "storeroom-cli")]
#[command(author, version, about = "Storeroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Print store reports
    Report {
        #[command(subcommand)]
        report: ReportKind,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Create a store without going through the console
    Create {
        /// Identity-provider subject that will own the store
        #[arg(short, long)]
        owner: String,

        /// Store name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Revenue, sales, stock and this year's monthly revenue
    Revenue {
        #[arg(short, long)]
        store: StoreId,

        /// Currency for formatted amounts
        #[arg(long, env = "STRIPE_CURRENCY", default_value = "usd")]
        currency: CurrencyCode,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Store { action } => match action {
            StoreAction::Create { owner, name } => {
                commands::store::create(&owner, &name).await?;
            }
        },
        Commands::Report { report } => match report {
            ReportKind::Revenue { store, currency } => {
                commands::report::revenue(store, currency).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_currency_is_parsed() {
        let cli = Cli::try_parse_from([
            "storeroom-cli",
            "report",
            "revenue",
            "--store",
            "0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69",
            "--currency",
            "gbp",
        ])
        .unwrap();
        let Commands::Report {
            report: ReportKind::Revenue { currency, .. },
        } = cli.command
        else {
            panic!("expected a revenue report");
        };
        assert_eq!(currency, CurrencyCode::GBP);

        assert!(
            Cli::try_parse_from([
                "storeroom-cli",
                "report",
                "revenue",
                "--store",
                "0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69",
                "--currency",
                "btc",
            ])
            .is_err()
        );
    }
}
