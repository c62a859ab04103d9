//! Storefront CLI - demo data and snapshot tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed demo data and print the row counts
//! storefront seed
//!
//! # Seed demo data and print the full snapshot
//! storefront dump > storefront.json
//!
//! # Restore a snapshot file, enforcing every constraint
//! storefront check storefront.json
//! ```
//!
//! Settings come from the environment (or a `.env` file): `STOREFRONT_LOG`,
//! `STOREFRONT_LOG_FORMAT` and `STOREFRONT_DEMO_PRODUCTS`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use storefront_infra::StoreConfig;

mod commands;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about = "Storefront database tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed demo data and print the row count of every table
    Seed {
        /// Products per collection (overrides STOREFRONT_DEMO_PRODUCTS)
        #[arg(short, long)]
        products: Option<u32>,
    },
    /// Seed demo data and print it as a JSON snapshot
    Dump {
        /// Products per collection (overrides STOREFRONT_DEMO_PRODUCTS)
        #[arg(short, long)]
        products: Option<u32>,
    },
    /// Restore a JSON snapshot file and report whether it is consistent
    Check {
        /// Snapshot file written by `dump`
        path: PathBuf,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    storefront_observability::init(&config.log_filter, config.log_format);

    if let Err(e) = run(cli, &config) {
        tracing::error!("command failed: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &StoreConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Seed { products } => {
            let db = commands::seed::demo_database(products.unwrap_or(config.demo_products))
                .context("seeding demo data")?;
            let counts = db.counts()?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        Commands::Dump { products } => {
            let db = commands::seed::demo_database(products.unwrap_or(config.demo_products))
                .context("seeding demo data")?;
            println!("{}", commands::snapshot::dump(&db)?);
        }
        Commands::Check { path } => {
            let counts = commands::snapshot::check(&path)?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }
    Ok(())
}
