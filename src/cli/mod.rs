pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pricefloor")]
#[command(about = "Finds the lowest current price across candidate product links", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/pricefloor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price every product group in the spreadsheet and write the results
    Run {
        /// Use synthetic quotes and the test sheet
        #[arg(long)]
        test: bool,
    },
    /// Resolve individual links and print their prices
    Resolve {
        /// Product links to price
        #[arg(required = true)]
        links: Vec<String>,

        /// Use synthetic quotes instead of the product API
        #[arg(long)]
        test: bool,
    },
    /// Store sheet authorization from a refresh token
    Authorize {
        /// OAuth refresh token for the spreadsheet scope
        #[arg(long)]
        refresh_token: String,
    },
}
