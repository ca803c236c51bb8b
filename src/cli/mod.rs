//! Command-line interface for lab-reconcile.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **validate**: Check lab results against the reference catalog
//! - **reconcile**: Validate, apply reviewer corrections, and save
//! - **lookup**: Show how a single test name resolves in the catalog
//! - **serve**: Start the JSON API
//!
//! ## Usage
//!
//! ```text
//! # Validate a results file
//! lab-reconcile validate results.json catalog.csv
//!
//! # JSON output for scripting
//! lab-reconcile validate results.json catalog.csv --format json
//!
//! # Correct a status and set one date for every test
//! lab-reconcile reconcile results.json catalog.csv \
//!     --status Glucose=inRange --apply-date 2024-06-01
//!
//! # Start the API
//! lab-reconcile serve --port 8080
//! ```

use clap::{Parser, Subcommand};

pub mod lookup;
pub mod reconcile;
pub mod validate;

#[derive(Parser)]
#[command(name = "lab-reconcile")]
#[command(version)]
#[command(about = "Validate lab results against a reference catalog and reconcile corrections")]
#[command(
    long_about = "lab-reconcile checks lab test results against a reference catalog of known tests.\n\nIt reports:\n- Results with a null or unknown status\n- Test names missing from the catalog, with suggested catalog updates\n- LOINC codes that disagree with the catalog\n- Units that need manual conversion\n\nReviewer corrections to status, unit and date are merged back into the results and saved as a new file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate lab results against the catalog
    Validate(validate::ValidateArgs),

    /// Apply status, unit and date corrections and save the results
    Reconcile(reconcile::ReconcileArgs),

    /// Look up a single test name in the catalog
    Lookup(lookup::LookupArgs),

    /// Start the JSON API server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
