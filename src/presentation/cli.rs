//! CLI Argument Parsing
//!
//! Global flags (--json, --verbose, --config) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Casilla - fills official tax-form PDFs from structured data
#[derive(Parser, Debug)]
#[command(name = "casilla")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON run events and a JSON report
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./casilla.toml, then the user config)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill a template PDF with one data tree
    Fill {
        /// Input data tree (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Mapping model (JSON or YAML)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Data structure (JSON or YAML)
        #[arg(short, long)]
        structure: PathBuf,

        /// Template PDF
        #[arg(short, long)]
        template: PathBuf,

        /// Output file (default: <output dir>/mod<model>_<timestamp>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model code used in file names and metadata
        #[arg(long)]
        model: Option<String>,

        /// Leave content streams uncompressed
        #[arg(long)]
        no_compress: bool,
    },

    /// Run every stage except rendering
    Check {
        /// Input data tree (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Mapping model (JSON or YAML)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Data structure (JSON or YAML)
        #[arg(short, long)]
        structure: PathBuf,

        /// Print the resolved field table
        #[arg(long)]
        fields: bool,
    },

    /// Fill every job listed in a manifest
    Batch {
        /// Batch manifest (JSON)
        #[arg(long)]
        manifest: PathBuf,

        /// Worker threads (overrides batch.max_workers)
        #[arg(long)]
        max_workers: Option<usize>,
    },
}
