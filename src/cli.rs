//! CLI command definitions and subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::query::QueryField;

/// Plumchecker - parse and query leaked password DB's
#[derive(Parser)]
#[command(name = "plumchecker", about = "Parse and query leaked password DB's", version)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH", help = "Path to the config file (default ./config.json)")]
    pub config: Option<PathBuf>,

    /// Log threshold: 1=debug, 2=info, 3=warn, 4=error
    #[arg(
        short = 'v',
        long,
        global = true,
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=4),
        help = "Log threshold: 1=debug, 2=info, 3=warn, 4=error"
    )]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add leaked data to the plumchecker database
    Add {
        /// Path to a folder, a text file or an archive (zip/tar/gz)
        #[arg(default_value = "./", value_name = "PATH")]
        path: PathBuf,

        /// Look for files in folders recursively
        #[arg(long, alias = "rf")]
        recursive_folders: bool,

        /// Look for files in archives recursively
        #[arg(long, alias = "ra")]
        recursive_archives: bool,
    },

    /// Query leaked data from the plumchecker database
    Query {
        /// Record field to match the keyword against
        #[arg(short, long, value_enum, default_value = "email")]
        field: QueryField,

        /// Fetch every page instead of a single one
        #[arg(short, long)]
        all: bool,

        /// Page to fetch (single-page mode)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Search keyword; multiple tokens are joined with single spaces
        #[arg(required = true, num_args = 1.., value_name = "KEYWORD")]
        keyword: Vec<String>,
    },
}
