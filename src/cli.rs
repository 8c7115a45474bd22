use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{RecordSettings, Settings};

#[derive(Parser)]
#[command(name = "quotemerge")]
#[command(about = "Merge a record's PDF attachment with a static PDF, with MCP server support")]
#[command(version)]
pub struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp {
        #[command(flatten)]
        settings: Settings,
    },

    /// Fetch a record's PDF, append the static PDF, and write the result
    Merge {
        /// Record whose attachment is merged
        #[arg(short, long)]
        record_id: String,

        #[command(flatten)]
        settings: Settings,
    },

    /// Fetch and decode a record's PDF attachment only
    Fetch {
        /// Record whose attachment is fetched
        #[arg(short, long)]
        record_id: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        record: RecordSettings,
    },

    /// Append the pages of one local PDF after another's
    Combine {
        /// PDF whose pages come first
        first: PathBuf,

        /// PDF whose pages come second
        second: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write uncompressed streams
        #[arg(long)]
        no_compress: bool,
    },
}
