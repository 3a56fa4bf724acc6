//! CLI tool for zipfs archive operations.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

/// Remote ZIP archive as a mutable virtual filesystem
#[derive(Parser)]
#[command(name = "zipfs")]
#[command(author, version, about = "Edit ZIP archive objects entry by entry", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Bucket directory backing the object store
    #[arg(long, short = 'b', env = "ZIPFS_BUCKET", global = true, default_value = ".zipfs-bucket")]
    bucket: PathBuf,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a ZIP file as a new archive object, printing its key
    Upload {
        /// ZIP file to upload
        file: PathBuf,
    },

    /// List entry paths, optionally filtered by prefix
    Ls {
        /// Archive object key
        key: String,

        /// Only list paths starting with this prefix
        #[arg(long, short = 'p', default_value = "")]
        prefix: String,
    },

    /// Print one entry's content
    Cat {
        /// Archive object key
        key: String,

        /// Entry path inside the archive
        path: String,
    },

    /// Overwrite (or create) an entry
    Write {
        /// Archive object key
        key: String,

        /// Entry path inside the archive
        path: String,

        /// New entry content
        content: String,
    },

    /// Append to an entry (creating it if absent)
    Append {
        /// Archive object key
        key: String,

        /// Entry path inside the archive
        path: String,

        /// Content to append
        content: String,
    },

    /// Remove an entry
    Rm {
        /// Archive object key
        key: String,

        /// Entry path inside the archive
        path: String,
    },

    /// Create an entry only if it does not exist yet
    Create {
        /// Archive object key
        key: String,

        /// Entry path inside the archive
        path: String,

        /// Initial content
        #[arg(default_value = "")]
        content: String,
    },

    /// Apply a JSON batch of edit instructions
    Apply {
        /// Archive object key
        key: String,

        /// Instruction batch as JSON, or @file to read it from a file
        instructions: String,
    },

    /// Extract every entry into a local directory
    Extract {
        /// Archive object key
        key: String,

        /// Destination directory
        dest: PathBuf,
    },
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text for people
    Human,
    /// One JSON document on stdout
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
