//! d3data CLI
//!
//! Command-line tools for inspecting lock files and registries.
//!
//! # Commands
//!
//! - `lock-status` - Show who holds a directory lock
//! - `list` - List files matching a pattern
//! - `temp-name` - Print an unused temporary file name
//! - `registry-dump` - Dump the keys and records of a registry

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// d3data command-line tools.
#[derive(Parser)]
#[command(name = "d3data")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the lock state of a directory
    LockStatus {
        /// Locked directory
        dir: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List regular files whose names match a pattern
    List {
        /// Directory to search
        dir: PathBuf,

        /// Regular expression matched against the whole file name
        #[arg(short, long, conflicts_with = "glob", required_unless_present = "glob")]
        pattern: Option<String>,

        /// Shell-style wildcard pattern
        #[arg(short, long)]
        glob: Option<String>,
    },

    /// Print an unused temporary file name
    TempName {
        /// Directory for the file
        dir: PathBuf,

        /// Prefix of the generated name
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Number of random characters
        #[arg(short, long, default_value_t = d3data_core::TEMP_NAME_RANDOM_LEN)]
        length: usize,
    },

    /// Dump the keys and records of a registry
    RegistryDump {
        /// Registry file (defaults to the preference directory registry)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::LockStatus { dir, format } => {
            commands::lock::status(&dir, &format)?;
        }
        Commands::List { dir, pattern, glob } => {
            commands::list::run(&dir, pattern.as_deref(), glob.as_deref())?;
        }
        Commands::TempName {
            dir,
            prefix,
            length,
        } => {
            commands::temp_name::run(&dir, &prefix, length)?;
        }
        Commands::RegistryDump { file, format } => {
            commands::registry_dump::run(file.as_deref(), &format)?;
        }
        Commands::Version => {
            println!("d3data CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("d3data Core v{}", d3data_core::VERSION);
            if let Some(dir) = d3data_core::executable_base_directory() {
                println!("Installed in {}", dir.display());
            }
        }
    }

    Ok(())
}
