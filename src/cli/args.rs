//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Generate typed Rust SNMP drivers from MIB object dumps
#[derive(Parser, Debug)]
#[command(name = "mibgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -d -d debug, -d -d -d trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project config file (default: ./mibgen.toml)
    #[arg(short = 'c', long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for the configured MIB source.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read the JSON dump from a file instead of running the dump command
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Vendor MIB file (overrides mib.path)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub mib: Option<PathBuf>,

    /// Module the dump must declare (overrides mib.module)
    #[arg(short, long)]
    pub module: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the driver source
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (overrides generator.output)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Print to stdout even if an output file is configured
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Verify a generated file is up to date
    Check {
        /// Generated file to compare (default: generator.output)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show the reconciled OID tree
    Tree {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Create a config template
    Init {
        /// Write the global config instead of ./mibgen.toml
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
