//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::init_db::InitDbArgs;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(author, version, about = "Generate GitHub organization dashboard documents")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Dashboard configuration file
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "DASHBOARD_CONFIG",
        default_value = "dashboard.yaml"
    )]
    pub config: PathBuf,

    /// Suppress progress output and all but error diagnostics
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// More diagnostics (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Summary format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,
}

impl GlobalOpts {
    /// Default log filter when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every phase: db-report, xml, merge, teams
    Run,

    /// Build one document per organization and login
    Xml,

    /// Merge owner documents into AllOrgs, AllLogins and AllAccounts
    Merge,

    /// Slice the merged document into one document per team
    Teams,

    /// Run the enabled database reports into report fragments
    DbReport,

    /// Create an empty sync database with the current schema
    InitDb(InitDbArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, JSON otherwise
    #[default]
    Auto,
    Table,
    Json,
}
