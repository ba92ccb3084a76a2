//! `dashboard init-db` command - create an empty sync database

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::source::SqliteSource;

#[derive(clap::Args, Debug)]
pub struct InitDbArgs {
    /// Database file (defaults to the configured location)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitDbArgs, global: &GlobalOpts) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => load_config(global)?.database_path(),
    };

    if path.exists() {
        return Err(miette::miette!(
            help = "Remove the file first if you really want a fresh database",
            "{} already exists",
            path.display()
        ));
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).into_diagnostic()?;
    }

    SqliteSource::create(&path)?;
    tracing::info!(path = %path.display(), "initialized sync database");

    if !global.quiet {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
