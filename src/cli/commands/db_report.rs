//! `dashboard db-report` command - database-backed report fragments

use miette::Result;

use crate::cli::helpers::{load_config, open_source, phase_heading, pipeline};
use crate::cli::output::print_summary;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let source = open_source(&config)?;
    phase_heading(global, "db-report");
    let outcomes = pipeline(&config).db_reports(&source);
    print_summary(&outcomes, global)
}
