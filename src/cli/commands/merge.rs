//! `dashboard merge` command - composite documents
//!
//! Reads only previously generated owner documents; no database needed.

use miette::Result;

use crate::cli::helpers::{load_config, phase_heading, pipeline};
use crate::cli::output::print_summary;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    phase_heading(global, "merge");
    let outcomes = pipeline(&config).merge();
    print_summary(&outcomes, global)
}
