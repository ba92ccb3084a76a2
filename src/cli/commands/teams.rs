//! `dashboard teams` command - per-team documents

use miette::Result;

use crate::cli::helpers::{load_config, phase_heading, pipeline};
use crate::cli::output::print_summary;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    phase_heading(global, "teams");
    let outcomes = pipeline(&config).teams()?;
    print_summary(&outcomes, global)
}
