//! `dashboard xml` command - one document per organization and login

use miette::Result;

use crate::cli::helpers::{load_config, open_source, phase_heading, pipeline};
use crate::cli::output::print_summary;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let source = open_source(&config)?;
    phase_heading(global, "xml");
    let outcomes = pipeline(&config).org_documents(&source);
    print_summary(&outcomes, global)
}
