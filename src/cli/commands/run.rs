//! `dashboard run` command - every phase in order

use miette::Result;

use crate::cli::helpers::{load_config, open_source, phase_heading, pipeline};
use crate::cli::output::print_summary;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let source = open_source(&config)?;
    let pipeline = pipeline(&config);

    phase_heading(global, "db-report");
    let mut outcomes = pipeline.db_reports(&source);

    phase_heading(global, "xml");
    outcomes.extend(pipeline.org_documents(&source));

    phase_heading(global, "merge");
    outcomes.extend(pipeline.merge());

    phase_heading(global, "teams");
    outcomes.extend(pipeline.teams()?);

    print_summary(&outcomes, global)
}
