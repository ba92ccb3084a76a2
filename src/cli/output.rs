//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::truncate_str;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::pipeline::{Outcome, UnitOutcome};

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Json
            }
        }
        other => other,
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "PHASE")]
    phase: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl From<&UnitOutcome> for SummaryRow {
    fn from(outcome: &UnitOutcome) -> Self {
        let (status, detail) = match &outcome.outcome {
            Outcome::Written { path } => ("written", path.display().to_string()),
            Outcome::Skipped { reason } => ("skipped", reason.clone()),
            Outcome::Failed { error } => ("failed", truncate_str(error, 60)),
        };
        Self {
            phase: outcome.phase.to_string(),
            unit: outcome.unit.clone(),
            status: status.to_string(),
            detail,
        }
    }
}

/// Print the per-unit outcomes of a run
pub fn print_summary(outcomes: &[UnitOutcome], global: &GlobalOpts) -> Result<()> {
    match effective_format(global.output) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcomes).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            if global.quiet {
                return Ok(());
            }
            if outcomes.is_empty() {
                println!("Nothing to do.");
                return Ok(());
            }
            let rows: Vec<SummaryRow> = outcomes.iter().map(SummaryRow::from).collect();
            println!("{}", Table::new(rows).with(Style::sharp()));

            let failed = outcomes.iter().filter(|o| o.outcome.is_failure()).count();
            if failed > 0 {
                println!(
                    "{} {} unit(s) failed, see diagnostics above",
                    style("!").yellow().bold(),
                    failed
                );
            } else {
                println!("{} Done", style("✓").green());
            }
        }
    }
    Ok(())
}
