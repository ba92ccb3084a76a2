//! Shared helper functions for CLI commands

use chrono::Utc;
use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::metadata::RunMetrics;
use crate::core::pipeline::Pipeline;
use crate::core::source::SqliteSource;

/// Load the configuration named by `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    tracing::debug!(path = %global.config.display(), "loading configuration");
    Ok(Config::load(&global.config)?)
}

/// Open the sync database the configuration points at
pub fn open_source(config: &Config) -> Result<SqliteSource> {
    let path = config.database_path();
    SqliteSource::open(&path).map_err(|e| {
        miette::miette!(
            help = "Run `dashboard init-db` or the GitHub sync first",
            "Cannot open {}: {}",
            path.display(),
            e
        )
    })
}

/// Pipeline for a run starting now
pub fn pipeline(config: &Config) -> Pipeline<'_> {
    let now = Utc::now();
    Pipeline::new(config, RunMetrics::new(now, now), now)
}

/// Print a phase heading unless quiet
pub fn phase_heading(global: &GlobalOpts, phase: &str) {
    if !global.quiet {
        eprintln!("{} {}", style("→").cyan(), style(phase).bold());
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
