//! Dashboard configuration
//!
//! Loaded from a YAML file with a top-level `dashboard` key. The core only
//! consumes this configuration; it defines no flags of its own.

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::catalog::ReportDefinition;
use crate::core::reporting::DbReportKind;
use crate::yaml::{parse_yaml, parse_yaml_file, YamlError};

/// Environment variable naming a GitHub Enterprise API endpoint
pub const API_ENDPOINT_ENV: &str = "OCTOKIT_API_ENDPOINT";

const DEFAULT_GITHUB_URL: &str = "https://github.com";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("Unsupported database engine '{engine}'")]
    #[diagnostic(
        code(dashboard::config::engine),
        help("Set `database.engine` to `sqlite`")
    )]
    UnsupportedEngine { engine: String },

    #[error("Unknown database report '{key}'")]
    #[diagnostic(
        code(dashboard::config::db_report),
        help("Known reports: AverageIssueOpenedDbReporter, NoIssueCommentsDbReporter, NoPrCommentsDbReporter")
    )]
    UnknownDbReport { key: String },

    #[error("No organizations or logins configured")]
    #[diagnostic(
        code(dashboard::config::no_owners),
        help("List at least one entry under `organizations` or `logins`")
    )]
    NoOwners,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    dashboard: RawDashboard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawDashboard {
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default)]
    logins: Vec<String>,
    #[serde(default)]
    private_access: Vec<String>,
    data_directory: PathBuf,
    #[serde(default)]
    github_url: Option<String>,
    #[serde(default)]
    database: DatabaseConfig,
    #[serde(default)]
    reports: Vec<ReportDefinition>,
    #[serde(default)]
    db_reports: Vec<String>,
}

/// Location of the synced row store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub engine: String,
    pub filename: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: "sqlite".to_string(),
            filename: "gh-sync.db".to_string(),
        }
    }
}

/// A named composite of several owner documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Logins,
    Organizations,
    Accounts,
}

impl Grouping {
    /// Groupings in the order they are merged
    pub const ALL: [Grouping; 3] = [Grouping::Logins, Grouping::Organizations, Grouping::Accounts];

    /// Configuration attribute selecting the identifier list
    pub fn key(&self) -> &'static str {
        match self {
            Grouping::Logins => "logins",
            Grouping::Organizations => "organizations",
            Grouping::Accounts => "organizations+logins",
        }
    }

    /// Output document name
    pub fn document_name(&self) -> &'static str {
        match self {
            Grouping::Logins => "AllLogins",
            Grouping::Organizations => "AllOrgs",
            Grouping::Accounts => "AllAccounts",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Grouping::Logins => "All Logins",
            Grouping::Organizations => "All Organizations",
            Grouping::Accounts => "All Accounts",
        }
    }
}

/// Where externally produced report fragments are found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentCategory {
    Review,
    DbReport,
}

impl FragmentCategory {
    /// Categories in splice order
    pub const ALL: [FragmentCategory; 2] = [FragmentCategory::Review, FragmentCategory::DbReport];

    pub fn dir_name(&self) -> &'static str {
        match self {
            FragmentCategory::Review => "review-xml",
            FragmentCategory::DbReport => "db-report-xml",
        }
    }
}

/// Validated dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub organizations: Vec<String>,
    pub logins: Vec<String>,
    pub private_access: Vec<String>,
    /// A relative `data-directory` is joined onto the config file's directory
    pub data_directory: PathBuf,
    pub github_url: Option<String>,
    pub database: DatabaseConfig,
    pub reports: Vec<ReportDefinition>,
    pub db_reports: Vec<DbReportKind>,
}

impl Config {
    /// Load and validate a configuration file.
    ///
    /// A relative `data-directory` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = parse_yaml_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_raw(file.dashboard, base_dir)
    }

    /// Parse configuration text, resolving relative paths against `base_dir`
    pub fn from_yaml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = parse_yaml(content, "dashboard config")?;
        Self::from_raw(file.dashboard, base_dir)
    }

    fn from_raw(raw: RawDashboard, base_dir: &Path) -> Result<Self, ConfigError> {
        if !matches!(raw.database.engine.as_str(), "sqlite" | "sqlite3") {
            return Err(ConfigError::UnsupportedEngine {
                engine: raw.database.engine,
            });
        }
        if raw.organizations.is_empty() && raw.logins.is_empty() {
            return Err(ConfigError::NoOwners);
        }

        let db_reports = raw
            .db_reports
            .iter()
            .map(|key| {
                key.parse::<DbReportKind>()
                    .map_err(|_| ConfigError::UnknownDbReport { key: key.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data_directory = if raw.data_directory.is_absolute() {
            raw.data_directory
        } else {
            base_dir.join(raw.data_directory)
        };

        Ok(Self {
            organizations: raw.organizations,
            logins: raw.logins,
            private_access: raw.private_access,
            data_directory,
            github_url: raw.github_url,
            database: raw.database,
            reports: raw.reports,
            db_reports,
        })
    }

    /// Organizations followed by logins
    pub fn owners(&self) -> Vec<String> {
        self.organizations
            .iter()
            .chain(self.logins.iter())
            .cloned()
            .collect()
    }

    /// Identifier list selected by a grouping
    pub fn grouping(&self, grouping: Grouping) -> Vec<String> {
        match grouping {
            Grouping::Logins => self.logins.clone(),
            Grouping::Organizations => self.organizations.clone(),
            Grouping::Accounts => self.owners(),
        }
    }

    pub fn is_login(&self, id: &str) -> bool {
        self.logins.iter().any(|l| l == id)
    }

    pub fn includes_private(&self, id: &str) -> bool {
        self.private_access.iter().any(|o| o == id)
    }

    /// Web URL of the GitHub instance the data was synced from
    pub fn github_url(&self) -> String {
        if let Some(url) = &self.github_url {
            return url.trim_end_matches('/').to_string();
        }
        match std::env::var(API_ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => web_url_from_api(&endpoint),
            _ => DEFAULT_GITHUB_URL.to_string(),
        }
    }

    /// Directory holding generated documents
    pub fn dash_dir(&self) -> PathBuf {
        self.data_directory.join("dash-xml")
    }

    pub fn fragment_path(&self, category: FragmentCategory, org: &str) -> PathBuf {
        self.data_directory
            .join(category.dir_name())
            .join(format!("{}.xml", org))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join("db").join(&self.database.filename)
    }
}

// https://github.example.com/api/v3/ -> https://github.example.com
fn web_url_from_api(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/api/v3")
        .unwrap_or(trimmed)
        .to_string()
}
