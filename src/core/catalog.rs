//! Report catalog types
//!
//! A report definition describes one report that contributes entries to the
//! `reports` section of organization documents. Externally produced reports
//! are declared in the configuration; database-backed reports are built in
//! and also declare their output columns.

use serde::{Deserialize, Serialize};

/// Which part of the dashboard a report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportClass {
    UserReport,
    RepoReport,
    IssueReport,
}

impl ReportClass {
    /// Classes in the order their catalogs appear in the metadata header
    pub const ALL: [ReportClass; 3] = [
        ReportClass::UserReport,
        ReportClass::RepoReport,
        ReportClass::IssueReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportClass::UserReport => "user-report",
            ReportClass::RepoReport => "repo-report",
            ReportClass::IssueReport => "issue-report",
        }
    }

    /// Tag of the catalog element listing reports of this class
    pub fn catalog_tag(&self) -> &'static str {
        match self {
            ReportClass::UserReport => "user-reports",
            ReportClass::RepoReport => "repo-reports",
            ReportClass::IssueReport => "issue-reports",
        }
    }
}

impl std::fmt::Display for ReportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user-report" => Ok(ReportClass::UserReport),
            "repo-report" => Ok(ReportClass::RepoReport),
            "issue-report" => Ok(ReportClass::IssueReport),
            _ => Err(format!("Unknown report class: {}", s)),
        }
    }
}

/// How the renderer should present a report column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Date,
    Url,
    Labels,
    #[default]
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Url => "url",
            ColumnType::Labels => "labels",
            ColumnType::Text => "text",
        }
    }
}

/// A declared output column of a database-backed report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// One entry of the report catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Stable identifier, also used as the `type` attribute of report entries
    pub key: String,

    pub class: ReportClass,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Declared columns; only database-backed reports have them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
}
