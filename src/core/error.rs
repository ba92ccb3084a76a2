//! Error taxonomy for dashboard generation
//!
//! Failures are scoped to the unit they happen in: a query failure skips one
//! organization, a malformed fragment skips one fragment. Only an unreadable
//! base document for a merge or team phase stops that phase.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::source::SourceError;
use crate::xml::XmlError;

#[derive(Debug, Error, Diagnostic)]
pub enum DashboardError {
    #[error("Query failed for {org}: {source}")]
    #[diagnostic(
        code(dashboard::query),
        help("The organization is skipped; re-run the sync phase for {org}")
    )]
    Query {
        org: String,
        #[source]
        source: SourceError,
    },

    #[error("Malformed document {path}: {reason}")]
    #[diagnostic(code(dashboard::malformed_document))]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(code(dashboard::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl DashboardError {
    pub fn query(org: impl Into<String>, source: SourceError) -> Self {
        Self::Query {
            org: org.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
