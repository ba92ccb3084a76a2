//! XML error types

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing XML documents
#[derive(Debug, Error, Diagnostic)]
pub enum XmlError {
    #[error("Malformed XML in {name} at byte {position}: {source}")]
    #[diagnostic(
        code(dashboard::xml::syntax),
        help("The file may have been truncated by an interrupted run; regenerate it")
    )]
    Syntax {
        name: String,
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Unclosed element <{tag}> at end of {name}")]
    #[diagnostic(code(dashboard::xml::unclosed))]
    Unclosed { name: String, tag: String },

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(dashboard::xml::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    #[diagnostic(code(dashboard::xml::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML serialization failed: {0}")]
    #[diagnostic(code(dashboard::xml::emit))]
    Emit(#[from] quick_xml::Error),

    #[error(transparent)]
    #[diagnostic(code(dashboard::xml::io))]
    Io(#[from] std::io::Error),
}
