//! Core module - document model, builders and generation phases

pub mod age;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod node;
pub mod pipeline;
pub mod reporting;
pub mod source;
pub mod splice;
pub mod store;
pub mod teams;

pub use age::{AgeBucket, AgeHistogram};
pub use builder::OrgDocumentBuilder;
pub use catalog::{Column, ColumnType, ReportClass, ReportDefinition};
pub use config::{Config, ConfigError, FragmentCategory, Grouping};
pub use document::Document;
pub use error::DashboardError;
pub use merge::merge_documents;
pub use metadata::{build_header, MetadataHeader, RunMetrics};
pub use node::Node;
pub use pipeline::{Outcome, Phase, Pipeline, UnitOutcome};
pub use reporting::DbReportKind;
pub use source::{RowSource, SourceError, SqliteSource};
pub use splice::splice_fragments;
pub use store::DocumentStore;
pub use teams::{extract_team_slices, TeamKey};
