//! CLI command implementations

pub mod completions;
pub mod db_report;
pub mod init_db;
pub mod merge;
pub mod run;
pub mod teams;
pub mod xml;
