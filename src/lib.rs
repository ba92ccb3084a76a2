//! Org dashboard: per-organization GitHub dashboard documents
//!
//! Builds one XML document per configured organization or login from a
//! synced SQLite database, merges them into composite views and slices them
//! per team.

pub mod cli;
pub mod core;
pub mod xml;
pub mod yaml;
