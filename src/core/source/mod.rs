//! Row source - the query surface over synced GitHub data
//!
//! The document builders only see this trait. Each method is one query
//! parameterized by organization (and sometimes repository) and returns rows
//! in a stable order. `SqliteSource` is the bundled implementation.

mod serialize;
mod sqlite;

pub use sqlite::SqliteSource;

use miette::Diagnostic;
use std::collections::HashSet;
use thiserror::Error;

/// Errors from the row source
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("Database error: {0}")]
    #[diagnostic(code(dashboard::source::database))]
    Database(#[from] rusqlite::Error),

    #[error("{what} not found")]
    #[diagnostic(
        code(dashboard::source::not_found),
        help("Check that the sync has run for every configured organization and login")
    )]
    NotFound { what: String },

    #[error("Schema unavailable: {0}")]
    #[diagnostic(code(dashboard::source::schema))]
    Schema(String),
}

/// Issues and pull requests share one item store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    /// SQL predicate selecting this kind from the `items` table
    pub(crate) fn predicate(&self) -> &'static str {
        match self {
            ItemKind::Issue => "pull_request_url IS NULL",
            ItemKind::PullRequest => "pull_request_url IS NOT NULL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Open,
    Closed,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ItemState::Open),
            "closed" => Ok(ItemState::Closed),
            _ => Err(format!("Unknown item state: {}", s)),
        }
    }
}

/// Which timestamp a yearly count groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Opened,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRow {
    pub login: String,
    pub avatar_url: String,
    pub description: String,
    pub blog: String,
    pub name: String,
    pub location: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRow {
    pub id: i64,
    pub name: String,
    pub homepage: Option<String>,
    pub private: bool,
    pub fork: bool,
    pub has_wiki: bool,
    pub language: Option<String>,
    pub stars: i64,
    pub watchers: i64,
    pub forks: i64,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,
    pub size: i64,
    pub description: Option<String>,
}

/// An issue or pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: i64,
    pub number: i64,
    pub org: String,
    pub repo: String,
    pub user_login: String,
    pub state: ItemState,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub comment_count: i64,
    pub pull_request_url: Option<String>,
}

impl ItemRow {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request_url.is_some()
    }

    pub fn kind(&self) -> ItemKind {
        if self.is_pull_request() {
            ItemKind::PullRequest
        } else {
            ItemKind::Issue
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub url: String,
    pub name: String,
    pub color: String,
}

/// File change totals of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrChanges {
    pub file_count: i64,
    pub additions: i64,
    pub deletions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCount {
    pub year: String,
    pub count: i64,
}

/// Creation and close timestamps of a closed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSpan {
    pub created_at: String,
    pub closed_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRow {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub published_at: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub login: String,
    pub avatar_url: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub two_factor_disabled: bool,
    /// Email of the mapped internal identity, when one is known
    pub internal_email: Option<String>,
}

impl MemberRow {
    /// Internal login: the local part of the internal email
    pub fn internal_login(&self) -> Option<&str> {
        self.internal_email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|login| !login.is_empty())
    }
}

/// Query surface required to build organization documents and DB reports
pub trait RowSource {
    /// Identity of one organization or login; missing rows are `NotFound`
    fn organization(&self, org: &str) -> Result<OrgRow, SourceError>;

    fn teams(&self, org: &str) -> Result<Vec<TeamRow>, SourceError>;

    /// Names of non-fork repositories a team can access
    fn team_repositories(&self, team_id: i64) -> Result<Vec<String>, SourceError>;

    fn team_members(&self, team_id: i64) -> Result<Vec<String>, SourceError>;

    fn repositories(&self, org: &str) -> Result<Vec<RepoRow>, SourceError>;

    fn item_count(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
        state: ItemState,
    ) -> Result<i64, SourceError>;

    fn commit_count(&self, org: &str, repo: &str) -> Result<i64, SourceError>;

    fn collaborators(&self, repo_id: i64) -> Result<Vec<String>, SourceError>;

    /// Open issues and pull requests of one repository
    fn open_items(&self, org: &str, repo: &str) -> Result<Vec<ItemRow>, SourceError>;

    /// Open issues and pull requests across an organization
    fn open_items_in_org(&self, org: &str) -> Result<Vec<ItemRow>, SourceError>;

    fn pull_request_changes(&self, item_id: i64) -> Result<PrChanges, SourceError>;

    fn labels(&self, item_id: i64) -> Result<Vec<LabelRow>, SourceError>;

    /// Counts per calendar year, most recent year first
    fn yearly_counts(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
        milestone: Milestone,
    ) -> Result<Vec<YearCount>, SourceError>;

    fn closed_spans(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
    ) -> Result<Vec<ClosedSpan>, SourceError>;

    /// Author login of every item, one entry per item
    fn item_authors(&self, org: &str, repo: &str, kind: ItemKind)
        -> Result<Vec<String>, SourceError>;

    /// Releases, most recently published first
    fn releases(&self, org: &str, repo: &str) -> Result<Vec<ReleaseRow>, SourceError>;

    fn members(&self, org: &str) -> Result<Vec<MemberRow>, SourceError>;

    /// Logins that are members of any synced organization
    fn known_member_logins(&self) -> Result<HashSet<String>, SourceError>;
}
