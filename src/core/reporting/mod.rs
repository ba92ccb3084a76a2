//! Database-backed reports
//!
//! Each report queries the row source for one owner and produces entries of
//! the `db-report` fragment, which the splicer later grafts into the owner's
//! document. Enabled reports also contribute their definitions, including
//! declared columns, to the report catalog.

mod average_age;
mod no_comments;

use chrono::{DateTime, Utc};

use crate::core::catalog::{Column, ReportClass, ReportDefinition};
use crate::core::node::Node;
use crate::core::source::{ItemKind, RowSource, SourceError};

/// Root tag of a `db-report` fragment
pub const FRAGMENT_ROOT: &str = "github-db-report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbReportKind {
    AverageIssueOpened,
    NoIssueComments,
    NoPrComments,
}

impl DbReportKind {
    pub const ALL: [DbReportKind; 3] = [
        DbReportKind::AverageIssueOpened,
        DbReportKind::NoIssueComments,
        DbReportKind::NoPrComments,
    ];

    /// Configuration key, also the `type` of every entry the report emits
    pub fn key(&self) -> &'static str {
        match self {
            DbReportKind::AverageIssueOpened => "AverageIssueOpenedDbReporter",
            DbReportKind::NoIssueComments => "NoIssueCommentsDbReporter",
            DbReportKind::NoPrComments => "NoPrCommentsDbReporter",
        }
    }

    pub fn definition(&self) -> ReportDefinition {
        let (name, description, columns) = match self {
            DbReportKind::AverageIssueOpened => (
                "Average Issue Time Opened",
                "This report shows the average time each repo's open issues have been opened",
                vec![
                    Column::text("Repo"),
                    Column::text("Count of open issues"),
                    Column::text("Average age of open issues"),
                ],
            ),
            DbReportKind::NoIssueComments => (
                "Open Issues with no comments",
                "This report shows open issues from the community with no comments.",
                no_comments::columns("Issue"),
            ),
            DbReportKind::NoPrComments => (
                "Open PRs with no comments",
                "This report shows open pull requests from the community with no comments.",
                no_comments::columns("Pr"),
            ),
        };
        ReportDefinition {
            key: self.key().to_string(),
            class: ReportClass::IssueReport,
            name: name.to_string(),
            description: description.to_string(),
            columns: Some(columns),
        }
    }

    /// Report entries for one owner, in report order
    pub fn run(
        &self,
        org: &str,
        source: &dyn RowSource,
        github_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Node>, SourceError> {
        match self {
            DbReportKind::AverageIssueOpened => average_age::entries(org, source, now),
            DbReportKind::NoIssueComments => {
                no_comments::entries(org, source, github_url, ItemKind::Issue)
            }
            DbReportKind::NoPrComments => {
                no_comments::entries(org, source, github_url, ItemKind::PullRequest)
            }
        }
    }
}

impl std::fmt::Display for DbReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for DbReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| format!("Unknown database report: {}", s))
    }
}

/// Run every enabled report for one owner and wrap the entries in a fragment
pub fn build_fragment(
    reports: &[DbReportKind],
    org: &str,
    source: &dyn RowSource,
    github_url: &str,
    now: DateTime<Utc>,
) -> Result<Node, SourceError> {
    let mut organization = Node::new("organization").with_attr("name", org);
    for report in reports {
        organization.extend(report.run(org, source, github_url, now)?);
    }
    Ok(Node::new(FRAGMENT_ROOT).with_child(organization))
}

fn entry(org: &str, repo: &str, kind: DbReportKind, fields: Vec<Node>) -> Node {
    Node::new("reporting")
        .with_attr("class", ReportClass::IssueReport.as_str())
        .with_attr("repo", format!("{}/{}", org, repo))
        .with_attr("type", kind.key())
        .with_children(fields)
}

fn field(text: impl Into<String>) -> Node {
    Node::new("field").with_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ColumnType;

    #[test]
    fn test_keys_parse_back() {
        for kind in DbReportKind::ALL {
            assert_eq!(kind.key().parse::<DbReportKind>().unwrap(), kind);
        }
        assert!("LicenseReporter".parse::<DbReportKind>().is_err());
    }

    #[test]
    fn test_definitions_declare_typed_columns() {
        let def = DbReportKind::NoPrComments.definition();
        assert_eq!(def.class, ReportClass::IssueReport);
        let columns = def.columns.unwrap();
        let types: Vec<_> = columns.iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![ColumnType::Date, ColumnType::Url, ColumnType::Text, ColumnType::Labels]
        );
        assert_eq!(columns[1].name, "Pr");

        let avg = DbReportKind::AverageIssueOpened.definition();
        assert!(avg
            .columns
            .unwrap()
            .iter()
            .all(|c| c.column_type == ColumnType::Text));
    }
}
