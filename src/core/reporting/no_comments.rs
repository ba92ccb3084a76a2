//! Open community issues and pull requests nobody has commented on

use super::{entry, field, DbReportKind};
use crate::core::builder::{clean_title, label_node};
use crate::core::catalog::{Column, ColumnType};
use crate::core::node::Node;
use crate::core::source::{ItemKind, RowSource, SourceError};

pub(super) fn columns(link: &str) -> Vec<Column> {
    vec![
        Column::new("Created", ColumnType::Date),
        Column::new(link, ColumnType::Url),
        Column::text("Title"),
        Column::new("Labels", ColumnType::Labels),
    ]
}

pub(super) fn entries(
    org: &str,
    source: &dyn RowSource,
    github_url: &str,
    kind: ItemKind,
) -> Result<Vec<Node>, SourceError> {
    let members = source.known_member_logins()?;
    let (report, path) = match kind {
        ItemKind::Issue => (DbReportKind::NoIssueComments, "issues"),
        ItemKind::PullRequest => (DbReportKind::NoPrComments, "pull"),
    };

    let mut entries = Vec::new();
    for item in source.open_items_in_org(org)? {
        if item.kind() != kind || item.comment_count != 0 || members.contains(&item.user_login) {
            continue;
        }
        let url = format!("{}/{}/{}/{}/{}", github_url, org, item.repo, path, item.number);
        let labels = Node::new("field")
            .with_children(source.labels(item.id)?.iter().map(label_node));
        entries.push(entry(
            org,
            &item.repo,
            report,
            vec![
                field(item.created_at.as_str()),
                field(url),
                field(clean_title(&item.title)),
                labels,
            ],
        ));
    }
    Ok(entries)
}
