//! Average age of open issues per repository

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::{entry, field, DbReportKind};
use crate::core::age::parse_timestamp;
use crate::core::node::Node;
use crate::core::source::{ItemKind, RowSource, SourceError};

#[derive(Default)]
struct RepoAges {
    count: u64,
    total_days: i64,
}

impl RepoAges {
    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_days as f64 / self.count as f64
        }
    }
}

/// One entry per repository with open issues, youngest average first
pub(super) fn entries(
    org: &str,
    source: &dyn RowSource,
    now: DateTime<Utc>,
) -> Result<Vec<Node>, SourceError> {
    let today = now.date_naive();
    let mut repos: BTreeMap<String, RepoAges> = BTreeMap::new();

    for item in source.open_items_in_org(org)? {
        if item.kind() != ItemKind::Issue {
            continue;
        }
        let Some(created) = parse_timestamp(&item.created_at) else {
            tracing::debug!(org = %org, item = item.id, "skipping issue with unparsable creation time");
            continue;
        };
        let ages = repos.entry(item.repo).or_default();
        ages.count += 1;
        ages.total_days += (today - created.date_naive()).num_days();
    }

    let mut rows: Vec<(String, RepoAges)> = repos.into_iter().collect();
    // Stable sort keeps repository name order among equal averages
    rows.sort_by(|a, b| a.1.average().total_cmp(&b.1.average()));

    Ok(rows
        .into_iter()
        .map(|(repo, ages)| {
            entry(
                org,
                &repo,
                DbReportKind::AverageIssueOpened,
                vec![
                    field(format!("{}/{}", org, repo)),
                    field(ages.count.to_string()),
                    field(format!("{:.2}", ages.average())),
                ],
            )
        })
        .collect())
}
