//! Report fragment splicer
//!
//! Grafts externally produced report entries into an owner's `reports`
//! section. Fragments are optional; an absent file contributes nothing and
//! a fragment without a usable root is skipped with a warning.

use std::path::Path;

use crate::core::config::{Config, FragmentCategory};
use crate::core::document::Document;
use crate::core::node::Node;
use crate::xml;

const SPLICED_PATHS: [&str; 2] = ["organization/reporting", "organization/license"];

/// Splice every fragment category for `org` into the document.
///
/// Returns the number of entries copied.
pub fn splice_fragments(document: &mut Document, config: &Config, org: &str) -> usize {
    let mut entries = Vec::new();
    for category in FragmentCategory::ALL {
        let path = config.fragment_path(category, org);
        entries.extend(read_fragment_entries(&path));
    }
    let count = entries.len();
    splice_entries(document, entries);
    count
}

/// Entries of one fragment file, in splice order
pub fn read_fragment_entries(path: &Path) -> Vec<Node> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no fragment");
        return Vec::new();
    }
    match xml::read_file(path) {
        Ok(Some(root)) => fragment_entries(&root),
        Ok(None) => {
            tracing::warn!(path = %path.display(), "fragment has no root element, skipping");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable fragment, skipping");
            Vec::new()
        }
    }
}

/// Deep copies of the `reporting` entries followed by the `license` entries
pub fn fragment_entries(root: &Node) -> Vec<Node> {
    SPLICED_PATHS
        .iter()
        .flat_map(|path| root.find_all(path).cloned())
        .collect()
}

fn splice_entries(document: &mut Document, entries: Vec<Node>) {
    let Some(organization) = document.root_mut().child_mut("organization") else {
        return;
    };
    match organization.child_mut("reports") {
        Some(reports) => reports.extend(entries),
        None => organization.push(Node::new("reports").with_children(entries)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::metadata::{build_header, RunMetrics};
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Config, Document) {
        let tmp = TempDir::new().unwrap();
        let config = Config::from_yaml(
            "dashboard:\n  organizations: [acme, beta]\n  data-directory: data\n",
            tmp.path(),
        )
        .unwrap();
        let header = build_header(&config, &[], RunMetrics::new(Utc::now(), Utc::now()));
        let root = Node::new("github-dashdata").with_child(
            Node::new("organization")
                .with_attr("name", "acme")
                .with_child(Node::new("reports")),
        );
        (tmp, config, Document::new(root, header))
    }

    fn write(config: &Config, category: FragmentCategory, org: &str, content: &str) {
        let path = config.fragment_path(category, org);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn reports(doc: &Document) -> &Node {
        doc.root().find_all("organization/reports").next().unwrap()
    }

    #[test]
    fn test_review_entries_precede_db_entries() {
        let (_tmp, config, mut doc) = setup();
        write(
            &config,
            FragmentCategory::Review,
            "acme",
            r#"<github-review>
                 <organization name="acme">
                   <license repo="acme/widgets" file="LICENSE">Apache-2.0</license>
                   <reporting class="repo-report" repo="acme/widgets" type="DocsReporter">missing README</reporting>
                 </organization>
               </github-review>"#,
        );
        write(
            &config,
            FragmentCategory::DbReport,
            "acme",
            r#"<github-db-report><organization name="acme"><reporting class="issue-report" repo="acme/widgets" type="NoIssueCommentsDbReporter"><field>x</field></reporting></organization></github-db-report>"#,
        );

        assert_eq!(splice_fragments(&mut doc, &config, "acme"), 3);
        let kinds: Vec<_> = reports(&doc)
            .children()
            .iter()
            .map(|n| n.attr("type").unwrap_or(n.tag()))
            .collect();
        assert_eq!(kinds, vec!["DocsReporter", "license", "NoIssueCommentsDbReporter"]);
    }

    #[test]
    fn test_absent_fragments_leave_reports_empty() {
        let (_tmp, config, mut doc) = setup();
        assert_eq!(splice_fragments(&mut doc, &config, "beta"), 0);
        assert!(reports(&doc).children().is_empty());
    }

    #[test]
    fn test_broken_fragment_skipped_other_still_spliced() {
        let (_tmp, config, mut doc) = setup();
        write(&config, FragmentCategory::Review, "acme", "   ");
        write(
            &config,
            FragmentCategory::DbReport,
            "acme",
            r#"<r><organization><reporting class="issue-report" repo="acme/a"/></organization></r>"#,
        );
        assert_eq!(splice_fragments(&mut doc, &config, "acme"), 1);
    }
}
