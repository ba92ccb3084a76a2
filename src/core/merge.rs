//! Merge engine - composite documents over several owners

use crate::core::document::{Document, ROOT_TAG};
use crate::core::metadata::MetadataHeader;
use crate::core::node::Node;

/// Union the `organization` elements of `sources` under one composite root.
///
/// Sources are taken in the order given and their organizations are deep
/// copied; nothing is filtered. The composite always claims to include
/// private data, whatever its sources say.
pub fn merge_documents<'a>(
    title: &str,
    header: &MetadataHeader,
    github_url: &str,
    sources: impl IntoIterator<Item = &'a Document>,
) -> Document {
    let root = Node::new(ROOT_TAG)
        .with_attr("dashboard", title)
        .with_attr("includes_private", true)
        .with_attr("github_url", github_url)
        .with_children(
            sources
                .into_iter()
                .flat_map(|doc| doc.organizations().cloned()),
        );
    Document::new(root, header.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::metadata::{build_header, RunMetrics};
    use chrono::Utc;
    use std::path::Path;

    fn header() -> MetadataHeader {
        let config = Config::from_yaml(
            "dashboard:\n  organizations: [acme, beta]\n  data-directory: d\n",
            Path::new("/"),
        )
        .unwrap();
        build_header(&config, &[], RunMetrics::new(Utc::now(), Utc::now()))
    }

    fn owner(name: &str) -> Document {
        let root = Node::new(ROOT_TAG)
            .with_attr("dashboard", name)
            .with_attr("includes_private", false)
            .with_child(
                Node::new("organization")
                    .with_attr("name", name)
                    .with_child(Node::new("repo").with_attr("name", "widgets")),
            );
        Document::new(root, header())
    }

    #[test]
    fn test_merge_is_additive_and_ordered() {
        let acme = owner("acme");
        let beta = owner("beta");
        let merged = merge_documents("All Organizations", &header(), "https://github.com", [&beta, &acme]);

        assert_eq!(merged.root().attr("dashboard"), Some("All Organizations"));
        assert_eq!(merged.root().attr("includes_private"), Some("true"));
        let orgs: Vec<_> = merged.organizations().collect();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0], beta.organizations().next().unwrap());
        assert_eq!(orgs[1], acme.organizations().next().unwrap());
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = merge_documents("All Logins", &header(), "https://github.com", Vec::<&Document>::new());
        assert_eq!(merged.organizations().count(), 0);
        assert_eq!(merged.header(), &header());
    }
}
