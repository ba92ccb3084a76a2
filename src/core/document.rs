//! Documents - a root element plus the run's metadata header

use std::path::Path;

use crate::core::error::DashboardError;
use crate::core::metadata::{MetadataHeader, METADATA_TAG};
use crate::core::node::Node;

/// Root tag of every generated document
pub const ROOT_TAG: &str = "github-dashdata";

/// One self-contained output unit
///
/// The header is held separately from the root so it can be compared and
/// replaced without walking the tree; it is serialized as the root's first
/// child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
    header: MetadataHeader,
}

impl Document {
    pub fn new(root: Node, header: MetadataHeader) -> Self {
        Self { root, header }
    }

    /// Root element without the metadata block
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn header(&self) -> &MetadataHeader {
        &self.header
    }

    /// `organization` children of the root, in document order
    pub fn organizations(&self) -> impl Iterator<Item = &Node> {
        self.root.children_named("organization")
    }

    /// Serializable tree with the header as the first child
    pub fn to_node(&self) -> Node {
        let mut node = self.root.clone();
        node.insert(0, self.header.to_node());
        node
    }

    /// Split a parsed tree back into root and header
    pub fn from_node(mut node: Node, path: &Path) -> Result<Self, DashboardError> {
        let header = node
            .child(METADATA_TAG)
            .ok_or_else(|| DashboardError::malformed(path, "no metadata block"))
            .and_then(|metadata| {
                MetadataHeader::from_node(metadata)
                    .ok_or_else(|| DashboardError::malformed(path, "metadata has no navigation"))
            })?;
        node.remove_children(METADATA_TAG);
        Ok(Self { root: node, header })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::metadata::{build_header, RunMetrics};
    use chrono::Utc;

    fn header() -> MetadataHeader {
        let config =
            Config::from_yaml("dashboard:\n  organizations: [acme]\n  data-directory: d\n", Path::new("/"))
                .unwrap();
        build_header(&config, &[], RunMetrics::new(Utc::now(), Utc::now()))
    }

    #[test]
    fn test_header_serialized_first() {
        let root = Node::new(ROOT_TAG).with_child(Node::new("organization").with_attr("name", "acme"));
        let doc = Document::new(root, header());
        let node = doc.to_node();
        assert_eq!(node.children()[0].tag(), METADATA_TAG);
        assert_eq!(node.children()[1].tag(), "organization");
        assert_eq!(doc.organizations().count(), 1);
    }

    #[test]
    fn test_from_node_splits_header() {
        let root = Node::new(ROOT_TAG).with_child(Node::new("organization"));
        let doc = Document::new(root, header());
        let back = Document::from_node(doc.to_node(), Path::new("acme.xml")).unwrap();
        assert_eq!(back, doc);
        assert!(back.root().child(METADATA_TAG).is_none());
    }

    #[test]
    fn test_missing_metadata_is_malformed() {
        let err = Document::from_node(Node::new(ROOT_TAG), Path::new("x.xml")).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedDocument { .. }));
    }
}
