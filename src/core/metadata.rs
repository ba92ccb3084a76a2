//! Metadata header shared by every document of a run
//!
//! The header carries navigation (organizations, logins and, for team
//! documents, teams), the report catalog, and run metrics. It is computed
//! once per run and passed explicitly to every document builder.

use chrono::{DateTime, Utc};

use crate::core::catalog::{ReportClass, ReportDefinition};
use crate::core::config::Config;
use crate::core::node::Node;
use crate::core::teams::TeamKey;

pub const METADATA_TAG: &str = "metadata";
const NAVIGATION_TAG: &str = "navigation";
const RUN_METRICS_TAG: &str = "run-metrics";
const NOT_AVAILABLE: &str = "n/a";

/// Timing and API accounting for a run, passed through verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    pub refresh_time: String,
    pub generation_time: String,
    pub start_rate_limit: String,
    pub end_rate_limit: String,
    pub used_rate_limit: String,
}

impl RunMetrics {
    /// Metrics for a run without API accounting
    pub fn new(refresh_time: DateTime<Utc>, generation_time: DateTime<Utc>) -> Self {
        Self {
            refresh_time: refresh_time.to_rfc3339(),
            generation_time: generation_time.to_rfc3339(),
            start_rate_limit: NOT_AVAILABLE.to_string(),
            end_rate_limit: NOT_AVAILABLE.to_string(),
            used_rate_limit: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn to_node(&self) -> Node {
        Node::new(RUN_METRICS_TAG)
            .with_attr("refreshTime", &self.refresh_time)
            .with_attr("generationTime", &self.generation_time)
            .with_attr("startRateLimit", &self.start_rate_limit)
            .with_attr("endRateLimit", &self.end_rate_limit)
            .with_attr("usedRateLimit", &self.used_rate_limit)
    }

    fn from_node(node: &Node) -> Self {
        let get = |key: &str| node.attr(key).unwrap_or(NOT_AVAILABLE).to_string();
        Self {
            refresh_time: get("refreshTime"),
            generation_time: get("generationTime"),
            start_rate_limit: get("startRateLimit"),
            end_rate_limit: get("endRateLimit"),
            used_rate_limit: get("usedRateLimit"),
        }
    }
}

/// Navigation, report catalog and run metrics
///
/// Equality ignores run metrics, which differ between otherwise identical runs.
#[derive(Debug, Clone)]
pub struct MetadataHeader {
    navigation: Node,
    catalogs: Vec<Node>,
    run_metrics: RunMetrics,
}

impl PartialEq for MetadataHeader {
    fn eq(&self, other: &Self) -> bool {
        self.navigation == other.navigation && self.catalogs == other.catalogs
    }
}

impl Eq for MetadataHeader {}

impl MetadataHeader {
    pub fn navigation(&self) -> &Node {
        &self.navigation
    }

    pub fn run_metrics(&self) -> &RunMetrics {
        &self.run_metrics
    }

    /// Catalog element for one report class
    pub fn catalog(&self, class: ReportClass) -> Option<&Node> {
        self.catalogs.iter().find(|c| c.tag() == class.catalog_tag())
    }

    /// Copy of this header with team entries appended to the navigation
    pub fn with_team_navigation(&self, teams: &[TeamKey]) -> MetadataHeader {
        let mut header = self.clone();
        header.navigation.extend(teams.iter().map(|team| {
            Node::new("team")
                .with_attr("name", &team.name)
                .with_attr("slug", &team.slug)
        }));
        header
    }

    pub fn to_node(&self) -> Node {
        Node::new(METADATA_TAG)
            .with_child(self.navigation.clone())
            .with_children(self.catalogs.iter().cloned())
            .with_child(self.run_metrics.to_node())
    }

    /// Recover a header from a serialized `metadata` element.
    ///
    /// Returns `None` when the element has no navigation block.
    pub fn from_node(node: &Node) -> Option<MetadataHeader> {
        let navigation = node.child(NAVIGATION_TAG)?.clone();
        let catalogs = ReportClass::ALL
            .iter()
            .filter_map(|class| node.child(class.catalog_tag()).cloned())
            .collect();
        let run_metrics = node
            .child(RUN_METRICS_TAG)
            .map(RunMetrics::from_node)
            .unwrap_or_else(|| RunMetrics {
                refresh_time: NOT_AVAILABLE.to_string(),
                generation_time: NOT_AVAILABLE.to_string(),
                start_rate_limit: NOT_AVAILABLE.to_string(),
                end_rate_limit: NOT_AVAILABLE.to_string(),
                used_rate_limit: NOT_AVAILABLE.to_string(),
            });
        Some(MetadataHeader {
            navigation,
            catalogs,
            run_metrics,
        })
    }
}

/// Build the run's metadata header from configuration and the report catalog
pub fn build_header(
    config: &Config,
    catalog: &[ReportDefinition],
    run_metrics: RunMetrics,
) -> MetadataHeader {
    let mut navigation = Node::new(NAVIGATION_TAG);
    if config.organizations.len() > 1 {
        navigation.push(Node::new("organization").with_text("AllOrgs"));
    }
    for org in &config.organizations {
        navigation.push(Node::new("organization").with_text(org.as_str()));
    }
    if config.logins.len() > 1 {
        navigation.push(Node::new("login").with_text("AllLogins"));
    }
    for login in &config.logins {
        navigation.push(Node::new("login").with_text(login.as_str()));
    }

    let catalogs = ReportClass::ALL
        .iter()
        .map(|class| {
            Node::new(class.catalog_tag()).with_children(
                catalog
                    .iter()
                    .filter(|def| def.class == *class)
                    .map(report_node),
            )
        })
        .collect();

    MetadataHeader {
        navigation,
        catalogs,
        run_metrics,
    }
}

fn report_node(def: &ReportDefinition) -> Node {
    let mut node = Node::new("report")
        .with_attr("key", &def.key)
        .with_attr("name", &def.name)
        .with_child(Node::new("description").with_text(def.description.as_str()));
    if let Some(columns) = &def.columns {
        node.extend(columns.iter().map(|col| {
            Node::new("column-type")
                .with_attr("type", col.column_type.as_str())
                .with_text(col.name.as_str())
        }));
    }
    node
}
