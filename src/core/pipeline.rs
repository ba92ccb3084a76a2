//! Generation phases
//!
//! Every phase works unit by unit (one owner, one grouping, one team) and
//! reports an outcome per unit instead of stopping at the first failure.
//! Only the team phase can fail as a whole, when its base document is
//! unreadable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::core::builder::OrgDocumentBuilder;
use crate::core::catalog::ReportDefinition;
use crate::core::config::{Config, FragmentCategory, Grouping};
use crate::core::error::DashboardError;
use crate::core::merge::merge_documents;
use crate::core::metadata::{build_header, MetadataHeader, RunMetrics};
use crate::core::reporting::build_fragment;
use crate::core::source::RowSource;
use crate::core::splice::splice_fragments;
use crate::core::store::DocumentStore;
use crate::core::teams::extract_team_slices;
use crate::xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    DbReport,
    Xml,
    Merge,
    Teams,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::DbReport => "db-report",
            Phase::Xml => "xml",
            Phase::Merge => "merge",
            Phase::Teams => "teams",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Written { path: PathBuf },
    Skipped { reason: String },
    Failed { error: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Result of one unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutcome {
    pub phase: Phase,
    pub unit: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl UnitOutcome {
    fn new(phase: Phase, unit: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            phase,
            unit: unit.into(),
            outcome,
        }
    }

    fn from_write(phase: Phase, unit: &str, result: Result<PathBuf, DashboardError>) -> Self {
        let outcome = match result {
            Ok(path) => Outcome::Written { path },
            Err(e) => {
                tracing::warn!(phase = %phase, unit = %unit, error = %e, "skipping unit");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        Self::new(phase, unit, outcome)
    }
}

/// Configured report definitions followed by the enabled database reports
pub fn report_catalog(config: &Config) -> Vec<ReportDefinition> {
    config
        .reports
        .iter()
        .cloned()
        .chain(config.db_reports.iter().map(|kind| kind.definition()))
        .collect()
}

/// Shared state of one generation run
pub struct Pipeline<'a> {
    config: &'a Config,
    store: DocumentStore,
    header: MetadataHeader,
    github_url: String,
    now: DateTime<Utc>,
}

impl<'a> Pipeline<'a> {
    /// Compute the run's metadata header once; every phase reuses it
    pub fn new(config: &'a Config, metrics: RunMetrics, now: DateTime<Utc>) -> Self {
        let header = build_header(config, &report_catalog(config), metrics);
        Self {
            config,
            store: DocumentStore::new(config.dash_dir()),
            header,
            github_url: config.github_url(),
            now,
        }
    }

    pub fn header(&self) -> &MetadataHeader {
        &self.header
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Run the enabled database reports and write one fragment per owner
    pub fn db_reports(&self, source: &dyn RowSource) -> Vec<UnitOutcome> {
        if self.config.db_reports.is_empty() {
            tracing::info!("no database reports enabled");
            return Vec::new();
        }
        self.config
            .owners()
            .iter()
            .map(|org| {
                let result = build_fragment(&self.config.db_reports, org, source, &self.github_url, self.now)
                    .map_err(|e| DashboardError::query(org.as_str(), e))
                    .and_then(|fragment| {
                        let path = self.config.fragment_path(FragmentCategory::DbReport, org);
                        if let Some(dir) = path.parent() {
                            fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;
                        }
                        xml::write_file(&path, &fragment)?;
                        Ok(path)
                    });
                UnitOutcome::from_write(Phase::DbReport, org, result)
            })
            .collect()
    }

    /// Build, splice and write every owner's document
    pub fn org_documents(&self, source: &dyn RowSource) -> Vec<UnitOutcome> {
        let builder = OrgDocumentBuilder::new(source, self.config, &self.header, self.now);
        self.config
            .owners()
            .iter()
            .map(|org| {
                let result = builder.build(org).and_then(|mut document| {
                    let spliced = splice_fragments(&mut document, self.config, org);
                    tracing::debug!(org = %org, entries = spliced, "spliced report fragments");
                    self.store.write(org, &document)
                });
                UnitOutcome::from_write(Phase::Xml, org, result)
            })
            .collect()
    }

    /// Write the composite documents. Only runs with more than one owner.
    pub fn merge(&self) -> Vec<UnitOutcome> {
        if self.config.owners().len() <= 1 {
            tracing::info!("single owner, nothing to merge");
            return Vec::new();
        }
        let mut outcomes = Vec::new();
        for grouping in Grouping::ALL {
            let name = grouping.document_name();
            let ids = self.config.grouping(grouping);
            if ids.is_empty() {
                outcomes.push(UnitOutcome::new(
                    Phase::Merge,
                    name,
                    Outcome::Skipped {
                        reason: format!("no {} configured", grouping.key()),
                    },
                ));
                continue;
            }
            let sources: Vec<_> = ids
                .iter()
                .filter_map(|id| match self.store.read(id) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        tracing::warn!(grouping = %name, owner = %id, error = %e, "owner document unavailable, leaving it out");
                        None
                    }
                })
                .collect();
            let merged = merge_documents(grouping.title(), &self.header, &self.github_url, &sources);
            outcomes.push(UnitOutcome::from_write(
                Phase::Merge,
                name,
                self.store.write(name, &merged),
            ));
        }
        outcomes
    }

    /// Name of the document team slices are extracted from
    pub fn team_base(&self) -> String {
        let owners = self.config.owners();
        if owners.len() > 1 {
            let grouping = if self.config.organizations.is_empty() {
                Grouping::Logins
            } else {
                Grouping::Organizations
            };
            grouping.document_name().to_string()
        } else {
            owners.into_iter().next().unwrap_or_default()
        }
    }

    /// Write one document per distinct team.
    ///
    /// An unreadable base document fails the whole phase.
    pub fn teams(&self) -> Result<Vec<UnitOutcome>, DashboardError> {
        let base = self.store.read(&self.team_base())?;
        Ok(extract_team_slices(&base, &self.github_url)
            .into_iter()
            .map(|(team, document)| {
                let name = team.document_name();
                let result = self.store.write(&name, &document);
                UnitOutcome::from_write(Phase::Teams, &name, result)
            })
            .collect())
    }

    /// All phases in order
    pub fn run(&self, source: &dyn RowSource) -> Result<Vec<UnitOutcome>, DashboardError> {
        let mut outcomes = self.db_reports(source);
        outcomes.extend(self.org_documents(source));
        outcomes.extend(self.merge());
        outcomes.extend(self.teams()?);
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(yaml: &str) -> Config {
        Config::from_yaml(yaml, Path::new("/srv")).unwrap()
    }

    fn pipeline(config: &Config) -> Pipeline<'_> {
        let now = Utc::now();
        Pipeline::new(config, RunMetrics::new(now, now), now)
    }

    #[test]
    fn test_catalog_appends_db_reports() {
        let cfg = config(
            "dashboard:\n  organizations: [a]\n  data-directory: d\n  reports:\n    - {key: LicenseReporter, class: repo-report, name: License}\n  db-reports: [NoPrCommentsDbReporter]\n",
        );
        let keys: Vec<_> = report_catalog(&cfg).into_iter().map(|d| d.key).collect();
        assert_eq!(keys, vec!["LicenseReporter", "NoPrCommentsDbReporter"]);
    }

    #[test]
    fn test_team_base_selection() {
        let single = config("dashboard:\n  organizations: [acme]\n  data-directory: d\n");
        assert_eq!(pipeline(&single).team_base(), "acme");

        let orgs = config("dashboard:\n  organizations: [acme]\n  logins: [bob]\n  data-directory: d\n");
        assert_eq!(pipeline(&orgs).team_base(), "AllOrgs");

        let logins = config("dashboard:\n  logins: [bob, carol]\n  data-directory: d\n");
        assert_eq!(pipeline(&logins).team_base(), "AllLogins");
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = UnitOutcome::new(
            Phase::Merge,
            "AllOrgs",
            Outcome::Skipped {
                reason: "nothing to do".into(),
            },
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["phase"], "merge");
        assert_eq!(json["unit"], "AllOrgs");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "nothing to do");
    }
}
