//! Team slice extraction
//!
//! Teams are identified across organizations by slug alone: two
//! organizations with a `core` team contribute to the same slice. Each slice
//! keeps, per organization, only the team itself, its members, its
//! repositories and the report entries that reference them.

use crate::core::document::{Document, ROOT_TAG};
use crate::core::metadata::MetadataHeader;
use crate::core::node::{filter_by_attribute, Node};

/// Slug of the organization owners team, never sliced
pub const OWNERS_SLUG: &str = "owners";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamKey {
    pub slug: String,
    pub name: String,
}

impl TeamKey {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }

    /// Output document name
    pub fn document_name(&self) -> String {
        format!("team-{}", self.slug)
    }
}

/// Distinct teams of every organization in `base`, in first-seen order.
///
/// The first name seen for a slug wins; `owners` is dropped.
pub fn distinct_teams(base: &Document) -> Vec<TeamKey> {
    let mut teams: Vec<TeamKey> = Vec::new();
    for team in base.organizations().flat_map(|org| org.children_named("team")) {
        let Some(slug) = team.attr("slug") else {
            continue;
        };
        if slug == OWNERS_SLUG || teams.iter().any(|t| t.slug == slug) {
            continue;
        }
        teams.push(TeamKey::new(slug, team.attr("name").unwrap_or(slug)));
    }
    teams
}

/// One document per distinct team, sharing a header with team navigation
pub fn extract_team_slices(base: &Document, github_url: &str) -> Vec<(TeamKey, Document)> {
    let teams = distinct_teams(base);
    let header = base.header().with_team_navigation(&teams);
    teams
        .into_iter()
        .map(|team| {
            let doc = slice_team(base, &team, &header, github_url);
            (team, doc)
        })
        .collect()
}

/// Slice one team out of every organization that has it
pub fn slice_team(
    base: &Document,
    team: &TeamKey,
    header: &MetadataHeader,
    github_url: &str,
) -> Document {
    let root = Node::new(ROOT_TAG)
        .with_attr("dashboard", &team.name)
        .with_attr("team", true)
        .with_attr("github_url", github_url)
        .with_children(
            base.organizations()
                .filter_map(|org| slice_organization(org, &team.slug)),
        );
    Document::new(root, header.clone())
}

fn slice_organization(org: &Node, slug: &str) -> Option<Node> {
    let team = filter_by_attribute(org.children_named("team"), "slug", slug).next()?;
    let org_name = org.attr("name").unwrap_or_default();

    let logins: Vec<&str> = team.find_all("members/member").map(|m| m.text_or_empty()).collect();
    let repos: Vec<&str> = team.find_all("repos/repo").map(|r| r.text_or_empty()).collect();

    let mut slice = org.clone();
    for tag in ["team", "repo", "reports", "member"] {
        slice.remove_children(tag);
    }
    slice.push(team.clone());

    // Members or repositories missing from the organization are omitted
    for login in &logins {
        if let Some(member) = filter_by_attribute(org.children_named("member"), "login", login).next() {
            slice.push(member.clone());
        }
    }
    for repo in &repos {
        if let Some(node) = filter_by_attribute(org.children_named("repo"), "name", repo).next() {
            slice.push(node.clone());
        }
    }

    slice.push(team_reports(org, org_name, &logins, &repos));
    Some(slice)
}

fn team_reports(org: &Node, org_name: &str, logins: &[&str], repos: &[&str]) -> Node {
    let mut reports = Node::new("reports");
    let Some(source) = org.child("reports") else {
        return reports;
    };
    let reporting = |class: &'static str| {
        filter_by_attribute(source.children_named("reporting"), "class", class)
    };

    for login in logins {
        reports.extend(
            reporting("user-report")
                .filter(|entry| entry.text_or_empty() == *login)
                .cloned(),
        );
    }
    for repo in repos {
        let qualified = format!("{}/{}", org_name, repo);
        let matches = |entry: &&Node| entry.attr("repo") == Some(qualified.as_str());
        reports.extend(source.children_named("license").filter(matches).cloned());
        reports.extend(reporting("repo-report").filter(matches).cloned());
        reports.extend(reporting("issue-report").filter(matches).cloned());
    }
    reports
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

    fn team(slug: &str, name: &str, repos: &[&str], members: &[&str]) -> Node {
        Node::new("team")
            .with_attr("slug", slug)
            .with_attr("name", name)
            .with_child(Node::new("description"))
            .with_child(Node::new("repos").with_children(repos.iter().map(|r| Node::new("repo").with_text(*r))))
            .with_child(
                Node::new("members").with_children(members.iter().map(|m| Node::new("member").with_text(*m))),
            )
    }

    fn reporting(class: &str, repo: Option<&str>, text: &str) -> Node {
        let mut node = Node::new("reporting").with_attr("class", class).with_text(text);
        if let Some(repo) = repo {
            node.set_attr("repo", repo);
        }
        node
    }

    fn acme() -> Node {
        Node::new("organization")
            .with_attr("name", "acme")
            .with_child(Node::new("description").with_text("Acme"))
            .with_child(team("core", "Core", &["widgets"], &["alice"]))
            .with_child(team("owners", "Owners", &["widgets", "gadgets"], &["root"]))
            .with_child(team("docs", "Docs", &["gadgets", "vanished"], &["bob", "left"]))
            .with_child(Node::new("repo").with_attr("name", "widgets"))
            .with_child(Node::new("repo").with_attr("name", "gadgets"))
            .with_child(Node::new("member").with_attr("login", "alice"))
            .with_child(Node::new("member").with_attr("login", "bob"))
            .with_child(Node::new("member").with_attr("login", "root"))
            .with_child(
                Node::new("reports")
                    .with_child(reporting("user-report", None, "alice"))
                    .with_child(reporting("user-report", None, "bob"))
                    .with_child(reporting("repo-report", Some("acme/widgets"), "x"))
                    .with_child(reporting("issue-report", Some("acme/gadgets"), "y"))
                    .with_child(Node::new("license").with_attr("repo", "acme/widgets")),
            )
    }

    fn beta() -> Node {
        Node::new("organization")
            .with_attr("name", "beta")
            .with_child(team("core", "Core Team", &["tools"], &["carol"]))
            .with_child(Node::new("repo").with_attr("name", "tools"))
            .with_child(Node::new("member").with_attr("login", "carol"))
            .with_child(Node::new("reports"))
    }

    fn base() -> Document {
        Document::new(
            Node::new(ROOT_TAG).with_child(acme()).with_child(beta()),
            header(),
        )
    }

    fn tags(node: &Node) -> Vec<&str> {
        node.children().iter().map(|c| c.tag()).collect()
    }

    #[test]
    fn test_distinct_teams_by_slug_without_owners() {
        let teams = distinct_teams(&base());
        assert_eq!(
            teams,
            vec![TeamKey::new("core", "Core"), TeamKey::new("docs", "Docs")]
        );
    }

    #[test]
    fn test_core_slice_keeps_only_referenced_data() {
        let base = base();
        let slices = extract_team_slices(&base, "https://github.com");
        let (key, doc) = &slices[0];
        assert_eq!(key.document_name(), "team-core");
        assert_eq!(doc.root().attr("team"), Some("true"));
        assert_eq!(doc.root().attr("dashboard"), Some("Core"));

        let orgs: Vec<_> = doc.organizations().collect();
        assert_eq!(orgs.len(), 2);

        let acme = orgs[0];
        assert_eq!(tags(acme), vec!["description", "team", "member", "repo", "reports"]);
        assert_eq!(acme.child("team").unwrap().attr("slug"), Some("core"));
        assert_eq!(acme.child("member").unwrap().attr("login"), Some("alice"));
        assert_eq!(acme.child("repo").unwrap().attr("name"), Some("widgets"));

        let reports = acme.child("reports").unwrap();
        let entries: Vec<_> = reports
            .children()
            .iter()
            .map(|n| (n.tag(), n.attr("class").unwrap_or_default()))
            .collect();
        assert_eq!(
            entries,
            vec![("reporting", "user-report"), ("license", ""), ("reporting", "repo-report")]
        );

        assert_eq!(orgs[1].attr("name"), Some("beta"));
        assert_eq!(orgs[1].child("team").unwrap().attr("name"), Some("Core Team"));
    }

    #[test]
    fn test_missing_members_and_repos_silently_omitted() {
        let base = base();
        let slices = extract_team_slices(&base, "https://github.com");
        let (_, docs) = &slices[1];
        let orgs: Vec<_> = docs.organizations().collect();
        assert_eq!(orgs.len(), 1);
        let acme = orgs[0];
        assert_eq!(acme.children_named("member").count(), 1);
        assert_eq!(acme.children_named("repo").count(), 1);
        assert_eq!(acme.child("repo").unwrap().attr("name"), Some("gadgets"));
        let reports = acme.child("reports").unwrap();
        assert_eq!(reports.children().len(), 2);
    }

    #[test]
    fn test_slice_header_lists_teams_and_never_owners() {
        let base = base();
        let slices = extract_team_slices(&base, "https://github.com");
        for (_, doc) in &slices {
            let team_slugs: Vec<_> = doc
                .header()
                .navigation()
                .children_named("team")
                .map(|t| t.attr("slug").unwrap())
                .collect();
            assert_eq!(team_slugs, vec!["core", "docs"]);
            assert!(doc.root().find_all("team").all(|t| t.attr("slug") != Some(OWNERS_SLUG)));
        }
    }

    #[test]
    fn test_base_document_untouched() {
        let base = base();
        let before = base.clone();
        let _ = extract_team_slices(&base, "https://github.com");
        assert_eq!(base, before);
    }
}
