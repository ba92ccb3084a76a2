//! Organization document builder
//!
//! Issues a fixed sequence of row source queries for one owner and
//! assembles the owner's document. Element order is significant to the
//! renderer: teams, then repositories, then members, then reports.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::core::age::{days_between, parse_timestamp, whole_days_between, AgeHistogram};
use crate::core::config::Config;
use crate::core::document::{Document, ROOT_TAG};
use crate::core::error::DashboardError;
use crate::core::metadata::MetadataHeader;
use crate::core::node::Node;
use crate::core::source::{
    ItemKind, ItemRow, LabelRow, MemberRow, Milestone, OrgRow, RepoRow, RowSource, SourceError,
    TeamRow,
};

/// Builds per-owner documents against one row source
pub struct OrgDocumentBuilder<'a> {
    source: &'a dyn RowSource,
    config: &'a Config,
    header: &'a MetadataHeader,
    github_url: String,
    now: DateTime<Utc>,
}

impl<'a> OrgDocumentBuilder<'a> {
    /// `now` is the reference time for open item ages
    pub fn new(
        source: &'a dyn RowSource,
        config: &'a Config,
        header: &'a MetadataHeader,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            config,
            header,
            github_url: config.github_url(),
            now,
        }
    }

    /// Build one owner's document with an empty `reports` section.
    ///
    /// Any query failure aborts this owner only and is returned as
    /// [`DashboardError::Query`].
    pub fn build(&self, org: &str) -> Result<Document, DashboardError> {
        let identity = self
            .source
            .organization(org)
            .map_err(|e| DashboardError::query(org, e))?;
        let organization = self
            .organization_node(org, &identity)
            .map_err(|e| DashboardError::query(org, e))?;

        let root = Node::new(ROOT_TAG)
            .with_attr("dashboard", org)
            .with_attr("includes_private", self.config.includes_private(org))
            .with_attr("logo", &identity.avatar_url)
            .with_attr("github_url", &self.github_url)
            .with_child(organization);
        Ok(Document::new(root, self.header.clone()))
    }

    fn organization_node(&self, org: &str, identity: &OrgRow) -> Result<Node, SourceError> {
        let account_type = if self.config.is_login(org) {
            "login"
        } else {
            "organization"
        };
        let mut node = Node::new("organization")
            .with_attr("name", org)
            .with_attr("avatar", &identity.avatar_url)
            .with_attr("type", account_type);

        for (tag, value) in [
            ("description", &identity.description),
            ("url", &identity.blog),
            ("name", &identity.name),
            ("location", &identity.location),
            ("email", &identity.email),
            ("created_at", &identity.created_at),
        ] {
            if !value.is_empty() {
                node.push(Node::new(tag).with_text(value.as_str()));
            }
        }

        for team in self.source.teams(org)? {
            node.push(self.team_node(&team)?);
        }

        let members = self.source.members(org)?;
        let member_logins: HashSet<&str> = members.iter().map(|m| m.login.as_str()).collect();

        for repo in self.source.repositories(org)? {
            node.push(self.repo_node(org, &repo, &member_logins)?);
        }

        node.extend(members.iter().map(member_node));
        node.push(Node::new("reports"));
        Ok(node)
    }

    fn team_node(&self, team: &TeamRow) -> Result<Node, SourceError> {
        let repos = self.source.team_repositories(team.id)?;
        let members = self.source.team_members(team.id)?;
        Ok(Node::new("team")
            .with_attr("slug", &team.slug)
            .with_attr("name", &team.name)
            .with_child(Node::new("description").with_text(team.description.clone().unwrap_or_default()))
            .with_child(list_node("repos", "repo", repos))
            .with_child(list_node("members", "member", members)))
    }

    fn repo_node(
        &self,
        org: &str,
        repo: &RepoRow,
        member_logins: &HashSet<&str>,
    ) -> Result<Node, SourceError> {
        use crate::core::source::ItemState::{Closed, Open};

        let name = repo.name.as_str();
        // Independent count queries; no shared snapshot across them
        let closed_issues = self.source.item_count(org, name, ItemKind::Issue, Closed)?;
        let closed_prs = self.source.item_count(org, name, ItemKind::PullRequest, Closed)?;
        let open_issues = self.source.item_count(org, name, ItemKind::Issue, Open)?;
        let open_prs = self.source.item_count(org, name, ItemKind::PullRequest, Open)?;
        let commits = self.source.commit_count(org, name)?;

        let collaborators = self.source.collaborators(repo.id)?;

        Ok(Node::new("repo")
            .with_attr("name", name)
            .with_attr("homepage", repo.homepage.as_deref().unwrap_or_default())
            .with_attr("private", repo.private)
            .with_attr("fork", repo.fork)
            .with_attr("closed_issue_count", closed_issues)
            .with_attr("closed_pr_count", closed_prs)
            .with_attr("open_issue_count", open_issues)
            .with_attr("open_pr_count", open_prs)
            .with_attr("has_wiki", repo.has_wiki)
            .with_attr("language", repo.language.as_deref().unwrap_or_default())
            .with_attr("stars", repo.stars)
            .with_attr("watchers", repo.watchers)
            .with_attr("forks", repo.forks)
            .with_attr("created_at", &repo.created_at)
            .with_attr("updated_at", &repo.updated_at)
            .with_attr("pushed_at", &repo.pushed_at)
            .with_attr("size", repo.size)
            .with_attr("commit_count", commits)
            .with_child(Node::new("description").with_text(repo.description.clone().unwrap_or_default()))
            .with_child(list_node("collaborators", "collaborator", collaborators))
            .with_child(self.issues_node(org, name)?)
            .with_child(self.issue_data_node(org, name, member_logins)?)
            .with_child(self.release_data_node(org, name)?))
    }

    fn issues_node(&self, org: &str, repo: &str) -> Result<Node, SourceError> {
        let items = self.source.open_items(org, repo)?;
        let mut node = Node::new("issues").with_attr("count", items.len());
        for item in &items {
            node.push(self.issue_node(item)?);
        }
        Ok(node)
    }

    fn issue_node(&self, item: &ItemRow) -> Result<Node, SourceError> {
        let mut node = Node::new("issue")
            .with_attr("id", item.id)
            .with_attr("number", item.number)
            .with_attr("user", &item.user_login)
            .with_attr("state", item.state)
            .with_attr("created_at", &item.created_at);
        match parse_timestamp(&item.created_at) {
            Some(created) => node.set_attr("age", whole_days_between(created, self.now)),
            None => tracing::debug!(item = item.id, "no age for unparsable creation time"),
        }
        node.set_attr("updated_at", &item.updated_at);
        node.set_attr("pull_request", item.is_pull_request());
        node.set_attr("comments", item.comment_count);
        if item.is_pull_request() {
            let changes = self.source.pull_request_changes(item.id)?;
            node.set_attr("prFileCount", changes.file_count);
            node.set_attr("prAdditions", changes.additions);
            node.set_attr("prDeletions", changes.deletions);
        }
        node.push(Node::new("title").with_text(clean_title(&item.title)));
        node.extend(self.source.labels(item.id)?.iter().map(label_node));
        Ok(node)
    }

    fn issue_data_node(
        &self,
        org: &str,
        repo: &str,
        member_logins: &HashSet<&str>,
    ) -> Result<Node, SourceError> {
        let mut node = Node::new("issue-data").with_attr("id", repo);

        for (tag, kind, milestone) in [
            ("issues-opened", ItemKind::Issue, Milestone::Opened),
            ("issues-closed", ItemKind::Issue, Milestone::Closed),
            ("prs-opened", ItemKind::PullRequest, Milestone::Opened),
            ("prs-closed", ItemKind::PullRequest, Milestone::Closed),
        ] {
            for year in self.source.yearly_counts(org, repo, kind, milestone)? {
                node.push(
                    Node::new(tag)
                        .with_attr("id", repo)
                        .with_attr("year", &year.year)
                        .with_attr("count", year.count),
                );
            }
        }

        let mut age_count = Node::new("age-count");
        for (tag, kind) in [("issue-count", ItemKind::Issue), ("pr-count", ItemKind::PullRequest)] {
            let histogram = self.close_latency(org, repo, kind)?;
            age_count.extend(histogram.iter().map(|(bucket, count)| {
                Node::new(tag).with_attr("age", bucket.label()).with_text(count.to_string())
            }));
        }
        node.push(age_count);

        let mut balance = Node::new("community-balance");
        for (tag, kind) in [("issue-count", ItemKind::Issue), ("pr-count", ItemKind::PullRequest)] {
            let authors = self.source.item_authors(org, repo, kind)?;
            let project = authors
                .iter()
                .filter(|login| member_logins.contains(login.as_str()))
                .count();
            let community = authors.len() - project;
            balance.push(Node::new(tag).with_attr("type", "community").with_text(community.to_string()));
            balance.push(Node::new(tag).with_attr("type", "project").with_text(project.to_string()));
        }
        node.push(balance);

        Ok(node)
    }

    fn close_latency(&self, org: &str, repo: &str, kind: ItemKind) -> Result<AgeHistogram, SourceError> {
        let mut histogram = AgeHistogram::new();
        for span in self.source.closed_spans(org, repo, kind)? {
            match (parse_timestamp(&span.created_at), parse_timestamp(&span.closed_at)) {
                (Some(created), Some(closed)) => histogram.record(days_between(created, closed)),
                _ => tracing::debug!(org = %org, repo = %repo, "skipping closed item with unparsable timestamps"),
            }
        }
        Ok(histogram)
    }

    fn release_data_node(&self, org: &str, repo: &str) -> Result<Node, SourceError> {
        let releases = self.source.releases(org, repo)?;
        Ok(Node::new("release-data").with_children(releases.into_iter().map(|release| {
            Node::new("release")
                .with_attr("id", release.id)
                .with_attr("url", release.url)
                .with_attr("published_at", release.published_at)
                .with_attr("author", release.author)
                .with_text(release.name)
        })))
    }
}

fn list_node(tag: &str, item_tag: &str, items: Vec<String>) -> Node {
    Node::new(tag).with_children(items.into_iter().map(|item| Node::new(item_tag).with_text(item)))
}

fn member_node(member: &MemberRow) -> Node {
    let mut node = Node::new("member")
        .with_attr("login", &member.login)
        .with_attr("avatar_url", &member.avatar_url)
        .with_attr("email", member.email.as_deref().unwrap_or_default())
        .with_attr("disabled_2fa", member.two_factor_disabled);
    if let (Some(internal), Some(email)) = (member.internal_login(), &member.internal_email) {
        node.set_attr("internal", internal);
        node.set_attr("employee_email", email);
    }
    node.with_child(Node::new("company").with_text(member.company.clone().unwrap_or_default()))
        .with_child(Node::new("name").with_text(member.name.clone().unwrap_or_default()))
}

/// Label element; spaces in the name become non-breaking spaces
pub(crate) fn label_node(label: &LabelRow) -> Node {
    Node::new("label")
        .with_attr("url", &label.url)
        .with_attr("color", &label.color)
        .with_text(label.name.replace(' ', "\u{a0}"))
}

/// Item title with backspace characters removed
pub(crate) fn clean_title(title: &str) -> String {
    title.replace('\u{8}', "")
}
