//! Shared test helpers for integration tests
//!
//! Builds a temporary data directory with a config file and a seeded sync
//! database: organizations `acme` and `beta`, login `bob`.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use dashboard::core::{Config, SqliteSource};

/// Helper to get a dashboard command
pub fn dashboard() -> Command {
    Command::new(cargo::cargo_bin!("dashboard"))
}

pub const SEED_SQL: &str = "
INSERT INTO organization (id, login, avatar_url, description, name)
    VALUES (1, 'acme', 'https://avatars/acme.png', 'Acme widgets', 'Acme'),
           (2, 'beta', 'https://avatars/beta.png', '', 'Beta'),
           (3, 'bob', 'https://avatars/bob.png', '', '');

INSERT INTO member (id, login, avatar_url, name)
    VALUES (1, 'alice', 'a.png', 'Alice'), (2, 'root', 'r.png', 'Root'), (3, 'carol', 'c.png', 'Carol');
INSERT INTO organization_to_member VALUES (1, 1), (1, 2), (2, 3);

INSERT INTO repository (id, org, name, language) VALUES
    (10, 'acme', 'widgets', 'Rust'),
    (11, 'acme', 'legacy', 'C'),
    (20, 'beta', 'tools', 'Go'),
    (30, 'bob', 'dotfiles', 'Shell');

INSERT INTO team (id, org, name, slug, description) VALUES
    (1, 'acme', 'Core', 'core', 'Core maintainers'),
    (2, 'acme', 'Owners', 'owners', NULL),
    (3, 'beta', 'Core', 'core', NULL);
INSERT INTO team_to_repository VALUES (1, 10), (2, 10), (2, 11), (3, 20);
INSERT INTO team_to_member VALUES (1, 1), (2, 2), (3, 3);

INSERT INTO items (id, item_number, org, repo, user_login, state, title, created_at, closed_at, comment_count) VALUES
    (100, 1, 'acme', 'widgets', 'stranger', 'open', 'Crashes on start', '2015-01-01T00:00:00Z', NULL, 0),
    (101, 2, 'acme', 'widgets', 'alice', 'closed', 'Typo', '2015-01-01T00:00:00Z', '2015-01-01T01:12:00Z', 1),
    (102, 1, 'beta', 'tools', 'carol', 'open', 'Faster', '2015-02-01T00:00:00Z', NULL, 3);
INSERT INTO labels VALUES ('https://x/labels/bug', 'bug report', 'ee0701');
INSERT INTO item_to_label VALUES ('https://x/labels/bug', 100);

INSERT INTO releases (id, org, repo, html_url, name, published_at, author) VALUES
    (1, 'acme', 'widgets', 'https://x/r/1', 'v1.0', '2015-01-01', 'alice'),
    (2, 'acme', 'widgets', 'https://x/r/2', 'v1.1', '2015-03-01', 'alice');
";

pub struct Fixture {
    pub tmp: TempDir,
    pub config_path: PathBuf,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn config(&self) -> Config {
        Config::load(&self.config_path).unwrap()
    }

    pub fn dash_file(&self, name: &str) -> PathBuf {
        self.data_dir().join("dash-xml").join(format!("{}.xml", name))
    }

    /// Write a report fragment for an owner under `review-xml` or `db-report-xml`
    pub fn write_fragment(&self, dir: &str, org: &str, content: &str) {
        let dir = self.data_dir().join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.xml", org)), content).unwrap();
    }

    pub fn source(&self) -> SqliteSource {
        SqliteSource::open(&self.config().database_path()).unwrap()
    }
}

/// Config file plus seeded database for the given owners
pub fn fixture(organizations: &[&str], logins: &[&str], extra: &str) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("dashboard.yaml");
    let yaml = format!(
        "dashboard:\n  organizations: [{}]\n  logins: [{}]\n  private-access: [acme]\n  data-directory: data\n  github-url: https://github.example.com\n{}",
        organizations.join(", "),
        logins.join(", "),
        extra
    );
    fs::write(&config_path, yaml).unwrap();

    let db_dir = tmp.path().join("data").join("db");
    fs::create_dir_all(&db_dir).unwrap();
    let source = SqliteSource::create(&db_dir.join("gh-sync.db")).unwrap();
    source.connection().execute_batch(SEED_SQL).unwrap();

    Fixture { tmp, config_path }
}

/// The standard fixture: two organizations and one login
pub fn standard_fixture() -> Fixture {
    fixture(&["acme", "beta"], &["bob"], "")
}
