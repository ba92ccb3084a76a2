//! SQLite-backed row source
//!
//! Reads the tables populated by the GitHub sync. The schema ships embedded
//! in the binary so a fresh database can be initialized without extra files.

use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use rust_embed::Embed;
use std::collections::HashSet;
use std::path::Path;

use super::{
    ClosedSpan, ItemKind, ItemRow, ItemState, LabelRow, MemberRow, Milestone, OrgRow, PrChanges,
    ReleaseRow, RepoRow, RowSource, SourceError, TeamRow, YearCount,
};

#[derive(Embed)]
#[folder = "schema/"]
struct EmbeddedSchema;

const SCHEMA_FILE: &str = "sync.sql";

const ITEM_COLUMNS: &str = "id, item_number, org, repo, user_login, state, \
     title, created_at, updated_at, comment_count, pull_request_url";

/// Row source over a single SQLite connection, reused serially
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open an existing database
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound {
                what: format!("database {}", path.display()),
            });
        }
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Create a database file and initialize its schema
    pub fn create(path: &Path) -> Result<Self, SourceError> {
        let source = Self {
            conn: Connection::open(path)?,
        };
        source.init_schema()?;
        Ok(source)
    }

    /// In-memory database with the schema initialized
    pub fn open_in_memory() -> Result<Self, SourceError> {
        let source = Self {
            conn: Connection::open_in_memory()?,
        };
        source.init_schema()?;
        Ok(source)
    }

    /// Create any missing tables
    pub fn init_schema(&self) -> Result<(), SourceError> {
        let file = EmbeddedSchema::get(SCHEMA_FILE)
            .ok_or_else(|| SourceError::Schema(format!("{} is not embedded", SCHEMA_FILE)))?;
        let sql = std::str::from_utf8(&file.data)
            .map_err(|e| SourceError::Schema(format!("{} is not UTF-8: {}", SCHEMA_FILE, e)))?;
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Underlying connection, for seeding and maintenance
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn strings<P: Params>(&self, sql: &str, params: P) -> Result<Vec<String>, SourceError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn count<P: Params>(&self, sql: &str, params: P) -> Result<i64, SourceError> {
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }

    fn items<P: Params>(&self, sql: &str, params: P) -> Result<Vec<ItemRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, item_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        number: row.get(1)?,
        org: row.get(2)?,
        repo: row.get(3)?,
        user_login: row.get(4)?,
        state: row.get(5)?,
        title: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        comment_count: row.get(9)?,
        pull_request_url: row.get(10)?,
    })
}

impl RowSource for SqliteSource {
    fn organization(&self, org: &str) -> Result<OrgRow, SourceError> {
        self.conn
            .query_row(
                "SELECT login, avatar_url, description, blog, name, location, email, created_at
                 FROM organization WHERE login = ?1 COLLATE NOCASE",
                [org],
                |row| {
                    Ok(OrgRow {
                        login: row.get(0)?,
                        avatar_url: row.get(1)?,
                        description: row.get(2)?,
                        blog: row.get(3)?,
                        name: row.get(4)?,
                        location: row.get(5)?,
                        email: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| SourceError::NotFound {
                what: format!("organization '{}'", org),
            })
    }

    // Teams belong to the org that owns them, with or without repositories
    fn teams(&self, org: &str) -> Result<Vec<TeamRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, slug, description FROM team WHERE org = ?1 ORDER BY slug, id",
        )?;
        let rows = stmt.query_map([org], |row| {
            Ok(TeamRow {
                id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get(2)?,
                description: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn team_repositories(&self, team_id: i64) -> Result<Vec<String>, SourceError> {
        self.strings(
            "SELECT r.name FROM team_to_repository ttr
             JOIN repository r ON r.id = ttr.repository_id
             WHERE ttr.team_id = ?1 AND r.fork = 0
             ORDER BY r.name",
            [team_id],
        )
    }

    fn team_members(&self, team_id: i64) -> Result<Vec<String>, SourceError> {
        self.strings(
            "SELECT m.login FROM team_to_member ttm
             JOIN member m ON m.id = ttm.member_id
             WHERE ttm.team_id = ?1
             ORDER BY m.login",
            [team_id],
        )
    }

    fn repositories(&self, org: &str) -> Result<Vec<RepoRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, homepage, private, fork, has_wiki, language, stars, watchers,
                    forks, created_at, updated_at, pushed_at, size, description
             FROM repository WHERE org = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map([org], |row| {
            Ok(RepoRow {
                id: row.get(0)?,
                name: row.get(1)?,
                homepage: row.get(2)?,
                private: row.get(3)?,
                fork: row.get(4)?,
                has_wiki: row.get(5)?,
                language: row.get(6)?,
                stars: row.get(7)?,
                watchers: row.get(8)?,
                forks: row.get(9)?,
                created_at: row.get(10)?,
                updated_at: row.get(11)?,
                pushed_at: row.get(12)?,
                size: row.get(13)?,
                description: row.get(14)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn item_count(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
        state: ItemState,
    ) -> Result<i64, SourceError> {
        let sql = format!(
            "SELECT COUNT(*) FROM items WHERE org = ?1 AND repo = ?2 AND state = ?3 AND {}",
            kind.predicate()
        );
        self.count(&sql, params![org, repo, state])
    }

    fn commit_count(&self, org: &str, repo: &str) -> Result<i64, SourceError> {
        self.count(
            "SELECT COUNT(*) FROM commits WHERE org = ?1 AND repo = ?2",
            [org, repo],
        )
    }

    fn collaborators(&self, repo_id: i64) -> Result<Vec<String>, SourceError> {
        self.strings(
            "SELECT m.login FROM repository_to_member rtm
             JOIN member m ON m.id = rtm.member_id
             WHERE rtm.repo_id = ?1
             ORDER BY m.login",
            [repo_id],
        )
    }

    fn open_items(&self, org: &str, repo: &str) -> Result<Vec<ItemRow>, SourceError> {
        let sql = format!(
            "SELECT {} FROM items WHERE org = ?1 AND repo = ?2 AND state = 'open'
             ORDER BY item_number",
            ITEM_COLUMNS
        );
        self.items(&sql, [org, repo])
    }

    fn open_items_in_org(&self, org: &str) -> Result<Vec<ItemRow>, SourceError> {
        let sql = format!(
            "SELECT {} FROM items WHERE org = ?1 AND state = 'open'
             ORDER BY repo, item_number",
            ITEM_COLUMNS
        );
        self.items(&sql, [org])
    }

    fn pull_request_changes(&self, item_id: i64) -> Result<PrChanges, SourceError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(filename), COALESCE(SUM(additions), 0), COALESCE(SUM(deletions), 0)
             FROM pull_request_files WHERE pull_request_id = ?1",
            [item_id],
            |row| {
                Ok(PrChanges {
                    file_count: row.get(0)?,
                    additions: row.get(1)?,
                    deletions: row.get(2)?,
                })
            },
        )?)
    }

    fn labels(&self, item_id: i64) -> Result<Vec<LabelRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT l.url, l.name, l.color FROM item_to_label itl
             JOIN labels l ON l.url = itl.url
             WHERE itl.item_id = ?1
             ORDER BY l.name",
        )?;
        let rows = stmt.query_map([item_id], |row| {
            Ok(LabelRow {
                url: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn yearly_counts(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
        milestone: Milestone,
    ) -> Result<Vec<YearCount>, SourceError> {
        let sql = match milestone {
            Milestone::Opened => format!(
                "SELECT substr(created_at, 1, 4) AS year, COUNT(*) FROM items
                 WHERE org = ?1 AND repo = ?2 AND {}
                 GROUP BY year ORDER BY year DESC",
                kind.predicate()
            ),
            Milestone::Closed => format!(
                "SELECT substr(closed_at, 1, 4) AS year, COUNT(*) FROM items
                 WHERE org = ?1 AND repo = ?2 AND state = 'closed' AND closed_at IS NOT NULL
                   AND {}
                 GROUP BY year ORDER BY year DESC",
                kind.predicate()
            ),
        };
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([org, repo], |row| {
            Ok(YearCount {
                year: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn closed_spans(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
    ) -> Result<Vec<ClosedSpan>, SourceError> {
        let sql = format!(
            "SELECT created_at, closed_at FROM items
             WHERE org = ?1 AND repo = ?2 AND state = 'closed' AND closed_at IS NOT NULL AND {}
             ORDER BY id",
            kind.predicate()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([org, repo], |row| {
            Ok(ClosedSpan {
                created_at: row.get(0)?,
                closed_at: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn item_authors(
        &self,
        org: &str,
        repo: &str,
        kind: ItemKind,
    ) -> Result<Vec<String>, SourceError> {
        let sql = format!(
            "SELECT user_login FROM items WHERE org = ?1 AND repo = ?2 AND {} ORDER BY id",
            kind.predicate()
        );
        self.strings(&sql, [org, repo])
    }

    fn releases(&self, org: &str, repo: &str) -> Result<Vec<ReleaseRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, html_url, name, published_at, author FROM releases
             WHERE org = ?1 AND repo = ?2
             ORDER BY published_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([org, repo], |row| {
            Ok(ReleaseRow {
                id: row.get(0)?,
                url: row.get(1)?,
                name: row.get(2)?,
                published_at: row.get(3)?,
                author: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn members(&self, org: &str) -> Result<Vec<MemberRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT m.login, m.avatar_url, m.email, m.name, m.company,
                    m.two_factor_disabled, u.email
             FROM organization o
             JOIN organization_to_member otm ON otm.org_id = o.id
             JOIN member m ON m.id = otm.member_id
             LEFT OUTER JOIN users u ON u.login = m.login
             WHERE o.login = ?1 COLLATE NOCASE
             ORDER BY m.login",
        )?;
        let rows = stmt.query_map([org], |row| {
            Ok(MemberRow {
                login: row.get(0)?,
                avatar_url: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                company: row.get(4)?,
                two_factor_disabled: row.get(5)?,
                internal_email: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn known_member_logins(&self) -> Result<HashSet<String>, SourceError> {
        Ok(self
            .strings("SELECT DISTINCT login FROM member", [])?
            .into_iter()
            .collect())
    }
}
