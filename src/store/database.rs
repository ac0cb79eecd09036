use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::release::index::ReleaseIndex;
use crate::release::snapshot::FeatureGroup;
use crate::release::types::Release;
use crate::store::error::SourceError;
use crate::store::source::ReleaseSource;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: imported_at column
    &["ALTER TABLE releases ADD COLUMN imported_at INTEGER NOT NULL DEFAULT 0"],
];

/// SQLite store of release documents keyed by id and feature version
pub struct ReleaseDatabase {
    conn: Mutex<Connection>,
}

impl ReleaseDatabase {
    pub fn new(db_path: &Path) -> Result<Self, SourceError> {
        info!("Initializing release database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let database = Self {
            conn: Mutex::new(conn),
        };

        database.create_schema()?;
        info!("Release database initialized successfully");

        Ok(database)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, SourceError> {
        self.conn.lock().map_err(|_| SourceError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), SourceError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS releases (
                id TEXT PRIMARY KEY,
                feature_version INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                document TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_feature_version ON releases(feature_version)",
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), SourceError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    match conn.execute(sql, []) {
                        Ok(_) => {}
                        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
                            if msg.contains("duplicate column name") =>
                        {
                            debug!("Column already exists, skipping: {}", sql);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    /// Insert or replace `releases`, filed under their major version
    pub fn upsert_releases(&self, releases: &[Release]) -> Result<usize, SourceError> {
        if releases.is_empty() {
            return Ok(0);
        }

        debug!("Saving {} releases", releases.len());
        let now = Utc::now().timestamp_millis();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO releases (id, feature_version, updated_at, document, imported_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    feature_version = excluded.feature_version,
                    updated_at = excluded.updated_at,
                    document = excluded.document,
                    imported_at = excluded.imported_at
                "#,
            )?;
            for release in releases {
                let document = serde_json::to_string(release)?;
                stmt.execute((
                    &release.id,
                    release.feature_version(),
                    release.updated_at.timestamp_millis(),
                    document,
                    now,
                ))?;
            }
        }
        tx.commit()?;

        Ok(releases.len())
    }

    /// Returns true if a release was deleted
    pub fn remove_release(&self, id: &str) -> Result<bool, SourceError> {
        let conn = self.lock_conn()?;
        let rows_deleted = conn.execute("DELETE FROM releases WHERE id = ?1", [id])?;
        Ok(rows_deleted > 0)
    }

    /// Load every release stored for `feature_version`
    ///
    /// Fails with `NotFound` when none are stored.
    pub fn read_feature_group(&self, feature_version: u32) -> Result<FeatureGroup, SourceError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT document FROM releases WHERE feature_version = ?1")?;

        let documents = stmt
            .query_map([feature_version], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        if documents.is_empty() {
            return Err(SourceError::NotFound(feature_version));
        }

        let releases = documents
            .iter()
            .map(|document| serde_json::from_str::<Release>(document))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureGroup::new(
            feature_version,
            ReleaseIndex::from_releases(releases),
        ))
    }

    /// When a release was last written, None for an empty database
    pub fn last_imported_at(&self) -> Result<Option<DateTime<Utc>>, SourceError> {
        let conn = self.lock_conn()?;
        let millis: Option<i64> = conn.query_row(
            "SELECT MAX(imported_at) FROM releases WHERE imported_at > 0",
            [],
            |row| row.get(0),
        )?;

        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }

    /// Feature versions with at least one stored release, ascending
    pub fn feature_versions(&self) -> Result<Vec<u32>, SourceError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT feature_version FROM releases ORDER BY feature_version")?;

        let versions = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<u32>, _>>()?;

        Ok(versions)
    }
}

#[async_trait::async_trait]
impl ReleaseSource for ReleaseDatabase {
    async fn read_release_data(&self, feature_version: u32) -> Result<FeatureGroup, SourceError> {
        self.read_feature_group(feature_version)
    }
}
