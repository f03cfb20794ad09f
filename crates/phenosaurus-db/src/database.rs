//! Database connection and table management.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::Result;
use crate::schema;

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    url: String,
}

impl Database {
    /// Open or create a database at the specified URL
    /// (e.g. `sqlite://phenosaurus.db`).
    pub async fn open(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        info!("Opened database {}", url);
        Ok(Self { pool, url: url.to_string() })
    }

    /// Open a private in-memory database with the schema already created.
    /// The pool holds exactly one connection that never expires, because
    /// every new SQLite memory connection starts out empty.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool, url: "sqlite::memory:".to_string() };
        db.initialize().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Create all tables and indexes if they don't exist.
    pub async fn initialize(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Database tables created successfully");
        Ok(())
    }

    /// Row counts of the main tables.
    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            screens: self.count(schema::TABLE_SCREENS).await?,
            genes: self.count(schema::TABLE_GENES).await?,
            locations: self.count(schema::TABLE_LOCATIONS).await?,
            ips_datapoints: self.count(schema::TABLE_IPS_DATAPOINTS).await?,
            pss_datapoints: self.count(schema::TABLE_PSS_DATAPOINTS).await?,
            custom_tracks: self.count(schema::TABLE_CUSTOM_TRACKS).await?,
            updates: self.count(schema::TABLE_UPDATE_HISTORY).await?,
        })
    }

    async fn count(&self, table: &'static str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// Row counts shown on the admin page.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DatabaseStats {
    pub screens: u64,
    pub genes: u64,
    pub locations: u64,
    pub ips_datapoints: u64,
    pub pss_datapoints: u64,
    pub custom_tracks: u64,
    pub updates: u64,
}

/// Append `(?, ?, …)` binding every id. Callers must not pass an empty slice.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Append `(?, ?, …)` binding every string. Callers must not pass an empty slice.
pub(crate) fn push_name_list<'a>(qb: &mut QueryBuilder<'a, Sqlite>, names: &'a [String]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for name in names {
        separated.push_bind(name.as_str());
    }
    separated.push_unseparated(")");
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        username       TEXT NOT NULL UNIQUE,
        api_token_hash TEXT UNIQUE,
        is_staff       BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_groups (
        user_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, group_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS screens (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL,
        scientist_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
        description     TEXT NOT NULL DEFAULT '',
        longdescription TEXT NOT NULL DEFAULT '',
        sequenceids     TEXT NOT NULL DEFAULT '',
        directory       TEXT NOT NULL DEFAULT '',
        induced         BOOLEAN NOT NULL DEFAULT FALSE,
        knockout        BOOLEAN NOT NULL DEFAULT FALSE,
        celline         TEXT NOT NULL DEFAULT 'HAP1' CHECK (celline IN ('HAP1', 'KBM7')),
        screen_date     DATETIME,
        screentype      TEXT NOT NULL DEFAULT 'IP' CHECK (screentype IN ('PS', 'SL', 'IP'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_screens_name ON screens(name)",
    r#"
    CREATE TABLE IF NOT EXISTS screen_permissions (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        screen_id INTEGER NOT NULL REFERENCES screens(id) ON DELETE CASCADE,
        group_id  INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        UNIQUE (screen_id, group_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genes (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        chromosome  TEXT NOT NULL DEFAULT '' CHECK (length(chromosome) <= 2),
        orientation TEXT NOT NULL DEFAULT '' CHECK (length(orientation) <= 1)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_genes_name ON genes(name)",
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        gene_id  INTEGER NOT NULL REFERENCES genes(id) ON DELETE CASCADE,
        startpos INTEGER NOT NULL,
        endpos   INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_locations_gene ON locations(gene_id)",
    r#"
    CREATE TABLE IF NOT EXISTS ips_datapoints (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        screen_id    INTEGER NOT NULL REFERENCES screens(id) ON DELETE CASCADE,
        gene_id      INTEGER NOT NULL REFERENCES genes(id) ON DELETE CASCADE,
        low          INTEGER NOT NULL,
        lowtotal     INTEGER NOT NULL,
        high         INTEGER NOT NULL,
        hightotal    INTEGER NOT NULL,
        lowcor       INTEGER NOT NULL,
        lowtotalcor  INTEGER NOT NULL,
        highcor      INTEGER NOT NULL,
        hightotalcor INTEGER NOT NULL,
        pv           REAL NOT NULL,
        fcpv         REAL NOT NULL,
        mi           REAL NOT NULL,
        insertions   INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ips_screen ON ips_datapoints(screen_id)",
    "CREATE INDEX IF NOT EXISTS idx_ips_gene ON ips_datapoints(gene_id)",
    r#"
    CREATE TABLE IF NOT EXISTS pss_datapoints (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        screen_id INTEGER NOT NULL REFERENCES screens(id) ON DELETE CASCADE,
        gene_id   INTEGER NOT NULL REFERENCES genes(id) ON DELETE CASCADE,
        nm        INTEGER NOT NULL,
        tnm       INTEGER NOT NULL,
        ct        INTEGER NOT NULL,
        tct       INTEGER NOT NULL,
        cct       INTEGER NOT NULL,
        ctct      INTEGER NOT NULL,
        pv        REAL NOT NULL,
        fcpv      REAL NOT NULL,
        ti        INTEGER NOT NULL,
        mi        REAL NOT NULL,
        radius    REAL NOT NULL,
        seq       INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pss_screen ON pss_datapoints(screen_id)",
    r#"
    CREATE TABLE IF NOT EXISTS custom_tracks (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name        TEXT NOT NULL CHECK (length(name) <= 100),
        description TEXT NOT NULL DEFAULT '' CHECK (length(description) <= 400),
        genelist    TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS update_history (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        date    DATE NOT NULL,
        version TEXT NOT NULL CHECK (length(version) <= 10),
        changes TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        variable_name TEXT NOT NULL UNIQUE CHECK (length(variable_name) <= 50),
        value         TEXT NOT NULL,
        comment       TEXT NOT NULL DEFAULT ''
    )
    "#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.initialize().await.unwrap();
        let stats = db.stats().await.unwrap();
        assert_eq!(stats.screens, 0);
        assert_eq!(stats.genes, 0);
        assert_eq!(stats.ips_datapoints, 0);
    }
}
