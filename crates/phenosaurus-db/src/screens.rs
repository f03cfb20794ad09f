//! Screen repository.
//!
//! All read paths are scoped: callers first resolve the screen ids visible to
//! their groups with [`ScreenRepository::authorized_ids`] and pass that set
//! to every subsequent query.

use std::sync::Arc;

use sqlx::QueryBuilder;
use tracing::debug;

use crate::database::{push_id_list, Database};
use crate::error::{DbError, Result};
use crate::schema::{NewScreen, Screen, ScreenType};

const SCREEN_COLUMNS: &str = "id, name, scientist_id, description, longdescription, sequenceids, \
     directory, induced, knockout, celline, screen_date, screentype";

/// Repository for screens and their group permissions.
#[derive(Clone)]
pub struct ScreenRepository {
    db: Arc<Database>,
}

impl ScreenRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // ── Authorization ────────────────────────────────────────────────────────

    /// Ids of all screens granted to at least one of `group_ids`, ascending.
    pub async fn authorized_ids(&self, group_ids: &[i64]) -> Result<Vec<i64>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::new(
            "SELECT DISTINCT screen_id FROM screen_permissions WHERE group_id IN ",
        );
        push_id_list(&mut qb, group_ids);
        qb.push(" ORDER BY screen_id");

        let ids: Vec<i64> = qb.build_query_scalar::<i64>().fetch_all(self.db.pool()).await?;
        debug!("groups {:?} may see {} screen(s)", group_ids, ids.len());
        Ok(ids)
    }

    /// The screens in `authorized`, ordered by name.
    pub async fn authorized(&self, authorized: &[i64]) -> Result<Vec<Screen>> {
        self.select_scoped(authorized, None).await
    }

    /// Screens of one type in `authorized`, ordered by name.
    pub async fn authorized_of_type(
        &self,
        authorized: &[i64],
        screentype: ScreenType,
    ) -> Result<Vec<Screen>> {
        self.select_scoped(authorized, Some(screentype)).await
    }

    /// A single screen, or `None` when it doesn't exist or isn't in `authorized`.
    pub async fn find_authorized(&self, id: i64, authorized: &[i64]) -> Result<Option<Screen>> {
        if !authorized.contains(&id) {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn select_scoped(
        &self,
        authorized: &[i64],
        screentype: Option<ScreenType>,
    ) -> Result<Vec<Screen>> {
        if authorized.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::new(format!("SELECT {SCREEN_COLUMNS} FROM screens WHERE id IN "));
        push_id_list(&mut qb, authorized);
        if let Some(screentype) = screentype {
            qb.push(" AND screentype = ").push_bind(screentype);
        }
        qb.push(" ORDER BY name, id");

        Ok(qb.build_query_as::<Screen>().fetch_all(self.db.pool()).await?)
    }

    // ── Unscoped lookups (admin / import) ────────────────────────────────────

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Screen>> {
        let screen = sqlx::query_as::<_, Screen>(&format!(
            "SELECT {SCREEN_COLUMNS} FROM screens WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(screen)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Screen>> {
        let screen = sqlx::query_as::<_, Screen>(&format!(
            "SELECT {SCREEN_COLUMNS} FROM screens WHERE name = ? ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(screen)
    }

    pub async fn all(&self) -> Result<Vec<Screen>> {
        let screens = sqlx::query_as::<_, Screen>(&format!(
            "SELECT {SCREEN_COLUMNS} FROM screens ORDER BY name, id"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(screens)
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Insert a screen and return its id. Names must be unique because
    /// imports refer to screens by name.
    pub async fn create(&self, screen: &NewScreen) -> Result<i64> {
        if screen.name.trim().is_empty() {
            return Err(DbError::Invalid("screen name must not be empty".to_string()));
        }
        if self.find_by_name(&screen.name).await?.is_some() {
            return Err(DbError::Duplicate(format!("screen {}", screen.name)));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO screens
                (name, scientist_id, description, longdescription, sequenceids,
                 directory, induced, knockout, celline, screen_date, screentype)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&screen.name)
        .bind(screen.scientist_id)
        .bind(&screen.description)
        .bind(&screen.longdescription)
        .bind(&screen.sequenceids)
        .bind(&screen.directory)
        .bind(screen.induced)
        .bind(screen.knockout)
        .bind(screen.celline)
        .bind(screen.screen_date)
        .bind(screen.screentype)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        debug!("Created screen {} ({})", screen.name, id);
        Ok(id)
    }

    /// Allow members of `group_id` to see `screen_id`. Granting twice is a no-op.
    pub async fn grant(&self, screen_id: i64, group_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO screen_permissions (screen_id, group_id) VALUES (?, ?)",
        )
        .bind(screen_id)
        .bind(group_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn revoke(&self, screen_id: i64, group_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM screen_permissions WHERE screen_id = ? AND group_id = ?")
            .bind(screen_id)
            .bind(group_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Groups that may see a screen.
    pub async fn group_ids(&self, screen_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT group_id FROM screen_permissions WHERE screen_id = ? ORDER BY group_id",
        )
        .bind(screen_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }
}
