//! Changelog shown on the updates page.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::UpdateEntry;

#[derive(Clone)]
pub struct UpdateRepository {
    db: Arc<Database>,
}

impl UpdateRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All entries, newest first.
    pub async fn all_newest_first(&self) -> Result<Vec<UpdateEntry>> {
        let entries = sqlx::query_as::<_, UpdateEntry>(
            "SELECT id, date, version, changes FROM update_history ORDER BY date DESC, id DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(entries)
    }

    pub async fn insert(&self, date: NaiveDate, version: &str, changes: &str) -> Result<i64> {
        if version.is_empty() || version.chars().count() > 10 {
            return Err(DbError::Invalid(format!("invalid version label '{version}'")));
        }
        let id = sqlx::query("INSERT INTO update_history (date, version, changes) VALUES (?, ?, ?)")
            .bind(date)
            .bind(version)
            .bind(changes)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newest_first() {
        let db = Database::open_in_memory().await.unwrap().into_shared();
        let repo = UpdateRepository::new(db);
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        repo.insert(d(2019, 3, 1), "1.0", "First release").await.unwrap();
        repo.insert(d(2020, 6, 15), "1.1", "Gene finder").await.unwrap();

        let versions: Vec<_> = repo
            .all_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.version)
            .collect();
        assert_eq!(versions, vec!["1.1", "1.0"]);
        assert!(repo.insert(d(2021, 1, 1), "01234567890", "").await.is_err());
    }
}
