//! Runtime settings stored as key/value rows.
//!
//! Rows override the display defaults from the configuration file; see
//! `DisplayConfig::with_overrides` in `phenosaurus-common`.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::Setting;

#[derive(Clone)]
pub struct SettingRepository {
    db: Arc<Database>,
}

impl SettingRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn all(&self) -> Result<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT id, variable_name, value, comment FROM settings ORDER BY variable_name",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(settings)
    }

    pub async fn get(&self, variable_name: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM settings WHERE variable_name = ?")
            .bind(variable_name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(value)
    }

    /// Insert or replace the value of a setting.
    pub async fn set(&self, variable_name: &str, value: &str, comment: &str) -> Result<()> {
        if variable_name.is_empty() || variable_name.chars().count() > 50 {
            return Err(DbError::Invalid(format!("invalid setting name '{variable_name}'")));
        }
        sqlx::query(
            r#"
            INSERT INTO settings (variable_name, value, comment) VALUES (?, ?, ?)
            ON CONFLICT(variable_name) DO UPDATE SET value = excluded.value, comment = excluded.comment
            "#,
        )
        .bind(variable_name)
        .bind(value)
        .bind(comment)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = Database::open_in_memory().await.unwrap().into_shared();
        let repo = SettingRepository::new(db);
        assert!(repo.get("pvalue_cutoff").await.unwrap().is_none());

        repo.set("pvalue_cutoff", "0.05", "").await.unwrap();
        repo.set("pvalue_cutoff", "0.01", "stricter").await.unwrap();

        assert_eq!(repo.get("pvalue_cutoff").await.unwrap().as_deref(), Some("0.01"));
        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].comment, "stricter");
    }
}
