//! Users, groups and API tokens.
//!
//! Tokens are never stored in clear text; only their SHA-256 digest is kept.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::{Group, User};

/// Hex SHA-256 digest of an API token.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // ── Groups ───────────────────────────────────────────────────────────────

    pub async fn create_group(&self, name: &str) -> Result<i64> {
        if self.find_group(name).await?.is_some() {
            return Err(DbError::Duplicate(format!("group {name}")));
        }
        let id = sqlx::query("INSERT INTO groups (name) VALUES (?)")
            .bind(name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn find_group(&self, name: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(group)
    }

    pub async fn groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, name FROM groups ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;
        Ok(groups)
    }

    // ── Users ────────────────────────────────────────────────────────────────

    /// Create a user. When `token` is given it becomes the user's API token.
    pub async fn create_user(&self, username: &str, token: Option<&str>, is_staff: bool) -> Result<i64> {
        if self.find_by_username(username).await?.is_some() {
            return Err(DbError::Duplicate(format!("user {username}")));
        }
        let id = sqlx::query("INSERT INTO users (username, api_token_hash, is_staff) VALUES (?, ?, ?)")
            .bind(username)
            .bind(token.map(hash_token))
            .bind(is_staff)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, is_staff FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(user)
    }

    /// Look a user up by clear-text API token.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, is_staff FROM users WHERE api_token_hash = ?",
        )
        .bind(hash_token(token))
        .fetch_optional(self.db.pool())
        .await?;
        Ok(user)
    }

    pub async fn add_to_group(&self, user_id: i64, group_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(group_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn group_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT group_id FROM user_groups WHERE user_id = ? ORDER BY group_id",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }
}
