//! Custom gene tracks owned by users.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::CustomTrack;

#[derive(Clone)]
pub struct TrackRepository {
    db: Arc<Database>,
}

impl TrackRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a track. Gene names are normalised to single-space separation.
    pub async fn create(&self, user_id: i64, name: &str, description: &str, genes: &[String]) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(DbError::Invalid("track name must not be empty".to_string()));
        }
        if name.chars().count() > 100 || description.chars().count() > 400 {
            return Err(DbError::Invalid("track name or description too long".to_string()));
        }
        let genelist = genes.join(" ");
        let id = sqlx::query(
            "INSERT INTO custom_tracks (user_id, name, description, genelist) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(name.trim())
        .bind(description)
        .bind(genelist)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn for_user(&self, user_id: i64) -> Result<Vec<CustomTrack>> {
        let tracks = sqlx::query_as::<_, CustomTrack>(
            "SELECT id, user_id, name, description, genelist FROM custom_tracks WHERE user_id = ? ORDER BY name, id",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(tracks)
    }

    pub async fn all(&self) -> Result<Vec<CustomTrack>> {
        let tracks = sqlx::query_as::<_, CustomTrack>(
            "SELECT id, user_id, name, description, genelist FROM custom_tracks ORDER BY user_id, name, id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserRepository;

    #[tokio::test]
    async fn test_tracks_per_user() {
        let db = Database::open_in_memory().await.unwrap().into_shared();
        let users = UserRepository::new(db.clone());
        let alice = users.create_user("alice", None, false).await.unwrap();
        let bob = users.create_user("bob", None, false).await.unwrap();

        let repo = TrackRepository::new(db);
        let genes = vec!["EZH2".to_string(), "EED".to_string()];
        repo.create(alice, "PRC2", "polycomb", &genes).await.unwrap();
        repo.create(bob, "empty", "", &[]).await.unwrap();

        let tracks = repo.for_user(alice).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].genes(), vec!["EZH2", "EED"]);
        assert_eq!(repo.all().await.unwrap().len(), 2);
        assert!(matches!(repo.create(alice, " ", "", &[]).await, Err(DbError::Invalid(_))));
    }
}
