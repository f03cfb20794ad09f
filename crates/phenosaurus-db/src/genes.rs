//! Gene repository.
//!
//! Genes are not subject to authorization; the full table is always visible.

use std::sync::Arc;

use sqlx::QueryBuilder;

use crate::database::{push_name_list, Database};
use crate::error::{DbError, Result};
use crate::schema::{Gene, Location, NewGene};

#[derive(Clone)]
pub struct GeneRepository {
    db: Arc<Database>,
}

impl GeneRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All genes ordered by name.
    pub async fn all(&self) -> Result<Vec<Gene>> {
        let genes = sqlx::query_as::<_, Gene>(
            "SELECT id, name, description, chromosome, orientation FROM genes ORDER BY name",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(genes)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Gene>> {
        let gene = sqlx::query_as::<_, Gene>(
            "SELECT id, name, description, chromosome, orientation FROM genes WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(gene)
    }

    /// Genes whose name is exactly one of `names`, ordered by name.
    pub async fn find_by_names(&self, names: &[String]) -> Result<Vec<Gene>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::new(
            "SELECT id, name, description, chromosome, orientation FROM genes WHERE name IN ",
        );
        push_name_list(&mut qb, names);
        qb.push(" ORDER BY name");
        Ok(qb.build_query_as::<Gene>().fetch_all(self.db.pool()).await?)
    }

    /// Names of genes containing `fragment`, case-insensitive.
    pub async fn names_containing(&self, fragment: &str) -> Result<Vec<String>> {
        let pattern = format!("%{}%", escape_like(fragment));
        let names = sqlx::query_scalar(
            "SELECT name FROM genes WHERE name LIKE ? ESCAPE '\\' ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(self.db.pool())
        .await?;
        Ok(names)
    }

    pub async fn insert(&self, gene: &NewGene) -> Result<i64> {
        if gene.name.trim().is_empty() {
            return Err(DbError::Invalid("gene name must not be empty".to_string()));
        }
        if self.find_by_name(&gene.name).await?.is_some() {
            return Err(DbError::Duplicate(format!("gene {}", gene.name)));
        }
        let id = sqlx::query(
            "INSERT INTO genes (name, description, chromosome, orientation) VALUES (?, ?, ?, ?)",
        )
        .bind(&gene.name)
        .bind(&gene.description)
        .bind(&gene.chromosome)
        .bind(&gene.orientation)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    // ── Locations ────────────────────────────────────────────────────────────

    pub async fn add_location(&self, gene_id: i64, startpos: i64, endpos: i64) -> Result<i64> {
        if endpos < startpos {
            return Err(DbError::Invalid(format!(
                "location end {endpos} lies before start {startpos}"
            )));
        }
        let id = sqlx::query("INSERT INTO locations (gene_id, startpos, endpos) VALUES (?, ?, ?)")
            .bind(gene_id)
            .bind(startpos)
            .bind(endpos)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn locations(&self, gene_id: i64) -> Result<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, gene_id, startpos, endpos FROM locations WHERE gene_id = ? ORDER BY startpos",
        )
        .bind(gene_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(locations)
    }
}

fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
