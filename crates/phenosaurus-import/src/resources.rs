//! Importable resources and their CSV record layouts.
//!
//! Record fields are declared in CSV column order; the header row written on
//! export comes from [`Resource::HEADERS`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{ImportError, Result};

/// What happened to one imported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    New,
    Updated,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Genes,
    Locations,
    IpsDatapoints,
    PssDatapoints,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Genes,
        ResourceKind::Locations,
        ResourceKind::IpsDatapoints,
        ResourceKind::PssDatapoints,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Genes => "genes",
            ResourceKind::Locations => "locations",
            ResourceKind::IpsDatapoints => "ipsdatapoints",
            ResourceKind::PssDatapoints => "pssdatapoints",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Genes => GeneResource::HEADERS,
            ResourceKind::Locations => LocationResource::HEADERS,
            ResourceKind::IpsDatapoints => IpsDatapointResource::HEADERS,
            ResourceKind::PssDatapoints => PssDatapointResource::HEADERS,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ImportError::UnknownResource(s.to_string()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table that can be imported from and exported to CSV.
#[async_trait]
pub trait Resource: Send + Sync {
    type Record: DeserializeOwned + Serialize + Send + Sync;

    const HEADERS: &'static [&'static str];

    /// Insert or update one record inside the import transaction.
    async fn upsert(&self, conn: &mut SqliteConnection, record: &Self::Record) -> Result<RowOutcome>;

    /// All rows, ordered by id.
    async fn export(&self, pool: &SqlitePool) -> Result<Vec<Self::Record>>;
}

async fn resolve_gene(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    sqlx::query_scalar("SELECT id FROM genes WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ImportError::Row(format!("unknown gene '{name}'")))
}

async fn resolve_screen(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    sqlx::query_scalar("SELECT id FROM screens WHERE name = ? ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ImportError::Row(format!("unknown screen '{name}'")))
}

/// Compare a record with the stored row of the same id.
fn outcome_for<T: PartialEq>(existing: Option<T>, record: &T) -> Option<RowOutcome> {
    match existing {
        Some(stored) if &stored == record => Some(RowOutcome::Skipped),
        Some(_) => Some(RowOutcome::Updated),
        None => None,
    }
}

// ── Genes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GeneRecord {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chromosome: String,
    #[serde(default)]
    pub orientation: String,
}

pub struct GeneResource;

const GENE_SELECT: &str = "SELECT id, name, description, chromosome, orientation FROM genes";

#[async_trait]
impl Resource for GeneResource {
    type Record = GeneRecord;

    const HEADERS: &'static [&'static str] = &["id", "name", "description", "chromosome", "orientation"];

    async fn upsert(&self, conn: &mut SqliteConnection, record: &GeneRecord) -> Result<RowOutcome> {
        if record.name.is_empty() {
            return Err(ImportError::Row("gene name must not be empty".to_string()));
        }
        if record.chromosome.chars().count() > 2 || record.orientation.chars().count() > 1 {
            return Err(ImportError::Row(format!(
                "gene '{}': chromosome is at most 2 and orientation 1 character",
                record.name
            )));
        }

        if let Some(id) = record.id {
            let existing = sqlx::query_as::<_, GeneRecord>(&format!("{GENE_SELECT} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            match outcome_for(existing, record) {
                Some(RowOutcome::Updated) => {
                    sqlx::query(
                        "UPDATE genes SET name = ?, description = ?, chromosome = ?, orientation = ? WHERE id = ?",
                    )
                    .bind(&record.name)
                    .bind(&record.description)
                    .bind(&record.chromosome)
                    .bind(&record.orientation)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                    return Ok(RowOutcome::Updated);
                }
                Some(outcome) => return Ok(outcome),
                None => {}
            }
        }

        sqlx::query("INSERT INTO genes (id, name, description, chromosome, orientation) VALUES (?, ?, ?, ?, ?)")
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.chromosome)
            .bind(&record.orientation)
            .execute(&mut *conn)
            .await?;
        Ok(RowOutcome::New)
    }

    async fn export(&self, pool: &SqlitePool) -> Result<Vec<GeneRecord>> {
        Ok(sqlx::query_as::<_, GeneRecord>(&format!("{GENE_SELECT} ORDER BY id"))
            .fetch_all(pool)
            .await?)
    }
}

// ── Locations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationRecord {
    pub id: Option<i64>,
    pub relgenename: String,
    pub startpos: i64,
    pub endpos: i64,
}

pub struct LocationResource;

const LOCATION_SELECT: &str = r#"
    SELECT l.id, g.name AS relgenename, l.startpos, l.endpos
    FROM locations l JOIN genes g ON g.id = l.gene_id
"#;

#[async_trait]
impl Resource for LocationResource {
    type Record = LocationRecord;

    const HEADERS: &'static [&'static str] = &["id", "relgenename", "startpos", "endpos"];

    async fn upsert(&self, conn: &mut SqliteConnection, record: &LocationRecord) -> Result<RowOutcome> {
        if record.endpos < record.startpos {
            return Err(ImportError::Row(format!(
                "location of '{}' ends ({}) before it starts ({})",
                record.relgenename, record.endpos, record.startpos
            )));
        }
        let gene_id = resolve_gene(conn, &record.relgenename).await?;

        if let Some(id) = record.id {
            let existing = sqlx::query_as::<_, LocationRecord>(&format!("{LOCATION_SELECT} WHERE l.id = ?"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            match outcome_for(existing, record) {
                Some(RowOutcome::Updated) => {
                    sqlx::query("UPDATE locations SET gene_id = ?, startpos = ?, endpos = ? WHERE id = ?")
                        .bind(gene_id)
                        .bind(record.startpos)
                        .bind(record.endpos)
                        .bind(id)
                        .execute(&mut *conn)
                        .await?;
                    return Ok(RowOutcome::Updated);
                }
                Some(outcome) => return Ok(outcome),
                None => {}
            }
        }

        sqlx::query("INSERT INTO locations (id, gene_id, startpos, endpos) VALUES (?, ?, ?, ?)")
            .bind(record.id)
            .bind(gene_id)
            .bind(record.startpos)
            .bind(record.endpos)
            .execute(&mut *conn)
            .await?;
        Ok(RowOutcome::New)
    }

    async fn export(&self, pool: &SqlitePool) -> Result<Vec<LocationRecord>> {
        Ok(sqlx::query_as::<_, LocationRecord>(&format!("{LOCATION_SELECT} ORDER BY l.id"))
            .fetch_all(pool)
            .await?)
    }
}

// ── IPS datapoints ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IpsDatapointRecord {
    pub id: Option<i64>,
    pub relscreenname: String,
    pub relgenename: String,
    pub low: i64,
    pub lowtotal: i64,
    pub high: i64,
    pub hightotal: i64,
    pub insertions: i64,
    pub lowcor: i64,
    pub lowtotalcor: i64,
    pub highcor: i64,
    pub hightotalcor: i64,
    pub pv: f64,
    pub fcpv: f64,
    pub mi: f64,
}

pub struct IpsDatapointResource;

const IPS_SELECT: &str = r#"
    SELECT d.id, s.name AS relscreenname, g.name AS relgenename,
           d.low, d.lowtotal, d.high, d.hightotal, d.insertions,
           d.lowcor, d.lowtotalcor, d.highcor, d.hightotalcor, d.pv, d.fcpv, d.mi
    FROM ips_datapoints d
    JOIN screens s ON s.id = d.screen_id
    JOIN genes g ON g.id = d.gene_id
"#;

#[async_trait]
impl Resource for IpsDatapointResource {
    type Record = IpsDatapointRecord;

    const HEADERS: &'static [&'static str] = &[
        "id", "relscreenname", "relgenename", "low", "lowtotal", "high", "hightotal", "insertions",
        "lowcor", "lowtotalcor", "highcor", "hightotalcor", "pv", "fcpv", "mi",
    ];

    async fn upsert(&self, conn: &mut SqliteConnection, r: &IpsDatapointRecord) -> Result<RowOutcome> {
        let screen_id = resolve_screen(conn, &r.relscreenname).await?;
        let gene_id = resolve_gene(conn, &r.relgenename).await?;

        let mut outcome = RowOutcome::New;
        if let Some(id) = r.id {
            let existing = sqlx::query_as::<_, IpsDatapointRecord>(&format!("{IPS_SELECT} WHERE d.id = ?"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            match outcome_for(existing, r) {
                Some(RowOutcome::Skipped) => return Ok(RowOutcome::Skipped),
                Some(found) => outcome = found,
                None => {}
            }
        }

        // REPLACE keeps the id, so it covers both the new and the changed row
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ips_datapoints
                (id, screen_id, gene_id, low, lowtotal, high, hightotal, insertions,
                 lowcor, lowtotalcor, highcor, hightotalcor, pv, fcpv, mi)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(r.id)
        .bind(screen_id)
        .bind(gene_id)
        .bind(r.low)
        .bind(r.lowtotal)
        .bind(r.high)
        .bind(r.hightotal)
        .bind(r.insertions)
        .bind(r.lowcor)
        .bind(r.lowtotalcor)
        .bind(r.highcor)
        .bind(r.hightotalcor)
        .bind(r.pv)
        .bind(r.fcpv)
        .bind(r.mi)
        .execute(&mut *conn)
        .await?;
        Ok(outcome)
    }

    async fn export(&self, pool: &SqlitePool) -> Result<Vec<IpsDatapointRecord>> {
        Ok(sqlx::query_as::<_, IpsDatapointRecord>(&format!("{IPS_SELECT} ORDER BY d.id"))
            .fetch_all(pool)
            .await?)
    }
}

// ── PSS datapoints ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PssDatapointRecord {
    pub id: Option<i64>,
    pub relscreenname: String,
    pub relgenename: String,
    pub nm: i64,
    pub tnm: i64,
    pub ct: i64,
    pub tct: i64,
    pub cct: i64,
    pub ctct: i64,
    pub pv: f64,
    pub ti: i64,
    pub fcpv: f64,
    pub mi: f64,
    pub radius: f64,
    pub seq: i64,
}

pub struct PssDatapointResource;

const PSS_SELECT: &str = r#"
    SELECT d.id, s.name AS relscreenname, g.name AS relgenename,
           d.nm, d.tnm, d.ct, d.tct, d.cct, d.ctct, d.pv, d.ti, d.fcpv, d.mi, d.radius, d.seq
    FROM pss_datapoints d
    JOIN screens s ON s.id = d.screen_id
    JOIN genes g ON g.id = d.gene_id
"#;

#[async_trait]
impl Resource for PssDatapointResource {
    type Record = PssDatapointRecord;

    const HEADERS: &'static [&'static str] = &[
        "id", "relscreenname", "relgenename", "nm", "tnm", "ct", "tct", "cct", "ctct", "pv", "ti",
        "fcpv", "mi", "radius", "seq",
    ];

    async fn upsert(&self, conn: &mut SqliteConnection, r: &PssDatapointRecord) -> Result<RowOutcome> {
        let screen_id = resolve_screen(conn, &r.relscreenname).await?;
        let gene_id = resolve_gene(conn, &r.relgenename).await?;

        let mut outcome = RowOutcome::New;
        if let Some(id) = r.id {
            let existing = sqlx::query_as::<_, PssDatapointRecord>(&format!("{PSS_SELECT} WHERE d.id = ?"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
            match outcome_for(existing, r) {
                Some(RowOutcome::Skipped) => return Ok(RowOutcome::Skipped),
                Some(found) => outcome = found,
                None => {}
            }
        }

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO pss_datapoints
                (id, screen_id, gene_id, nm, tnm, ct, tct, cct, ctct, pv, ti, fcpv, mi, radius, seq)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(r.id)
        .bind(screen_id)
        .bind(gene_id)
        .bind(r.nm)
        .bind(r.tnm)
        .bind(r.ct)
        .bind(r.tct)
        .bind(r.cct)
        .bind(r.ctct)
        .bind(r.pv)
        .bind(r.ti)
        .bind(r.fcpv)
        .bind(r.mi)
        .bind(r.radius)
        .bind(r.seq)
        .execute(&mut *conn)
        .await?;
        Ok(outcome)
    }

    async fn export(&self, pool: &SqlitePool) -> Result<Vec<PssDatapointRecord>> {
        Ok(sqlx::query_as::<_, PssDatapointRecord>(&format!("{PSS_SELECT} ORDER BY d.id"))
            .fetch_all(pool)
            .await?)
    }
}
