//! Row types for all tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const TABLE_GROUPS: &str = "groups";
pub const TABLE_USERS: &str = "users";
pub const TABLE_USER_GROUPS: &str = "user_groups";
pub const TABLE_SCREENS: &str = "screens";
pub const TABLE_SCREEN_PERMISSIONS: &str = "screen_permissions";
pub const TABLE_GENES: &str = "genes";
pub const TABLE_LOCATIONS: &str = "locations";
pub const TABLE_IPS_DATAPOINTS: &str = "ips_datapoints";
pub const TABLE_PSS_DATAPOINTS: &str = "pss_datapoints";
pub const TABLE_CUSTOM_TRACKS: &str = "custom_tracks";
pub const TABLE_UPDATE_HISTORY: &str = "update_history";
pub const TABLE_SETTINGS: &str = "settings";

// ── Screens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum ScreenType {
    #[sqlx(rename = "PS")]
    #[serde(rename = "PS")]
    PositiveSelection,
    #[sqlx(rename = "SL")]
    #[serde(rename = "SL")]
    SyntheticLethality,
    #[default]
    #[sqlx(rename = "IP")]
    #[serde(rename = "IP")]
    IntracellularPhenotype,
}

impl ScreenType {
    pub fn code(&self) -> &'static str {
        match self {
            ScreenType::PositiveSelection => "PS",
            ScreenType::SyntheticLethality => "SL",
            ScreenType::IntracellularPhenotype => "IP",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScreenType::PositiveSelection => "Positive Selection",
            ScreenType::SyntheticLethality => "Synthetic Lethality",
            ScreenType::IntracellularPhenotype => "Intracellular Phenotype",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PS" => Some(ScreenType::PositiveSelection),
            "SL" => Some(ScreenType::SyntheticLethality),
            "IP" => Some(ScreenType::IntracellularPhenotype),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum CellLine {
    #[default]
    #[sqlx(rename = "HAP1")]
    #[serde(rename = "HAP1")]
    Hap1,
    #[sqlx(rename = "KBM7")]
    #[serde(rename = "KBM7")]
    Kbm7,
}

impl CellLine {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "HAP1" => Some(CellLine::Hap1),
            "KBM7" => Some(CellLine::Kbm7),
            _ => None,
        }
    }
}

/// One genetic perturbation experiment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Screen {
    pub id: i64,
    pub name: String,
    pub scientist_id: Option<i64>,
    pub description: String,
    pub longdescription: String,
    pub sequenceids: String,
    pub directory: String,
    pub induced: bool,
    pub knockout: bool,
    pub celline: CellLine,
    pub screen_date: Option<DateTime<Utc>>,
    pub screentype: ScreenType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScreen {
    pub name: String,
    pub scientist_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub longdescription: String,
    #[serde(default)]
    pub sequenceids: String,
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub induced: bool,
    #[serde(default)]
    pub knockout: bool,
    #[serde(default)]
    pub celline: CellLine,
    pub screen_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub screentype: ScreenType,
}

// ── Users & groups ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

// ── Genes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gene {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub chromosome: String,
    pub orientation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGene {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chromosome: String,
    #[serde(default)]
    pub orientation: String,
}

/// One genomic location of a gene. A gene may have several non-overlapping
/// locations on the same chromosome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub gene_id: i64,
    pub startpos: i64,
    pub endpos: i64,
}

// ── Datapoints ───────────────────────────────────────────────────────────────

/// Intracellular phenotype screen datapoint to insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIpsDatapoint {
    pub screen_id: i64,
    pub gene_id: i64,
    pub low: i64,
    pub lowtotal: i64,
    pub high: i64,
    pub hightotal: i64,
    pub lowcor: i64,
    pub lowtotalcor: i64,
    pub highcor: i64,
    pub hightotalcor: i64,
    pub pv: f64,
    pub fcpv: f64,
    pub mi: f64,
    pub insertions: i64,
}

/// IPS datapoint joined with the names of its screen and gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IpsDatapointView {
    pub id: i64,
    pub screen_id: i64,
    pub screen_name: String,
    pub gene_id: i64,
    pub gene_name: String,
    pub low: i64,
    pub high: i64,
    pub pv: f64,
    pub fcpv: f64,
    pub mi: f64,
    pub insertions: i64,
}

// ── Misc ─────────────────────────────────────────────────────────────────────

/// A named, user-owned list of genes (space separated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomTrack {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub genelist: String,
}

impl CustomTrack {
    pub fn genes(&self) -> Vec<&str> {
        self.genelist.split_whitespace().collect()
    }
}

/// Changelog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UpdateEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub version: String,
    pub changes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub id: i64,
    pub variable_name: String,
    pub value: String,
    pub comment: String,
}
