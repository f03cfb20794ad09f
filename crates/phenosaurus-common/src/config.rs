//! Configuration loading for Phenosaurus.
//! Reads the file named by the PHENOSAURUS_CONFIG env var, or phenosaurus.toml
//! from the current directory. Every section and field has a default, so a
//! partial file is valid. Without PHENOSAURUS_CONFIG a missing
//! phenosaurus.toml means all defaults; a PHENOSAURUS_CONFIG path that does
//! not exist is an error.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PhenoError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host()       -> String { "127.0.0.1".to_string() }
fn default_port()       -> u16    { 3001 }
fn default_static_dir() -> String { "static".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

// ── Database ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_url()          -> String { "sqlite://phenosaurus.db".to_string() }
fn default_max_connections() -> u32    { 5 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────────────

/// Every visitor is a member of the public group; screens granted to it are
/// visible without credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_public_group")]
    pub public_group_id: i64,
}

fn default_public_group() -> i64 { 1 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self { public_group_id: default_public_group() }
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

/// Plot colours, cutoffs and sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Significant with mi < 1 (positive regulator)
    #[serde(default = "default_color_sb")]
    pub color_sb: String,
    /// Significant with mi >= 1 (negative regulator)
    #[serde(default = "default_color_st")]
    pub color_st: String,
    /// Not significant
    #[serde(default = "default_color_ns")]
    pub color_ns: String,
    #[serde(default = "default_legend_background")]
    pub legend_background: String,
    #[serde(default = "default_nonselected_alpha")]
    pub nonselected_fill_alpha: f64,
    #[serde(default = "default_nonselected_alpha")]
    pub nonselected_line_alpha: f64,

    #[serde(default = "default_pvalue_cutoff")]
    pub pvalue_cutoff: f64,
    #[serde(default = "default_text_sizes")]
    pub text_sizes: Vec<String>,
    #[serde(default = "default_text_size")]
    pub standard_text_size: String,
    #[serde(default = "default_max_geneplots")]
    pub max_geneplots: usize,

    #[serde(default = "default_fishtail_width")]
    pub fishtail_width: u32,
    #[serde(default = "default_fishtail_height")]
    pub fishtail_height: u32,
    #[serde(default = "default_geneplot_height")]
    pub geneplot_height: u32,
    #[serde(default = "default_small_width")]
    pub small_geneplot_width: u32,
    #[serde(default = "default_normal_width")]
    pub normal_geneplot_width: u32,
    #[serde(default = "default_wide_width")]
    pub wide_geneplot_width: u32,
    /// Pixels per screen when the gene plot width is "dynamic"
    #[serde(default = "default_dynamic_width")]
    pub dynamic_geneplot_width: u32,

    #[serde(default = "default_ucsc_link")]
    pub ucsc_link: String,
    #[serde(default = "default_genecards_link")]
    pub genecards_link: String,
}

fn default_color_sb()          -> String { "#F2B01E".to_string() }
fn default_color_st()          -> String { "#1B75BB".to_string() }
fn default_color_ns()          -> String { "#B3B3B3".to_string() }
fn default_legend_background() -> String { "#F5F5F5".to_string() }
fn default_nonselected_alpha() -> f64    { 0.2 }
fn default_pvalue_cutoff()     -> f64    { 0.05 }
fn default_text_size()         -> String { "11px".to_string() }
fn default_max_geneplots()     -> usize  { 50 }
fn default_fishtail_width()    -> u32    { 1000 }
fn default_fishtail_height()   -> u32    { 700 }
fn default_geneplot_height()   -> u32    { 400 }
fn default_small_width()       -> u32    { 400 }
fn default_normal_width()      -> u32    { 700 }
fn default_wide_width()        -> u32    { 1000 }
fn default_dynamic_width()     -> u32    { 40 }

fn default_text_sizes() -> Vec<String> {
    (8..=20).map(|px| format!("{px}px")).collect()
}

fn default_ucsc_link() -> String {
    "https://genome.ucsc.edu/cgi-bin/hgTracks?db=hg38&position=".to_string()
}

fn default_genecards_link() -> String {
    "https://www.genecards.org/cgi-bin/carddisp.pl?gene=".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_sb: default_color_sb(),
            color_st: default_color_st(),
            color_ns: default_color_ns(),
            legend_background: default_legend_background(),
            nonselected_fill_alpha: default_nonselected_alpha(),
            nonselected_line_alpha: default_nonselected_alpha(),
            pvalue_cutoff: default_pvalue_cutoff(),
            text_sizes: default_text_sizes(),
            standard_text_size: default_text_size(),
            max_geneplots: default_max_geneplots(),
            fishtail_width: default_fishtail_width(),
            fishtail_height: default_fishtail_height(),
            geneplot_height: default_geneplot_height(),
            small_geneplot_width: default_small_width(),
            normal_geneplot_width: default_normal_width(),
            wide_geneplot_width: default_wide_width(),
            dynamic_geneplot_width: default_dynamic_width(),
            ucsc_link: default_ucsc_link(),
            genecards_link: default_genecards_link(),
        }
    }
}

impl DisplayConfig {
    /// Apply `variable_name = value` overrides stored in the settings table.
    /// Unknown names and unparsable values are ignored with a warning.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in overrides {
            let value = value.trim();
            match name {
                "pvalue_cutoff" => match value.parse::<f64>() {
                    Ok(v) if v.is_finite() && v >= 0.0 => self.pvalue_cutoff = v,
                    _ => warn!("Ignoring invalid pvalue_cutoff setting: {value}"),
                },
                "max_geneplots" => match value.parse::<usize>() {
                    Ok(v) => self.max_geneplots = v,
                    Err(_) => warn!("Ignoring invalid max_geneplots setting: {value}"),
                },
                "standard_text_size" => {
                    if self.text_sizes.iter().any(|s| s == value) {
                        self.standard_text_size = value.to_string();
                    } else {
                        warn!("Ignoring unknown standard_text_size setting: {value}");
                    }
                }
                "ucsc_link" => self.ucsc_link = value.to_string(),
                other => warn!("Unknown display setting: {other}"),
            }
        }
        self
    }
}

const DEFAULT_CONFIG_FILE: &str = "phenosaurus.toml";

impl Config {
    /// Load configuration from PHENOSAURUS_CONFIG or phenosaurus.toml.
    pub fn load() -> Result<Self> {
        match std::env::var("PHENOSAURUS_CONFIG") {
            Ok(path) => Self::load_file(Path::new(&path)),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            Err(_) => {
                info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// Load one config file, which must exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PhenoError::Config(format!(
                "Config file not found: {}\n\
                 Copy phenosaurus.example.toml to phenosaurus.toml and edit it.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.public_group_id, 1);
        assert_eq!(config.display.pvalue_cutoff, 0.05);
        assert_eq!(config.display.max_geneplots, 50);
        assert_eq!(config.display.text_sizes.first().map(String::as_str), Some("8px"));
        assert_eq!(config.display.text_sizes.last().map(String::as_str), Some("20px"));
    }

    #[test]
    fn test_partial_section() {
        let config = Config::from_toml_str(
            r#"
            [database]
            url = "sqlite::memory:"

            [display]
            pvalue_cutoff = 0.01
            "#,
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.display.pvalue_cutoff, 0.01);
        assert_eq!(config.display.standard_text_size, "11px");
    }

    #[test]
    fn test_load_file() {
        let missing = std::env::temp_dir().join("phenosaurus-no-such-config.toml");
        assert!(matches!(Config::load_file(&missing), Err(PhenoError::Config(_))));

        let path = std::env::temp_dir().join(format!("phenosaurus-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();
        let config = Config::load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            Config::from_toml_str("[server\nport = 1"),
            Err(PhenoError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let display = DisplayConfig::default().with_overrides([
            ("pvalue_cutoff", "1E-3"),
            ("max_geneplots", "10"),
            ("standard_text_size", "14px"),
            ("standard_text_size", "HOI"),
            ("max_geneplots", "many"),
            ("colour", "red"),
        ]);
        assert_eq!(display.pvalue_cutoff, 0.001);
        assert_eq!(display.max_geneplots, 10);
        assert_eq!(display.standard_text_size, "14px");
    }
}
