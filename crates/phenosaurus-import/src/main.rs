//! phenosaurus-admin — command line administration.
//!
//! Run with: cargo run -p phenosaurus-import --bin phenosaurus-admin -- --help

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use phenosaurus_common::Config;
use phenosaurus_db::{CellLine, Database, NewScreen, ScreenRepository, ScreenType, SettingRepository, UpdateRepository, UserRepository};
use phenosaurus_import::{export_csv, import_csv, ResourceKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Group whose screens every visitor may see.
const PUBLIC_GROUP: &str = "public";

#[derive(Parser, Debug)]
#[command(name = "phenosaurus-admin")]
#[command(author, version, about = "Administer a Phenosaurus database", long_about = None)]
struct Cli {
    /// Database URL, overrides [database] url from phenosaurus.toml
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create all tables and the public group
    Init,
    /// Import a CSV file (genes, locations, ipsdatapoints, pssdatapoints)
    Import {
        resource: ResourceKind,
        file: PathBuf,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Export a resource as CSV
    Export {
        resource: ResourceKind,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    CreateGroup {
        name: String,
    },
    CreateUser {
        username: String,
        /// API token for bearer authentication
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        staff: bool,
        /// Groups to join (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    CreateScreen {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// PS, SL or IP
        #[arg(long, default_value = "IP")]
        screentype: String,
        /// HAP1 or KBM7
        #[arg(long, default_value = "HAP1")]
        celline: String,
        /// Groups allowed to see the screen (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    /// Allow a group to see a screen
    Grant {
        screen: String,
        group: String,
    },
    /// Add an entry to the update history
    AddUpdate {
        version: String,
        changes: String,
        /// YYYY-MM-DD, today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set a display setting (pvalue_cutoff, max_geneplots, standard_text_size, ucsc_link)
    Set {
        name: String,
        value: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phenosaurus=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        warn!("{e}; using defaults");
        Config::default()
    });
    let url = cli.database.unwrap_or(config.database.url);

    let db = Database::open(&url, config.database.max_connections).await?;
    db.initialize().await?;
    let db = db.into_shared();

    match cli.command {
        Commands::Init => {
            let users = UserRepository::new(db);
            if users.find_group(PUBLIC_GROUP).await?.is_none() {
                let id = users.create_group(PUBLIC_GROUP).await?;
                info!("Created group {} ({})", PUBLIC_GROUP, id);
            }
            info!("Database ready at {}", url);
        }
        Commands::Import { resource, file, dry_run } => {
            let data = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let report = import_csv(&db, resource, &data, dry_run).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.has_errors() {
                bail!("{} row(s) failed, nothing was imported", report.errors.len());
            }
        }
        Commands::Export { resource, output } => {
            let rows = match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    export_csv(&db, resource, file).await?
                }
                None => export_csv(&db, resource, std::io::stdout().lock()).await?,
            };
            info!("Exported {} {} row(s)", rows, resource);
        }
        Commands::CreateGroup { name } => {
            let id = UserRepository::new(db).create_group(&name).await?;
            println!("{id}");
        }
        Commands::CreateUser { username, token, staff, groups } => {
            let users = UserRepository::new(db);
            let id = users.create_user(&username, token.as_deref(), staff).await?;
            for group in groups {
                let group_id = find_group(&users, &group).await?;
                users.add_to_group(id, group_id).await?;
            }
            println!("{id}");
        }
        Commands::CreateScreen { name, description, screentype, celline, groups } => {
            let Some(screentype) = ScreenType::from_code(&screentype) else {
                bail!("Unknown screen type {screentype}, expected PS, SL or IP");
            };
            let Some(celline) = CellLine::from_code(&celline) else {
                bail!("Unknown cell line {celline}, expected HAP1 or KBM7");
            };
            let screens = ScreenRepository::new(db.clone());
            let users = UserRepository::new(db);
            let id = screens
                .create(&NewScreen {
                    name,
                    description,
                    screentype,
                    celline,
                    screen_date: Some(Utc::now()),
                    ..Default::default()
                })
                .await?;
            for group in groups {
                screens.grant(id, find_group(&users, &group).await?).await?;
            }
            println!("{id}");
        }
        Commands::Grant { screen, group } => {
            let screens = ScreenRepository::new(db.clone());
            let users = UserRepository::new(db);
            let Some(found) = screens.find_by_name(&screen).await? else {
                bail!("Unknown screen {screen}");
            };
            screens.grant(found.id, find_group(&users, &group).await?).await?;
            info!("Group {} may now see screen {}", group, screen);
        }
        Commands::AddUpdate { version, changes, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            UpdateRepository::new(db).insert(date, &version, &changes).await?;
        }
        Commands::Set { name, value, comment } => {
            SettingRepository::new(db).set(&name, &value, &comment).await?;
        }
    }

    Ok(())
}

async fn find_group(users: &UserRepository, name: &str) -> anyhow::Result<i64> {
    match users.find_group(name).await? {
        Some(group) => Ok(group.id),
        None => bail!("Unknown group {name}"),
    }
}
