//! Phenosaurus Database Layer
//!
//! Relational store for screens, genes and their datapoints, backed by SQLite
//! through `sqlx`. Visibility of screens is scoped to groups: every query
//! that reads screen data takes the set of screen ids the caller is
//! authorized for (see [`ScreenRepository::authorized_ids`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use phenosaurus_db::{Database, ScreenRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("sqlite://phenosaurus.db", 5).await?;
//!     db.initialize().await?;
//!
//!     let screens = ScreenRepository::new(Arc::new(db));
//!     let visible = screens.authorized_ids(&[1]).await?;
//!     println!("{} public screens", visible.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod screens;
pub mod genes;
pub mod datapoints;
pub mod users;
pub mod tracks;
pub mod updates;
pub mod settings;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::{
    CellLine, CustomTrack, Gene, Group, IpsDatapointView, Location, NewGene, NewIpsDatapoint,
    NewScreen, Screen, ScreenType, Setting, UpdateEntry, User,
};
pub use screens::ScreenRepository;
pub use genes::GeneRepository;
pub use datapoints::IpsDatapointRepository;
pub use users::{hash_token, UserRepository};
pub use tracks::TrackRepository;
pub use updates::UpdateRepository;
pub use settings::SettingRepository;
