//! phenosaurus-import — Bulk CSV import and export of genes, locations and
//! screen datapoints.
//!
//! Rows are matched on `id`: an empty id creates a row, an existing id
//! updates it (or skips it when nothing changed). Foreign keys are given by
//! name (`relscreenname`, `relgenename`). An import runs in one transaction
//! and is rolled back as a whole if any row fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use phenosaurus_db::Database;
//! use phenosaurus_import::{import_csv, ResourceKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Database::open("sqlite://phenosaurus.db", 5).await?;
//!     let data = std::fs::read("genes.csv")?;
//!     let report = import_csv(&db, ResourceKind::Genes, &data, true).await?;
//!     println!("{} new, {} updated, {} errors", report.new, report.updated, report.errors.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod resources;
pub mod importer;

pub use error::{ImportError, Result};
pub use importer::{export_csv, import_csv, ImportReport, RowError};
pub use resources::{Resource, ResourceKind, RowOutcome};
