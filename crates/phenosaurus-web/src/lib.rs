//! phenosaurus-web — Web frontend for Phenosaurus
//! Serves:
//!   - Fishtail plots of single intracellular phenotype screens
//!   - Gene plots comparing genes across screens
//!   - Gene list, update history and static information pages
//!   - Staff-only admin endpoints for CSV import/export and screen management

pub mod router;
pub mod handlers;
pub mod state;
pub mod templates;
pub mod viewer;
