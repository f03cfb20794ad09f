//! Shared application state for the web server.

use std::sync::Arc;

use minijinja::Environment;
use phenosaurus_common::{Config, DisplayConfig};
use phenosaurus_db::{
    Database, DbError, GeneRepository, IpsDatapointRepository, ScreenRepository, SettingRepository,
    TrackRepository, UpdateRepository, UserRepository,
};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub templates: Environment<'static>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Config) -> Result<Self, minijinja::Error> {
        Ok(Self {
            db,
            config,
            templates: crate::templates::environment()?,
        })
    }

    /// Display settings with the overrides stored in the settings table.
    pub async fn display(&self) -> Result<DisplayConfig, DbError> {
        let settings = self.settings().all().await?;
        Ok(self
            .config
            .display
            .clone()
            .with_overrides(settings.iter().map(|s| (s.variable_name.as_str(), s.value.as_str()))))
    }

    pub fn screens(&self) -> ScreenRepository {
        ScreenRepository::new(self.db.clone())
    }

    pub fn genes(&self) -> GeneRepository {
        GeneRepository::new(self.db.clone())
    }

    pub fn ips(&self) -> IpsDatapointRepository {
        IpsDatapointRepository::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn tracks(&self) -> TrackRepository {
        TrackRepository::new(self.db.clone())
    }

    pub fn updates(&self) -> UpdateRepository {
        UpdateRepository::new(self.db.clone())
    }

    pub fn settings(&self) -> SettingRepository {
        SettingRepository::new(self.db.clone())
    }
}

pub type SharedState = Arc<AppState>;
