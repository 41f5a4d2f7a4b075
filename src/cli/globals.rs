use crate::{
    api::{DashboardApi, HttpClient},
    config::AppConfig,
    session::{FileStorage, MemoryStorage, SessionController, SessionStore, Storage},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Settings shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// # Errors
    /// Returns an error if the configured base URL is rejected by the client.
    pub fn api(&self) -> Result<DashboardApi> {
        let client = HttpClient::new(&self.config.api_base_url, self.config.timeout)?;
        debug!("API base URL: {}", client.base_url());
        Ok(DashboardApi::new(Arc::new(client)))
    }

    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        match &self.config.session_file {
            Some(path) => {
                debug!("session file: {}", path.display());
                Arc::new(FileStorage::new(path.clone()))
            }
            None => {
                debug!("session kept in memory");
                Arc::new(MemoryStorage::new())
            }
        }
    }

    /// Controller with any persisted session already restored.
    ///
    /// # Errors
    /// Returns an error if the API client cannot be built.
    pub fn session(&self) -> Result<SessionController> {
        Ok(SessionController::new(
            self.api()?,
            SessionStore::new(self.storage()),
        ))
    }
}
