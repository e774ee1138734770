use std::sync::Arc;

use log::info;

use crate::configuration::config::Config;
use crate::error_handling::types::ControllerError;
use crate::record_service::UserService;
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::storage_trait::UserStorage;
use crate::web_interface::WebServer;

/// Wires the components together at startup.
pub struct Controller {
    pub config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Opens the database and bootstraps its schema. Runs before any request is
    /// accepted.
    pub async fn prepare_storage(&self) -> Result<DatabaseStorage, ControllerError> {
        let storage =
            DatabaseStorage::open_with(&self.config.database_path, self.config.max_connections)
                .await?;
        storage.ensure_schema().await?;
        info!("Schema ready, {} users stored", storage.count().await?);
        Ok(storage)
    }

    pub async fn run(&self) -> Result<(), ControllerError> {
        let addr = self.config.socket_addr()?;
        let storage = self.prepare_storage().await?;
        let service = Arc::new(UserService::new(storage));
        WebServer::new(service, self.config.cors_origins.clone())
            .start(addr)
            .await?;
        Ok(())
    }
}
