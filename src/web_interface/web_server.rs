use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tokio::net::TcpListener;

use super::routes::routes;
use crate::error_handling::types::WebError;
use crate::record_service::UserService;
use crate::storage::storage_trait::UserStorage;

/// Web server for the user API and landing page
pub struct WebServer<S: UserStorage> {
    service: Arc<UserService<S>>,
    cors_origins: Vec<String>,
}

impl<S: UserStorage + 'static> WebServer<S> {
    /// Create a new WebServer instance
    pub fn new(service: Arc<UserService<S>>, cors_origins: Vec<String>) -> Self {
        Self {
            service,
            cors_origins,
        }
    }

    /// Bind `addr` and serve until the process is stopped
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind web interface on {}: {}", addr, e);
            WebError::BindFailed(addr, e)
        })?;
        info!("Web interface listening on http://{}", addr);

        let routes = routes(self.service.clone(), &self.cors_origins);
        warp::serve(routes).incoming(listener).run().await;
        Ok(())
    }
}
