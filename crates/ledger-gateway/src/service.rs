//! Gateway service - wires collaborators into the operation handlers and
//! serves them over HTTP.

use crate::adapters::{FileSystemWallet, JsonProfileLoader};
use crate::dispatcher::TransactionDispatcher;
use crate::domain::config::{ConfigError, GatewayConfig};
use crate::domain::error::GatewayResult;
use crate::domain::types::{
    CheckAccessRequest, CheckAccessResponse, CreateUserRequest, CreateUserResponse,
    RecordEventRequest, RecordEventResponse,
};
use crate::handlers::{self, OperationContext};
use crate::http;
use crate::ports::outbound::{
    IdentityResolver, LedgerNetwork, ProfileLoader, SystemTimeSource, TimeSource,
};
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// Errors while running the HTTP server
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("server bind error on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Ledger gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    context: OperationContext,
}

impl GatewayService {
    /// Create a service from explicit collaborators.
    pub fn new(
        config: GatewayConfig,
        resolver: Arc<dyn IdentityResolver>,
        profiles: Arc<dyn ProfileLoader>,
        network: Arc<dyn LedgerNetwork>,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(
            config,
            resolver,
            profiles,
            network,
            Arc::new(SystemTimeSource),
        )
    }

    /// Create a service using the file-system wallet and JSON connection
    /// profile named in the configuration.
    pub fn with_file_collaborators(
        config: GatewayConfig,
        network: Arc<dyn LedgerNetwork>,
    ) -> Result<Self, ConfigError> {
        let resolver = Arc::new(FileSystemWallet::new(&config.network.wallet_path));
        let profiles = Arc::new(JsonProfileLoader::new(&config.network.connection_profile));
        Self::new(config, resolver, profiles, network)
    }

    pub fn with_clock(
        config: GatewayConfig,
        resolver: Arc<dyn IdentityResolver>,
        profiles: Arc<dyn ProfileLoader>,
        network: Arc<dyn LedgerNetwork>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sessions = Arc::new(SessionManager::new(&config, resolver, profiles, network));
        let dispatcher = Arc::new(TransactionDispatcher::new(&config.timeouts));
        let context = OperationContext::new(&config, sessions, dispatcher, clock);

        Ok(Self { config, context })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> GatewayResult<CreateUserResponse> {
        handlers::create_user(&self.context, request).await
    }

    pub async fn check_access(
        &self,
        request: &CheckAccessRequest,
    ) -> GatewayResult<CheckAccessResponse> {
        handlers::check_access(&self.context, request).await
    }

    pub async fn record_event(
        &self,
        request: &RecordEventRequest,
    ) -> GatewayResult<RecordEventResponse> {
        handlers::record_event(&self.context, request).await
    }

    /// Serve the HTTP binding until `shutdown` fires or is dropped.
    pub async fn serve(self: Arc<Self>, shutdown: oneshot::Receiver<()>) -> Result<(), ServeError> {
        let addr = self.config.http_addr();
        let router = http::router(Arc::clone(&self));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;

        info!(
            addr = %addr,
            channel = %self.config.network.channel,
            identity = %self.config.network.identity,
            "Ledger gateway listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.await;
                info!("Received shutdown signal");
            })
            .await?;

        info!("Ledger gateway stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLedger;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GatewayConfig::default();
        config.network.identity.clear();
        let result =
            GatewayService::with_file_collaborators(config, Arc::new(InMemoryLedger::new()));
        assert!(matches!(result, Err(ConfigError::MissingValue(_))));
    }

    #[tokio::test]
    async fn test_file_collaborators_missing_wallet_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.network.wallet_path = dir.path().join("wallet");
        config.network.connection_profile = dir.path().join("connection-org1.json");

        let ledger = InMemoryLedger::with_security_contracts();
        let service =
            GatewayService::with_file_collaborators(config, Arc::new(ledger.clone())).unwrap();

        let err = service
            .check_access(&CheckAccessRequest {
                user_id: "u1".into(),
                resource_id: "r1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.connection_reason(),
            Some(crate::domain::error::ConnectionFailure::IdentityNotFound)
        );
        assert_eq!(ledger.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_serve_shuts_down() {
        let mut config = GatewayConfig::default();
        config.http.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.http.port = 0;
        let service = Arc::new(
            GatewayService::with_file_collaborators(config, Arc::new(InMemoryLedger::new()))
                .unwrap(),
        );

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(service.serve(rx));
        tx.send(()).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }
}
