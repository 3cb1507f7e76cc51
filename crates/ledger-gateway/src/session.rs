//! Session manager: per-request session acquisition with guaranteed release.
//!
//! A session is opened immediately before a dispatch and closed immediately
//! after. It is never pooled or shared. [`SessionGuard`] owns the open
//! session; `release()` closes it on the normal path and `Drop` schedules
//! the close on any other path (early return, panic, cancelled task).

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ConnectionFailure, GatewayError, GatewayResult};
use crate::domain::types::DiscoveryOptions;
use crate::ports::outbound::{IdentityResolver, LedgerNetwork, LedgerSession, ProfileLoader};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Acquires sessions bound to the service identity.
pub struct SessionManager {
    resolver: Arc<dyn IdentityResolver>,
    profiles: Arc<dyn ProfileLoader>,
    network: Arc<dyn LedgerNetwork>,
    identity: String,
    discovery: DiscoveryOptions,
    connect_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        config: &GatewayConfig,
        resolver: Arc<dyn IdentityResolver>,
        profiles: Arc<dyn ProfileLoader>,
        network: Arc<dyn LedgerNetwork>,
    ) -> Self {
        Self {
            resolver,
            profiles,
            network,
            identity: config.network.identity.clone(),
            discovery: config.network.discovery,
            connect_timeout: config.timeouts.connection,
        }
    }

    /// Label of the service identity sessions are opened for.
    pub fn identity_label(&self) -> &str {
        &self.identity
    }

    /// Acquire a session for the service identity.
    pub async fn acquire(&self) -> GatewayResult<SessionGuard> {
        self.acquire_as(&self.identity).await
    }

    /// Acquire a session for a named identity.
    ///
    /// Resolves the identity, loads the connection profile and opens the
    /// session, all within the connection timeout. Fails with a
    /// `ConnectionError`; nothing is left open on failure.
    pub async fn acquire_as(&self, identity_name: &str) -> GatewayResult<SessionGuard> {
        match tokio::time::timeout(self.connect_timeout, self.open(identity_name)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::connection(
                ConnectionFailure::Timeout,
                format!(
                    "session for {:?} not established within {:?}",
                    identity_name, self.connect_timeout
                ),
            )),
        }
    }

    async fn open(&self, identity_name: &str) -> GatewayResult<SessionGuard> {
        let identity = match self.resolver.resolve_identity(identity_name).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                return Err(GatewayError::connection(
                    ConnectionFailure::IdentityNotFound,
                    format!("identity {:?} not found in wallet", identity_name),
                ))
            }
            Err(e) => {
                return Err(GatewayError::connection(
                    ConnectionFailure::IdentityUnavailable,
                    e.to_string(),
                ))
            }
        };

        let profile = self.profiles.load_connection_profile().await.map_err(|e| {
            GatewayError::connection(ConnectionFailure::ProfileUnreadable, e.to_string())
        })?;

        let session = self
            .network
            .open_session(&identity, &profile, &self.discovery)
            .await
            .map_err(|e| GatewayError::connection(ConnectionFailure::OpenFailed, e.to_string()))?;

        debug!(
            identity = %identity.label,
            msp_id = %identity.msp_id,
            discovery = self.discovery.enabled,
            peers = ?profile.peer_urls(),
            "Ledger session opened"
        );

        Ok(SessionGuard::new(Arc::from(session)))
    }
}

/// Exclusive owner of one open session.
///
/// Closing is idempotent: the underlying session's `close` runs at most once
/// per guard, whether through [`SessionGuard::release`] or `Drop`.
pub struct SessionGuard {
    session: Arc<dyn LedgerSession>,
    released: bool,
}

impl SessionGuard {
    fn new(session: Arc<dyn LedgerSession>) -> Self {
        Self {
            session,
            released: false,
        }
    }

    /// The live session. Valid until the guard is released.
    pub fn session(&self) -> &dyn LedgerSession {
        self.session.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Close the session. Later calls are no-ops.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.session.close().await;
        debug!(identity = %self.session.identity_label(), "Ledger session closed");
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let session = Arc::clone(&self.session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    identity = %session.identity_label(),
                    "Session guard dropped without release, closing in background"
                );
                handle.spawn(async move {
                    session.close().await;
                });
            }
            Err(_) => {
                warn!(
                    identity = %session.identity_label(),
                    "Session guard dropped outside a runtime, close skipped"
                );
            }
        }
    }
}
