//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the gateway depends on. Adapters in `crate::adapters`
//! implement them; tests substitute spies.
//!
//! The ledger surface mirrors how a permissioned-ledger client is used:
//! open a session for an identity, look up a contract on a channel, then
//! `submit` (write) or `evaluate` (read) a function with string arguments.

use crate::domain::types::{ConnectionProfile, DiscoveryOptions, Identity};
use async_trait::async_trait;
use std::path::PathBuf;

// =============================================================================
// IDENTITY STORE
// =============================================================================

/// Errors reading the identity store. A label that simply is not there is
/// not an error; resolvers return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid identity label: {0:?}")]
    InvalidLabel(String),

    #[error("failed to read identity {label:?}: {source}")]
    Unreadable {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("identity {label:?} is malformed: {source}")]
    Malformed {
        label: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Maps a logical actor name to a usable credential.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self, label: &str) -> Result<Option<Identity>, IdentityError>;
}

// =============================================================================
// CONNECTION PROFILE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read connection profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse connection profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of the network connection profile.
#[async_trait]
pub trait ProfileLoader: Send + Sync {
    async fn load_connection_profile(&self) -> Result<ConnectionProfile, ProfileError>;
}

// =============================================================================
// LEDGER NETWORK
// =============================================================================

/// Failures reported by the ledger client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Session could not be established
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("contract {contract:?} not found on channel {channel:?}")]
    ContractNotFound { channel: String, contract: String },

    /// Proposal rejected by endorsing peers; nothing was ordered
    #[error("endorsement failed: {0}")]
    Endorsement(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// Connection dropped or peer unreachable mid-call
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Entry point into the ledger network.
#[async_trait]
pub trait LedgerNetwork: Send + Sync {
    /// Open an authenticated session. The returned session must be closed
    /// by the caller.
    async fn open_session(
        &self,
        identity: &Identity,
        profile: &ConnectionProfile,
        discovery: &DiscoveryOptions,
    ) -> Result<Box<dyn LedgerSession>, LedgerError>;
}

/// A live, authenticated connection scoped to one identity.
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Label of the identity the session authenticated with.
    fn identity_label(&self) -> &str;

    /// Resolve a contract deployed on a channel.
    async fn contract(
        &self,
        channel: &str,
        contract: &str,
    ) -> Result<Box<dyn LedgerContract>, LedgerError>;

    /// Disconnect. Infallible from the caller's point of view.
    async fn close(&self);
}

/// A contract handle obtained from a session.
#[async_trait]
pub trait LedgerContract: Send + Sync {
    /// Propose, endorse and order a state change. Returns once committed.
    async fn submit(&self, function: &str, args: &[String]) -> Result<(), LedgerError>;

    /// Query committed state without ordering a transaction.
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;
}

// =============================================================================
// TIME
// =============================================================================

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;
}

/// Wall-clock implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        // Clock before Unix epoch - return 0 rather than panic
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemTimeSource.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_ledger_error_messages() {
        let err = LedgerError::ContractNotFound {
            channel: "security-channel".into(),
            contract: "accesscontrol".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"contract "accesscontrol" not found on channel "security-channel""#
        );
    }
}
