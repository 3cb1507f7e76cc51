//! Core value types: identities, connection profiles, call specs and the
//! per-operation request/response records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CALL MODEL
// =============================================================================

/// Kind of ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// Write-class call proposing a state change. Not safely retryable.
    Submit,
    /// Read-only call against committed state.
    Evaluate,
}

impl CallKind {
    /// Whether the call may change ledger state.
    pub fn is_write(&self) -> bool {
        matches!(self, CallKind::Submit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Submit => "submit",
            CallKind::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of dispatch. Built once by an operation handler, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub channel: String,
    pub contract: String,
    pub operation: CallKind,
    pub function: String,
    pub args: Vec<String>,
}

impl CallSpec {
    pub fn new(
        channel: impl Into<String>,
        contract: impl Into<String>,
        operation: CallKind,
        function: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            contract: contract.into(),
            operation,
            function: function.into(),
            args,
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    /// The ledger acknowledged a submit. Submits carry no contract data.
    Submitted,
    /// Raw payload returned by an evaluate.
    Evaluated(Vec<u8>),
}

impl CallResult {
    /// Payload bytes, if this was an evaluate.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            CallResult::Submitted => None,
            CallResult::Evaluated(bytes) => Some(bytes),
        }
    }
}

// =============================================================================
// IDENTITY & NETWORK PROFILE
// =============================================================================

/// Credential authenticating a session to the ledger network.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Logical actor name the credential is stored under
    pub label: String,
    /// Membership service provider the certificate belongs to
    pub msp_id: String,
    /// PEM encoded certificate
    pub certificate: String,
    /// PEM encoded private key
    pub private_key: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("label", &self.label)
            .field("msp_id", &self.msp_id)
            .field("private_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Discovery settings used when opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryOptions {
    /// Let the network client discover peers and orderers
    pub enabled: bool,
    /// Rewrite discovered addresses to localhost
    pub as_localhost: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: true,
        }
    }
}

/// Peer endpoint entry of a connection profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEndpoint {
    pub url: String,
}

/// Network connection profile. Only the parts the gateway inspects are
/// typed; organization and CA sections are kept as raw JSON for the
/// network client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionProfile {
    pub name: String,
    pub version: String,
    pub organizations: BTreeMap<String, serde_json::Value>,
    pub peers: BTreeMap<String, PeerEndpoint>,
    pub certificate_authorities: BTreeMap<String, serde_json::Value>,
}

impl ConnectionProfile {
    /// URLs of every peer named in the profile, in name order.
    pub fn peer_urls(&self) -> Vec<&str> {
        self.peers.values().map(|p| p.url.as_str()).collect()
    }
}

// =============================================================================
// DOMAIN REQUESTS / RESPONSES
// =============================================================================

/// Request for `create_user`. Missing fields deserialize as empty and are
/// rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub id: String,
    pub name: String,
    pub org: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: String,
}

/// Request for `check_access`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckAccessRequest {
    pub user_id: String,
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAccessResponse {
    pub user_id: String,
    pub resource_id: String,
    pub access_granted: bool,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Request for `record_event`. `metadata` defaults to an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordEventRequest {
    pub event_type: String,
    pub actor: String,
    pub resource: String,
    pub action: String,
    pub result: String,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEventResponse {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}
