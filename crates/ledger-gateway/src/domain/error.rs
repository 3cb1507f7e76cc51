//! Gateway error taxonomy and the error translator.
//!
//! Every failure path ends in a [`GatewayError`]. [`translate`] turns one
//! into the caller-facing `(StatusKind, message)` pair; detailed causes stay
//! in the `detail` fields and are only ever logged.

use crate::domain::types::CallKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of error kinds visible at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    ConnectionError,
    DispatchError,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::DispatchError => "DispatchError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// Why a session could not be acquired. No ledger state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionFailure {
    IdentityNotFound,
    /// The credential store exists but could not be read
    IdentityUnavailable,
    ProfileUnreadable,
    OpenFailed,
    Timeout,
}

impl fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionFailure::IdentityNotFound => "identity_not_found",
            ConnectionFailure::IdentityUnavailable => "identity_unavailable",
            ConnectionFailure::ProfileUnreadable => "profile_unreadable",
            ConnectionFailure::OpenFailed => "open_failed",
            ConnectionFailure::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Why a dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchFailure {
    ChannelNotFound,
    ContractNotFound,
    Transport,
    Endorsement,
    Timeout,
    MalformedPayload,
}

impl DispatchFailure {
    /// Failures after which a submitted write may or may not have been
    /// committed. Endorsement failures happen before ordering, so they are
    /// definite.
    pub fn leaves_write_ambiguous(&self) -> bool {
        matches!(self, DispatchFailure::Transport | DispatchFailure::Timeout)
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchFailure::ChannelNotFound => "channel_not_found",
            DispatchFailure::ContractNotFound => "contract_not_found",
            DispatchFailure::Transport => "transport",
            DispatchFailure::Endorsement => "endorsement",
            DispatchFailure::Timeout => "timeout",
            DispatchFailure::MalformedPayload => "malformed_payload",
        };
        f.write_str(name)
    }
}

/// Classified gateway failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Caller input fault. Raised before any session is opened.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Identity, profile or session-open failure.
    #[error("connection error ({reason}): {detail}")]
    Connection {
        reason: ConnectionFailure,
        detail: String,
    },

    /// Contract lookup, transport, endorsement, timeout or payload failure.
    ///
    /// `ambiguous` is set when a submit may have been committed despite the
    /// failure.
    #[error("dispatch error ({reason}): {detail}")]
    Dispatch {
        reason: DispatchFailure,
        ambiguous: bool,
        detail: String,
    },

    /// Unclassified fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Validation error naming every missing field.
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::validation(format!(
            "missing required parameters: {}",
            fields.join(", ")
        ))
    }

    pub fn connection(reason: ConnectionFailure, detail: impl Into<String>) -> Self {
        Self::Connection {
            reason,
            detail: detail.into(),
        }
    }

    /// Dispatch failure for a definite outcome (nothing was committed, or
    /// the call was a read).
    pub fn dispatch(reason: DispatchFailure, detail: impl Into<String>) -> Self {
        Self::Dispatch {
            reason,
            ambiguous: false,
            detail: detail.into(),
        }
    }

    /// Dispatch failure for a call of the given kind. Writes that fail in
    /// transit are marked ambiguous.
    pub fn dispatch_for(
        call: CallKind,
        reason: DispatchFailure,
        detail: impl Into<String>,
    ) -> Self {
        Self::Dispatch {
            reason,
            ambiguous: call.is_write() && reason.leaves_write_ambiguous(),
            detail: detail.into(),
        }
    }

    pub fn malformed_payload(detail: impl Into<String>) -> Self {
        Self::dispatch(DispatchFailure::MalformedPayload, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation { .. } => ErrorKind::ValidationError,
            GatewayError::Connection { .. } => ErrorKind::ConnectionError,
            GatewayError::Dispatch { .. } => ErrorKind::DispatchError,
            GatewayError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Whether a write may have been committed even though the call failed.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, GatewayError::Dispatch { ambiguous: true, .. })
    }

    pub fn connection_reason(&self) -> Option<ConnectionFailure> {
        match self {
            GatewayError::Connection { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn dispatch_reason(&self) -> Option<DispatchFailure> {
        match self {
            GatewayError::Dispatch { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// ERROR TRANSLATOR
// =============================================================================

/// Who is at fault, as seen by the caller. The transport maps this to its
/// own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    CallerFault,
    ServiceFault,
    InternalFault,
}

/// Message returned for connection failures.
pub const MSG_NETWORK_UNAVAILABLE: &str = "ledger network unavailable";
/// Message returned for definite dispatch failures.
pub const MSG_CALL_FAILED: &str = "ledger call failed";
/// Message returned when a submit may or may not have been committed.
pub const MSG_OUTCOME_UNKNOWN: &str =
    "transaction outcome unknown: the write may have been committed";
/// Message returned for unclassified failures.
pub const MSG_INTERNAL: &str = "internal gateway error";

/// Map an error to its caller-facing status and message.
///
/// Only validation messages are passed through; everything else is replaced
/// by a fixed message so no transport detail reaches the caller.
pub fn translate(error: &GatewayError) -> (StatusKind, String) {
    match error {
        GatewayError::Validation { message } => (StatusKind::CallerFault, message.clone()),
        GatewayError::Connection { .. } => {
            (StatusKind::ServiceFault, MSG_NETWORK_UNAVAILABLE.to_string())
        }
        GatewayError::Dispatch {
            reason: DispatchFailure::MalformedPayload,
            ..
        } => (
            StatusKind::ServiceFault,
            "ledger returned an unreadable result".to_string(),
        ),
        GatewayError::Dispatch {
            ambiguous: true, ..
        } => (StatusKind::ServiceFault, MSG_OUTCOME_UNKNOWN.to_string()),
        GatewayError::Dispatch { .. } => (StatusKind::ServiceFault, MSG_CALL_FAILED.to_string()),
        GatewayError::Internal(_) => (StatusKind::InternalFault, MSG_INTERNAL.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            GatewayError::validation("x").kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            GatewayError::connection(ConnectionFailure::OpenFailed, "x").kind(),
            ErrorKind::ConnectionError
        );
        assert_eq!(
            GatewayError::malformed_payload("x").kind(),
            ErrorKind::DispatchError
        );
        assert_eq!(GatewayError::internal("x").kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_missing_fields_message() {
        let err = GatewayError::missing_fields(&["userId", "resourceId"]);
        let (status, message) = translate(&err);
        assert_eq!(status, StatusKind::CallerFault);
        assert_eq!(message, "missing required parameters: userId, resourceId");
    }

    #[test]
    fn test_submit_transport_failure_is_ambiguous() {
        let err = GatewayError::dispatch_for(
            CallKind::Submit,
            DispatchFailure::Transport,
            "connection reset by peer",
        );
        assert!(err.is_ambiguous());
        let (status, message) = translate(&err);
        assert_eq!(status, StatusKind::ServiceFault);
        assert_eq!(message, MSG_OUTCOME_UNKNOWN);
    }

    #[test]
    fn test_endorsement_and_reads_are_definite() {
        let endorsement = GatewayError::dispatch_for(
            CallKind::Submit,
            DispatchFailure::Endorsement,
            "policy not satisfied",
        );
        assert!(!endorsement.is_ambiguous());

        let read_timeout =
            GatewayError::dispatch_for(CallKind::Evaluate, DispatchFailure::Timeout, "5s");
        assert!(!read_timeout.is_ambiguous());
        assert_eq!(translate(&read_timeout).1, MSG_CALL_FAILED);
    }

    #[test]
    fn test_translate_hides_detail() {
        let err = GatewayError::connection(
            ConnectionFailure::ProfileUnreadable,
            "/etc/gateway/connection-org1.json: permission denied",
        );
        let (status, message) = translate(&err);
        assert_eq!(status, StatusKind::ServiceFault);
        assert!(!message.contains("permission denied"));

        let (status, message) = translate(&GatewayError::internal("thread panicked at"));
        assert_eq!(status, StatusKind::InternalFault);
        assert!(!message.contains("panicked"));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            ConnectionFailure::IdentityNotFound.to_string(),
            "identity_not_found"
        );
        assert_eq!(
            DispatchFailure::MalformedPayload.to_string(),
            "malformed_payload"
        );
        let err = GatewayError::dispatch(DispatchFailure::ContractNotFound, "accesscontrol");
        assert_eq!(
            err.to_string(),
            "dispatch error (contract_not_found): accesscontrol"
        );
    }
}
