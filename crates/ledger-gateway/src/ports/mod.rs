//! Ports for the Ledger Gateway.
//!
//! The gateway drives three collaborators it does not own: the identity
//! store, the connection profile source and the ledger network itself.

pub mod outbound;

pub use outbound::{
    IdentityError, IdentityResolver, LedgerContract, LedgerError, LedgerNetwork, LedgerSession,
    ProfileError, ProfileLoader, SystemTimeSource, TimeSource,
};
