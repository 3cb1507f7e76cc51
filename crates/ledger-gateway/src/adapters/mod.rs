//! Adapters for the Ledger Gateway.
//!
//! Infrastructure implementations of the outbound ports.

pub mod memory;
pub mod profile;
pub mod wallet;

pub use memory::{InMemoryLedger, RecordedCall, StaticIdentities, StaticProfile};
pub use profile::JsonProfileLoader;
pub use wallet::FileSystemWallet;
