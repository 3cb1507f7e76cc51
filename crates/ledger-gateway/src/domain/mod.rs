//! Domain layer for the Ledger Gateway.
//!
//! Pure types and functions: call model, configuration, error taxonomy,
//! argument codec, request validation and the operation table. Nothing in
//! here performs I/O.

pub mod codec;
pub mod config;
pub mod correlation;
pub mod error;
pub mod operations;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use config::{ConfigError, GatewayConfig};
pub use correlation::CorrelationId;
pub use error::{
    translate, ConnectionFailure, DispatchFailure, ErrorKind, GatewayError, GatewayResult,
    StatusKind,
};
pub use operations::{ContractRole, OperationDescriptor, OperationKind, OPERATIONS};
pub use types::*;
pub use validation::Validate;
