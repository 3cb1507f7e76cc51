//! Ledger Gateway - mediates domain requests onto a permissioned ledger.
//!
//! Accepts user-management, access-check and audit requests and turns each
//! into exactly one ledger call: a `submit` for writes, an `evaluate` for
//! reads. Returns a normalized result or a classified [`GatewayError`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         LEDGER GATEWAY                             │
//! ├────────────────────────────────────────────────────────────────────┤
//! │  HTTP binding (axum)           POST /api/v1/{users,access,audit}   │
//! │         │                                                          │
//! │  ┌──────┴───────────────────────────────────────────┐              │
//! │  │ Operation Handlers  validate → CallSpec → decode │              │
//! │  └──────┬─────────────────────────────┬─────────────┘              │
//! │         │                             │                            │
//! │  ┌──────┴────────┐            ┌───────┴─────────┐                  │
//! │  │Session Manager│──session──▶│   Dispatcher    │                  │
//! │  │ acquire/release│           │ submit/evaluate │                  │
//! │  └──────┬────────┘            └───────┬─────────┘                  │
//! └─────────┼─────────────────────────────┼────────────────────────────┘
//!           │                             │
//!   IdentityResolver / ProfileLoader   LedgerNetwork (channel/contract)
//! ```
//!
//! # Guarantees
//!
//! - Validation runs before any session is opened.
//! - One session per request, released on every exit path.
//! - Submits are issued at most once and never retried by the gateway.
//! - A submit that fails in transit is reported as an ambiguous outcome,
//!   never as a plain failure.
//! - Callers only ever see translated messages; causes go to the logs.
//!
//! # Usage
//!
//! ```ignore
//! use ledger_gateway::{GatewayConfig, GatewayService};
//!
//! let config = GatewayConfig::from_env()?;
//! ledger_gateway::telemetry::init_tracing(&config.logging)?;
//! let service = Arc::new(GatewayService::with_file_collaborators(config, network)?);
//! service.serve(shutdown_rx).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod dispatcher;
pub mod domain;
pub mod handlers;
pub mod http;
pub mod ports;
pub mod service;
pub mod session;
pub mod telemetry;

// Re-exports for public API
pub use dispatcher::TransactionDispatcher;
pub use domain::config::GatewayConfig;
pub use domain::error::{translate, ErrorKind, GatewayError, GatewayResult, StatusKind};
pub use domain::types::*;
pub use handlers::OperationContext;
pub use service::{GatewayService, ServeError};
pub use session::{SessionGuard, SessionManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
