//! HTTP binding for the gateway operations.
//!
//! Transport only: bodies are deserialized, handed to [`GatewayService`]
//! and the result or translated error is serialized back. No business
//! logic lives here.
//!
//! [`GatewayService`]: crate::service::GatewayService

pub mod cors;
pub mod headers;
pub mod routes;

pub use cors::create_cors_layer;
pub use headers::with_security_headers;
pub use routes::{router, status_code, ErrorBody};
