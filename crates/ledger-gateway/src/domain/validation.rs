//! Required-field validation for domain requests.
//!
//! Runs before any session is opened. A field counts as missing when it is
//! absent, empty or whitespace only; lists must have at least one entry.

use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::types::{CheckAccessRequest, CreateUserRequest, RecordEventRequest};

/// Request types that can check their own required fields.
pub trait Validate {
    fn validate(&self) -> GatewayResult<()>;
}

/// Collects the names of missing fields so one error reports all of them.
#[derive(Debug, Default)]
struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    fn text(mut self, name: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(name);
        }
        self
    }

    fn list(mut self, name: &'static str, values: &[String]) -> Self {
        if values.is_empty() || values.iter().any(|v| v.trim().is_empty()) {
            self.missing.push(name);
        }
        self
    }

    fn finish(self) -> GatewayResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::missing_fields(&self.missing))
        }
    }
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> GatewayResult<()> {
        RequiredFields::default()
            .text("id", &self.id)
            .text("name", &self.name)
            .text("org", &self.org)
            .list("roles", &self.roles)
            .finish()
    }
}

impl Validate for CheckAccessRequest {
    fn validate(&self) -> GatewayResult<()> {
        RequiredFields::default()
            .text("userId", &self.user_id)
            .text("resourceId", &self.resource_id)
            .finish()
    }
}

impl Validate for RecordEventRequest {
    fn validate(&self) -> GatewayResult<()> {
        RequiredFields::default()
            .text("eventType", &self.event_type)
            .text("actor", &self.actor)
            .text("resource", &self.resource)
            .text("action", &self.action)
            .text("result", &self.result)
            .finish()
    }
}
