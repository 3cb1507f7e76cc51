//! CORS policy from gateway configuration.
//!
//! A `"*"` entry allows any origin or header. Entries that fail to parse are
//! skipped. A disabled policy adds no CORS headers at all.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderName, HeaderValue, Method};
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins(&config.allowed_origins))
        .allow_methods(parse_all::<Method>(&config.allowed_methods))
        .allow_headers(request_headers(&config.allowed_headers))
        .max_age(Duration::from_secs(config.max_age))
}

fn origins(values: &[String]) -> AllowOrigin {
    if has_wildcard(values) {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_all::<HeaderValue>(values))
    }
}

fn request_headers(values: &[String]) -> AllowHeaders {
    if has_wildcard(values) {
        AllowHeaders::any()
    } else {
        AllowHeaders::list(parse_all::<HeaderName>(values))
    }
}

fn has_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

fn parse_all<T: FromStr>(values: &[String]) -> Vec<T> {
    values.iter().filter_map(|v| v.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_unparseable_entries_skipped() {
        let methods = parse_all::<Method>(&strings(&["GET", "NOT A METHOD", "POST"]));
        assert_eq!(methods, vec![Method::GET, Method::POST]);

        let headers = parse_all::<HeaderName>(&strings(&["content-type", "bad header"]));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(has_wildcard(&strings(&["https://a.example", "*"])));
        assert!(!has_wildcard(&strings(&["https://a.example"])));
    }
}
