//! Connection profile loaded from a JSON file.

use crate::domain::types::ConnectionProfile;
use crate::ports::outbound::{ProfileError, ProfileLoader};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads the profile from disk on every load, so edits take effect on the
/// next request without a restart.
#[derive(Debug, Clone)]
pub struct JsonProfileLoader {
    path: PathBuf,
}

impl JsonProfileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProfileLoader for JsonProfileLoader {
    async fn load_connection_profile(&self) -> Result<ConnectionProfile, ProfileError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ProfileError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ProfileError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}
