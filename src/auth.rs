//! Per-call credentials.
//!
//! Token acquisition (service account keys, metadata server, workload identity)
//! is left to the caller; a provider only hands the client a bearer token to
//! attach to each call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Supplies the bearer token attached to each call.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// `None` sends the call without an `authorization` header.
    async fn token(&self) -> Result<Option<String>>;
}

/// A fixed, already-minted access token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

#[async_trait]
impl CredentialsProvider for StaticToken {
    async fn token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// Anonymous calls, for emulators or API-key authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialsProvider for NoCredentials {
    async fn token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Provider implied by the configuration.
///
/// An API key and an access token are mutually exclusive.
pub fn from_config(config: &ClientConfig) -> Result<Arc<dyn CredentialsProvider>> {
    match (&config.access_token, &config.api_key) {
        (Some(_), Some(_)) => Err(ClientError::Config(
            "api_key and access_token are mutually exclusive".to_string(),
        )),
        (Some(token), None) => Ok(Arc::new(StaticToken::new(token.clone()))),
        (None, _) => Ok(Arc::new(NoCredentials)),
    }
}
