//! Collaborators for one CLI invocation.

use crate::api::{ApprovalPayload, HttpApiClient, PlatformSource, Publisher, ValidationService};
use crate::auth::SessionContext;
use crate::config::{Config, ValidationMode};
use crate::error::{ApiError, CatalogError};
use crate::review::{LocalValidator, PlatformCatalog, StaticPlatformSource};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const CATALOG_ATTEMPTS: u32 = 3;

/// Publisher used offline: accepts every action without side effects.
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn approve(&self, payload: &ApprovalPayload) -> Result<(), ApiError> {
        tracing::info!(platforms = payload.len(), "dry run: approval not sent");
        Ok(())
    }

    async fn reject(&self) -> Result<(), ApiError> {
        tracing::info!("dry run: rejection not sent");
        Ok(())
    }

    async fn regenerate(&self) -> Result<(), ApiError> {
        tracing::info!("dry run: regeneration not requested");
        Ok(())
    }
}

pub struct Backend {
    pub source: Arc<dyn PlatformSource>,
    pub publisher: Arc<dyn Publisher>,
    remote_validator: Option<Arc<dyn ValidationService>>,
}

impl Backend {
    pub fn from_config(config: &Config, offline: bool) -> Self {
        if offline {
            return Self {
                source: Arc::new(StaticPlatformSource::new(config.offline_platforms())),
                publisher: Arc::new(DryRunPublisher),
                remote_validator: None,
            };
        }

        let session = SessionContext::from_config(&config.api);
        tracing::debug!(?session, "api session created");
        let client = Arc::new(HttpApiClient::new(session, config.api.timeout_secs));
        let remote_validator: Option<Arc<dyn ValidationService>> =
            match config.review.validation_mode {
                ValidationMode::Remote => Some(client.clone()),
                ValidationMode::Local => None,
            };
        Self {
            source: client.clone(),
            publisher: client,
            remote_validator,
        }
    }

    /// Load the catalog, retrying transient failures with a short backoff.
    pub async fn load_catalog(&self) -> Result<Arc<PlatformCatalog>, CatalogError> {
        let mut attempt = 1;
        loop {
            match PlatformCatalog::load(self.source.as_ref()).await {
                Ok(catalog) => return Ok(Arc::new(catalog)),
                Err(error) if error.is_retryable() && attempt < CATALOG_ATTEMPTS => {
                    tracing::warn!(attempt, %error, "platform catalog load failed; retrying");
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub fn validator(&self, catalog: &Arc<PlatformCatalog>) -> Arc<dyn ValidationService> {
        self.remote_validator
            .clone()
            .unwrap_or_else(|| {
                Arc::new(LocalValidator::new(Arc::clone(catalog))) as Arc<dyn ValidationService>
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ValidationRequest;

    #[tokio::test]
    async fn offline_backend_validates_locally() {
        let backend = Backend::from_config(&Config::default(), true);
        let catalog = backend.load_catalog().await.unwrap();
        let validator = backend.validator(&catalog);
        let result = validator
            .validate(&ValidationRequest {
                platform: "twitter".into(),
                title: String::new(),
                description: "x".repeat(281),
                hashtags: vec![],
            })
            .await
            .unwrap();
        assert!(!result.valid);
    }

    #[tokio::test]
    async fn dry_run_publisher_accepts_everything() {
        let publisher = DryRunPublisher;
        assert!(publisher.approve(&ApprovalPayload::new()).await.is_ok());
        assert!(publisher.reject().await.is_ok());
        assert!(publisher.regenerate().await.is_ok());
    }
}
