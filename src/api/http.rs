//! HTTP implementation of the content API collaborator.
//!
//! One client serves the platform catalog, remote validation and the
//! approve / reject / regenerate hand-off. Every call authenticates with the
//! bearer token of the [`SessionContext`] it was built with.

use super::build_api_client;
use super::scrub::sanitize_api_error;
use super::traits::{ApprovalPayload, PlatformSource, Publisher, ValidationRequest, ValidationService};
use super::types::{ActionResponse, ApproveRequest, Envelope, PlatformsResponse, ValidateResponse};
use crate::auth::SessionContext;
use crate::content::{Platform, PlatformKey};
use crate::error::ApiError;
use crate::review::validation::ValidationResult;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

const PLATFORMS_PATH: &str = "platforms";
const VALIDATE_PATH: &str = "content/validate";
const APPROVE_PATH: &str = "content/approve";
const REJECT_PATH: &str = "content/reject";
const REGENERATE_PATH: &str = "content/regenerate";

pub struct HttpApiClient {
    session: SessionContext,
    client: Client,
}

impl HttpApiClient {
    pub fn new(session: SessionContext, timeout_secs: u64) -> Self {
        Self {
            session,
            client: build_api_client(timeout_secs),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Log out, zeroizing the session token.
    pub fn close(self) {
        self.session.logout();
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.session.bearer()?;
        Ok(request.bearer_auth(token))
    }

    async fn execute<T>(&self, path: &'static str, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Envelope,
    {
        let request = self.authorized(request)?;
        let response = request.send().await.map_err(|e| ApiError::Request {
            endpoint: path.to_string(),
            message: sanitize_api_error(&e.to_string()),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            });
        }

        let envelope: T = response.json().await.map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;

        if !envelope.success() {
            return Err(ApiError::Rejected {
                endpoint: path.to_string(),
                message: envelope
                    .error_message()
                    .map_or_else(|| "no reason given".to_string(), sanitize_api_error),
            });
        }
        Ok(envelope)
    }

    async fn post_action(&self, path: &'static str) -> Result<(), ApiError> {
        let request = self.client.post(self.session.endpoint(path));
        self.execute::<ActionResponse>(path, request).await?;
        Ok(())
    }
}

#[async_trait]
impl PlatformSource for HttpApiClient {
    async fn fetch_platforms(&self) -> Result<BTreeMap<PlatformKey, Platform>, ApiError> {
        let request = self.client.get(self.session.endpoint(PLATFORMS_PATH));
        let response: PlatformsResponse = self.execute(PLATFORMS_PATH, request).await?;
        if let Some(total) = response.total_count
            && total != response.platforms.len()
        {
            tracing::warn!(
                total,
                received = response.platforms.len(),
                "platform catalog count mismatch"
            );
        }
        Ok(response.platforms)
    }
}

#[async_trait]
impl ValidationService for HttpApiClient {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult, ApiError> {
        let http = self
            .client
            .post(self.session.endpoint(VALIDATE_PATH))
            .json(request);
        let response: ValidateResponse = self.execute(VALIDATE_PATH, http).await?;
        Ok(response.into_result(&request.platform))
    }
}

#[async_trait]
impl Publisher for HttpApiClient {
    async fn approve(&self, payload: &ApprovalPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.session.endpoint(APPROVE_PATH))
            .json(&ApproveRequest { platforms: payload });
        self.execute::<ActionResponse>(APPROVE_PATH, request).await?;
        Ok(())
    }

    async fn reject(&self) -> Result<(), ApiError> {
        self.post_action(REJECT_PATH).await
    }

    async fn regenerate(&self) -> Result<(), ApiError> {
        self.post_action(REGENERATE_PATH).await
    }
}
