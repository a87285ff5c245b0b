use crate::content::{EditableContent, HashtagSet, Platform, PlatformKey};
use crate::error::ApiError;
use crate::review::validation::ValidationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Drafts handed to the publisher on approval, keyed by platform.
pub type ApprovalPayload = BTreeMap<PlatformKey, EditableContent>;

/// Draft snapshot sent for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub platform: PlatformKey,
    pub title: String,
    pub description: String,
    pub hashtags: Vec<String>,
}

impl ValidationRequest {
    pub fn from_draft(draft: &EditableContent) -> Self {
        Self {
            platform: draft.platform.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            hashtags: draft.hashtags.as_slice().to_vec(),
        }
    }

    pub fn to_draft(&self) -> EditableContent {
        EditableContent {
            title: self.title.clone(),
            description: self.description.clone(),
            hashtags: HashtagSet::from_tokens(&self.hashtags),
            platform: self.platform.clone(),
        }
    }
}

/// Source of the platform table.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    async fn fetch_platforms(&self) -> Result<BTreeMap<PlatformKey, Platform>, ApiError>;
}

/// Checks a draft against its platform's constraints.
#[async_trait]
pub trait ValidationService: Send + Sync {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult, ApiError>;
}

/// Downstream publishing collaborator. Only success or failure matters to
/// the review workflow.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn approve(&self, payload: &ApprovalPayload) -> Result<(), ApiError>;

    async fn reject(&self) -> Result<(), ApiError>;

    async fn regenerate(&self) -> Result<(), ApiError>;
}
