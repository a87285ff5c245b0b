//! Draft validation against platform limits.
//!
//! [`validate`] is pure and is the single source of truth for what makes a
//! draft publishable; the remote validation endpoint applies the same rules.

use crate::api::traits::{ValidationRequest, ValidationService};
use crate::content::{ContentField, EditableContent, PlatformKey, PlatformLimits};
use crate::error::ApiError;
use crate::review::catalog::PlatformCatalog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lengths are counted in characters, not bytes.
fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: ContentField,
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
}

impl ValidationIssue {
    fn too_long(field: ContentField, current: usize, max: usize) -> Self {
        Self {
            field,
            issue: format!("{field} exceeds maximum length of {max} characters"),
            current_length: Some(current),
            max_length: Some(max),
            current_count: None,
            max_count: None,
        }
    }

    fn too_many_hashtags(current: usize, max: usize) -> Self {
        Self {
            field: ContentField::Hashtags,
            issue: format!("too many hashtags (maximum {max})"),
            current_length: None,
            max_length: None,
            current_count: Some(current),
            max_count: Some(max),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCounts {
    pub title: usize,
    pub description: usize,
    pub hashtag_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub platform: PlatformKey,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    pub character_counts: CharacterCounts,
}

impl ValidationResult {
    pub fn issues_for(&self, field: ContentField) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.field == field)
    }
}

/// Check a draft against one platform's limits.
pub fn validate(draft: &EditableContent, limits: &PlatformLimits) -> ValidationResult {
    let character_counts = CharacterCounts {
        title: char_count(&draft.title),
        description: char_count(&draft.description),
        hashtag_count: draft.hashtags.len(),
    };

    let mut issues = Vec::new();
    if character_counts.title > limits.title_max_length {
        issues.push(ValidationIssue::too_long(
            ContentField::Title,
            character_counts.title,
            limits.title_max_length,
        ));
    }
    if character_counts.description > limits.description_max_length {
        issues.push(ValidationIssue::too_long(
            ContentField::Description,
            character_counts.description,
            limits.description_max_length,
        ));
    }
    if limits.hashtag_limit > 0 && character_counts.hashtag_count > limits.hashtag_limit {
        issues.push(ValidationIssue::too_many_hashtags(
            character_counts.hashtag_count,
            limits.hashtag_limit,
        ));
    }

    ValidationResult {
        valid: issues.is_empty(),
        platform: draft.platform.clone(),
        issues,
        character_counts,
    }
}

/// In-process [`ValidationService`] backed by the loaded catalog.
pub struct LocalValidator {
    catalog: Arc<PlatformCatalog>,
}

impl LocalValidator {
    pub fn new(catalog: Arc<PlatformCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ValidationService for LocalValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult, ApiError> {
        let platform = self
            .catalog
            .get(&request.platform)
            .ok_or_else(|| ApiError::Rejected {
                endpoint: "local validation".into(),
                message: format!("unknown platform {}", request.platform),
            })?;
        Ok(validate(&request.to_draft(), &platform.limits))
    }
}
