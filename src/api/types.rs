//! Wire envelopes of the content API.

use crate::api::traits::ApprovalPayload;
use crate::content::{Platform, PlatformKey};
use crate::review::validation::{CharacterCounts, ValidationIssue, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields every response carries.
pub(crate) trait Envelope {
    fn success(&self) -> bool;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }

            fn error_message(&self) -> Option<&str> {
                self.error.as_deref().or(self.message.as_deref())
            }
        })+
    };
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlatformsResponse {
    pub success: bool,
    #[serde(default)]
    pub platforms: BTreeMap<PlatformKey, Platform>,
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub success: bool,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub platform: Option<PlatformKey>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub character_counts: CharacterCounts,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ValidateResponse {
    /// The server echoes the platform; fall back to the requested one.
    pub fn into_result(self, requested: &PlatformKey) -> ValidationResult {
        ValidationResult {
            valid: self.valid && self.issues.is_empty(),
            platform: self.platform.unwrap_or_else(|| requested.clone()),
            issues: self.issues,
            character_counts: self.character_counts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl_envelope!(PlatformsResponse, ValidateResponse, ActionResponse);

#[derive(Debug, Serialize)]
pub(crate) struct ApproveRequest<'a> {
    pub platforms: &'a ApprovalPayload,
}
