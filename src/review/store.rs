//! Aggregate review state and the only operations allowed to mutate it.
//!
//! Each draft carries an [`EditVersion`] bumped on every edit. Validation
//! results are merged only when they were computed from the live version,
//! so a late response can never overwrite the result of a newer draft.
//! Versions come from one store-wide clock that survives `initialize` and
//! `reset`, so a call started for earlier content can never match a draft
//! seeded later.

use crate::api::traits::ApprovalPayload;
use crate::content::{EditableContent, FieldEdit, GeneratedContent, PlatformKey};
use crate::review::validation::ValidationResult;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Edit stamp of a draft. Strictly increasing over the life of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EditVersion(u64);

impl EditVersion {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EditVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Snapshot of the review aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewState {
    pub original_content: GeneratedContent,
    pub edited_content: BTreeMap<PlatformKey, EditableContent>,
    pub selected_platforms: BTreeSet<PlatformKey>,
    pub is_editing: bool,
    pub validation_results: BTreeMap<PlatformKey, ValidationResult>,
}

/// How far a platform's displayed validation result can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationStatus {
    /// No result has been merged for this draft yet.
    Pending,
    /// The result was computed from the current draft.
    Fresh,
    /// The draft changed after the result was computed.
    Stale,
    /// The latest validation attempt for the current draft failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidationFailure {
    version: EditVersion,
    message: String,
}

#[derive(Debug, Default)]
pub struct ContentStore {
    state: ReviewState,
    clock: EditVersion,
    versions: BTreeMap<PlatformKey, EditVersion>,
    validated_at: BTreeMap<PlatformKey, EditVersion>,
    failures: BTreeMap<PlatformKey, ValidationFailure>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a review of freshly generated content. Every platform present
    /// in `platform_specific` gets a draft and starts selected.
    pub fn initialize(&mut self, generated: GeneratedContent) {
        self.initialize_with(generated, |_| true);
    }

    /// Like [`initialize`](Self::initialize), seeding drafts only for the
    /// platforms `keep` accepts.
    pub fn initialize_with(
        &mut self,
        generated: GeneratedContent,
        mut keep: impl FnMut(&PlatformKey) -> bool,
    ) {
        let edited_content: BTreeMap<_, _> = generated
            .platform_specific
            .iter()
            .filter(|(key, _)| keep(key))
            .map(|(key, content)| {
                (key.clone(), EditableContent::from_generated(key.clone(), content))
            })
            .collect();

        let versions = edited_content
            .keys()
            .map(|key| (key.clone(), self.tick()))
            .collect();
        self.versions = versions;
        self.validated_at.clear();
        self.failures.clear();
        self.state = ReviewState {
            selected_platforms: edited_content.keys().cloned().collect(),
            edited_content,
            original_content: generated,
            is_editing: false,
            validation_results: BTreeMap::new(),
        };
        tracing::debug!(
            platforms = self.state.edited_content.len(),
            "review state initialized"
        );
    }

    /// Drop all review state, as after a reject or regenerate.
    pub fn reset(&mut self) {
        *self = Self {
            clock: self.clock,
            ..Self::default()
        };
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn draft(&self, platform: &PlatformKey) -> Option<&EditableContent> {
        self.state.edited_content.get(platform)
    }

    pub fn version(&self, platform: &PlatformKey) -> Option<EditVersion> {
        self.versions.get(platform).copied()
    }

    /// Draft and live version together, as captured for a validation call.
    pub fn snapshot(&self, platform: &PlatformKey) -> Option<(EditableContent, EditVersion)> {
        Some((self.draft(platform)?.clone(), self.version(platform)?))
    }

    pub fn platforms(&self) -> impl Iterator<Item = &PlatformKey> {
        self.state.edited_content.keys()
    }

    pub fn selected_platforms(&self) -> &BTreeSet<PlatformKey> {
        &self.state.selected_platforms
    }

    pub fn is_selected(&self, platform: &PlatformKey) -> bool {
        self.state.selected_platforms.contains(platform)
    }

    pub fn is_editing(&self) -> bool {
        self.state.is_editing
    }

    /// Select or deselect a platform. Deselected drafts are kept for later
    /// re-selection. Returns `false` for platforms without a draft.
    pub fn set_platform_selected(&mut self, platform: &PlatformKey, enabled: bool) -> bool {
        if !self.state.edited_content.contains_key(platform) {
            tracing::warn!(%platform, "ignoring selection change for unknown platform");
            return false;
        }
        if enabled {
            self.state.selected_platforms.insert(platform.clone());
        } else {
            self.state.selected_platforms.remove(platform);
        }
        true
    }

    /// Apply one field edit and bump the draft's version.
    pub fn edit_field(&mut self, platform: &PlatformKey, edit: FieldEdit) -> Option<EditVersion> {
        let Some(draft) = self.state.edited_content.get_mut(platform) else {
            tracing::warn!(%platform, field = %edit.field(), "ignoring edit for unknown platform");
            return None;
        };
        draft.apply(edit);
        Some(self.bump(platform))
    }

    /// Append a suggested hashtag while the draft is below `limit`.
    /// Returns the new version when the tag was added.
    pub fn add_hashtag_suggestion(
        &mut self,
        platform: &PlatformKey,
        tag: &str,
        limit: usize,
    ) -> Option<EditVersion> {
        let draft = self.state.edited_content.get_mut(platform)?;
        if !draft.hashtags.insert_capped(tag, limit) {
            return None;
        }
        Some(self.bump(platform))
    }

    pub fn remove_hashtag(&mut self, platform: &PlatformKey, tag: &str) -> Option<EditVersion> {
        let draft = self.state.edited_content.get_mut(platform)?;
        if !draft.hashtags.remove(tag) {
            return None;
        }
        Some(self.bump(platform))
    }

    fn tick(&mut self) -> EditVersion {
        self.clock = self.clock.next();
        self.clock
    }

    fn bump(&mut self, platform: &PlatformKey) -> EditVersion {
        let version = self.tick();
        self.versions.insert(platform.clone(), version);
        version
    }

    /// Store `result` iff it was computed from the live draft version.
    /// Returns whether it was merged; stale results are dropped.
    pub fn merge_validation_result(
        &mut self,
        platform: &PlatformKey,
        version: EditVersion,
        result: ValidationResult,
    ) -> bool {
        let Some(current) = self.version(platform) else {
            tracing::debug!(%platform, "dropping validation result for unknown platform");
            return false;
        };
        if version != current {
            tracing::debug!(%platform, %version, %current, "dropping stale validation result");
            return false;
        }
        if result.platform != *platform {
            tracing::warn!(
                %platform,
                reported = %result.platform,
                "dropping validation result reported for another platform"
            );
            return false;
        }

        self.state.validation_results.insert(platform.clone(), result);
        self.validated_at.insert(platform.clone(), version);
        self.failures.remove(platform);
        true
    }

    /// Note a failed validation attempt. The previous result stays visible.
    pub fn record_validation_failure(
        &mut self,
        platform: &PlatformKey,
        version: EditVersion,
        message: impl Into<String>,
    ) {
        if self.version(platform) == Some(version) {
            self.failures.insert(
                platform.clone(),
                ValidationFailure {
                    version,
                    message: message.into(),
                },
            );
        }
    }

    pub fn validation_result(&self, platform: &PlatformKey) -> Option<&ValidationResult> {
        self.state.validation_results.get(platform)
    }

    /// The stored result, only if it matches the live draft.
    pub fn fresh_result(&self, platform: &PlatformKey) -> Option<&ValidationResult> {
        let current = self.version(platform)?;
        (self.validated_at.get(platform) == Some(&current))
            .then(|| self.validation_result(platform))
            .flatten()
    }

    pub fn validation_status(&self, platform: &PlatformKey) -> Option<ValidationStatus> {
        let current = self.version(platform)?;
        let status = if self
            .failures
            .get(platform)
            .is_some_and(|failure| failure.version == current)
        {
            ValidationStatus::Failed
        } else if self.fresh_result(platform).is_some() {
            ValidationStatus::Fresh
        } else if self.validation_result(platform).is_some() {
            ValidationStatus::Stale
        } else {
            ValidationStatus::Pending
        };
        Some(status)
    }

    pub fn validation_error(&self, platform: &PlatformKey) -> Option<&str> {
        self.failures
            .get(platform)
            .map(|failure| failure.message.as_str())
    }

    /// Presentational only; has no effect on validation.
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.state.is_editing = !self.state.is_editing;
        self.state.is_editing
    }

    /// Drafts of every selected platform, as handed to the publisher.
    pub fn build_approval_payload(&self) -> ApprovalPayload {
        self.state
            .selected_platforms
            .iter()
            .filter_map(|platform| {
                self.state
                    .edited_content
                    .get(platform)
                    .map(|draft| (platform.clone(), draft.clone()))
            })
            .collect()
    }
}
