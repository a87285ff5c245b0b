use super::hashtags::HashtagSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};

/// Stable identifier of a publishing platform (e.g. `instagram`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformKey(String);

impl PlatformKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlatformKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlatformKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length and count constraints a draft must satisfy on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLimits {
    pub title_max_length: usize,
    pub description_max_length: usize,
    /// Zero means the platform does not cap hashtags.
    #[serde(default)]
    pub hashtag_limit: usize,
}

/// A publishing target as described by the platform catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub limits: PlatformLimits,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Platform-adapted copy as produced by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Alternative phrasing offered alongside the main copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentVariation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Output of one generation request. Never mutated by the review workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub variations: Vec<ContentVariation>,
    #[serde(default)]
    pub platform_specific: BTreeMap<PlatformKey, PlatformContent>,
}

/// The user-editable draft for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableContent {
    pub title: String,
    pub description: String,
    pub hashtags: HashtagSet,
    pub platform: PlatformKey,
}

impl EditableContent {
    pub fn from_generated(platform: PlatformKey, content: &PlatformContent) -> Self {
        Self {
            title: content.title.clone(),
            description: content.description.clone(),
            hashtags: HashtagSet::from_tokens(&content.hashtags),
            platform,
        }
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Title(title) => self.title = title,
            FieldEdit::Description(description) => self.description = description,
            FieldEdit::Hashtags(hashtags) => self.hashtags = hashtags,
        }
    }
}

/// Editable draft fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentField {
    Title,
    Description,
    Hashtags,
}

/// A single field mutation. Hashtags arrive already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Title(String),
    Description(String),
    Hashtags(HashtagSet),
}

impl FieldEdit {
    /// Build an edit from raw user input; hashtag text is normalized here.
    pub fn from_raw(field: ContentField, value: &str) -> Self {
        match field {
            ContentField::Title => Self::Title(value.to_string()),
            ContentField::Description => Self::Description(value.to_string()),
            ContentField::Hashtags => Self::Hashtags(HashtagSet::parse(value)),
        }
    }

    pub fn field(&self) -> ContentField {
        match self {
            Self::Title(_) => ContentField::Title,
            Self::Description(_) => ContentField::Description,
            Self::Hashtags(_) => ContentField::Hashtags,
        }
    }
}
