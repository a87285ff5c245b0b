pub mod hashtags;
pub mod types;

pub use hashtags::HashtagSet;
pub use types::{
    ContentField, ContentVariation, EditableContent, FieldEdit, GeneratedContent, Platform,
    PlatformContent, PlatformKey, PlatformLimits,
};
