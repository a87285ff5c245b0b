mod env_overrides;
mod loader;
pub mod schema;

pub use schema::{ApiConfig, Config, LoggingConfig, PlatformEntry, ReviewConfig, ValidationMode};
