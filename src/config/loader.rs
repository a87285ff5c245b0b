use super::Config;
use crate::content::{Platform, PlatformKey};
use crate::error::ConfigError;
use crate::review::builtin_platforms;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let copydesk_dir = home.join(".copydesk");

        if !copydesk_dir.exists() {
            fs::create_dir_all(&copydesk_dir).context("Failed to create .copydesk directory")?;
        }

        let mut config = Self::load_from(&copydesk_dir.join("config.toml"))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, or write a default config there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path = path.to_path_buf();
            Ok(config)
        } else {
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("api.base_url must not be empty".into()));
        }
        if self.review.validation_debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "review.validation_debounce_ms must be greater than zero".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.platforms {
            if !seen.insert(&entry.key) {
                return Err(ConfigError::Validation(format!(
                    "duplicate platform key in [[platforms]]: {}",
                    entry.key
                )));
            }
        }
        Ok(())
    }

    pub fn validation_quiet_period(&self) -> Duration {
        Duration::from_millis(self.review.validation_debounce_ms)
    }

    /// Platform table for offline use: `[[platforms]]` or the built-in set.
    pub fn offline_platforms(&self) -> BTreeMap<PlatformKey, Platform> {
        if self.platforms.is_empty() {
            return builtin_platforms();
        }
        self.platforms
            .iter()
            .map(|entry| (entry.key.clone(), entry.platform.clone()))
            .collect()
    }
}
