use super::{Config, ValidationMode};

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`; empty or unparsable values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = var("COPYDESK_API_URL") {
            self.api.base_url = url;
        }

        if let Some(token) = var("COPYDESK_API_TOKEN") {
            self.api.token = Some(token);
        }

        if let Some(ms) = var("COPYDESK_DEBOUNCE_MS")
            && let Ok(ms) = ms.parse::<u64>()
            && ms > 0
        {
            self.review.validation_debounce_ms = ms;
        }

        if let Some(mode) = var("COPYDESK_VALIDATION_MODE")
            && let Ok(mode) = mode.parse::<ValidationMode>()
        {
            self.review.validation_mode = mode;
        }

        if let Some(level) = var("COPYDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn overrides_api_and_review_settings() {
        let config = apply(&[
            ("COPYDESK_API_URL", "https://api.shop.test"),
            ("COPYDESK_API_TOKEN", "tok"),
            ("COPYDESK_DEBOUNCE_MS", "150"),
            ("COPYDESK_VALIDATION_MODE", "LOCAL"),
            ("COPYDESK_LOG_LEVEL", "debug"),
        ]);
        assert_eq!(config.api.base_url, "https://api.shop.test");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        assert_eq!(config.review.validation_debounce_ms, 150);
        assert_eq!(config.review.validation_mode, ValidationMode::Local);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn ignores_empty_and_invalid_values() {
        let config = apply(&[
            ("COPYDESK_API_URL", "  "),
            ("COPYDESK_DEBOUNCE_MS", "0"),
            ("COPYDESK_VALIDATION_MODE", "psychic"),
        ]);
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.review.validation_debounce_ms, 500);
        assert_eq!(config.review.validation_mode, ValidationMode::Remote);
    }
}
