//! Read-only table of publishing platforms and their constraints.

use crate::api::traits::PlatformSource;
use crate::content::{Platform, PlatformKey, PlatformLimits};
use crate::error::CatalogError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Platform table loaded once per review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCatalog {
    platforms: BTreeMap<PlatformKey, Platform>,
}

impl PlatformCatalog {
    /// Fetch the table from `source`. Failures are surfaced so the caller can
    /// retry; no review state may be built without a catalog.
    pub async fn load(source: &dyn PlatformSource) -> Result<Self, CatalogError> {
        let platforms = source
            .fetch_platforms()
            .await
            .map_err(CatalogError::Unavailable)?;
        let catalog = Self::from_platforms(platforms)?;
        tracing::info!(platforms = catalog.len(), "platform catalog loaded");
        Ok(catalog)
    }

    pub fn from_platforms(platforms: BTreeMap<PlatformKey, Platform>) -> Result<Self, CatalogError> {
        if platforms.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { platforms })
    }

    pub fn get(&self, key: &PlatformKey) -> Option<&Platform> {
        self.platforms.get(key)
    }

    pub fn limits(&self, key: &PlatformKey) -> Result<PlatformLimits, CatalogError> {
        self.get(key)
            .map(|platform| platform.limits)
            .ok_or_else(|| CatalogError::UnknownPlatform(key.clone()))
    }

    pub fn contains(&self, key: &PlatformKey) -> bool {
        self.platforms.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlatformKey, &Platform)> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Fixed platform table, used offline and in tests.
#[derive(Debug, Clone)]
pub struct StaticPlatformSource {
    platforms: BTreeMap<PlatformKey, Platform>,
}

impl StaticPlatformSource {
    pub fn new(platforms: BTreeMap<PlatformKey, Platform>) -> Self {
        Self { platforms }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_platforms())
    }
}

#[async_trait]
impl PlatformSource for StaticPlatformSource {
    async fn fetch_platforms(
        &self,
    ) -> Result<BTreeMap<PlatformKey, Platform>, crate::error::ApiError> {
        Ok(self.platforms.clone())
    }
}

fn platform(
    name: &str,
    kind: &str,
    title_max_length: usize,
    description_max_length: usize,
    hashtag_limit: usize,
    features: &[&str],
) -> Platform {
    Platform {
        name: name.to_string(),
        kind: kind.to_string(),
        limits: PlatformLimits {
            title_max_length,
            description_max_length,
            hashtag_limit,
        },
        features: features.iter().map(|f| (*f).to_string()).collect(),
    }
}

/// Common channels with their published content limits.
pub fn builtin_platforms() -> BTreeMap<PlatformKey, Platform> {
    [
        ("amazon", platform("Amazon", "marketplace", 200, 2000, 0, &["bullet_points"])),
        ("etsy", platform("Etsy", "marketplace", 140, 5000, 13, &["tags"])),
        ("facebook", platform("Facebook", "social", 255, 63_206, 10, &["images", "links"])),
        ("instagram", platform("Instagram", "social", 100, 2200, 30, &["images", "stories", "reels"])),
        ("linkedin", platform("LinkedIn", "professional", 150, 3000, 5, &["images", "articles"])),
        ("shopify", platform("Shopify", "ecommerce", 255, 5000, 0, &["seo"])),
        ("tiktok", platform("TikTok", "video", 100, 2200, 10, &["video"])),
        ("twitter", platform("Twitter", "social", 100, 280, 3, &["images", "threads"])),
    ]
    .into_iter()
    .map(|(key, platform)| (PlatformKey::from(key), platform))
    .collect()
}
