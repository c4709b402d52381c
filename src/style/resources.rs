use crate::core::config::StyleConfig;
use crate::core::settings::StyleMode;
use crate::prelude::HashMap;
use std::path::{Path, PathBuf};

/// Maps a logical style name to a URL the surface can load
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Looks up `<root>/<name>.json` on disk and yields a `file://` URL
#[derive(Debug, Clone)]
pub struct BundleResolver {
    root: PathBuf,
}

impl BundleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for BundleResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        let path = self.root.join(format!("{}.json", name));
        if !path.is_file() {
            return None;
        }
        let path = path.canonicalize().unwrap_or(path);
        Some(format!("file://{}", path.display()))
    }
}

/// Fixed name-to-URL table
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.entries.insert(name.into(), url.into());
        self
    }
}

impl ResourceResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}

/// Style documents resolved once at construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleResources {
    pub vector: Option<String>,
    pub raster: Option<String>,
    pub offline: Option<String>,
    pub daylight: Option<String>,
}

impl StyleResources {
    pub fn resolve(config: &StyleConfig, resolver: &dyn ResourceResolver) -> Self {
        let resources = Self {
            vector: resolver.resolve(&config.vector_style),
            raster: resolver.resolve(&config.raster_style),
            offline: resolver.resolve(&config.offline_style),
            daylight: resolver.resolve(&config.daylight_style),
        };
        log::debug!(
            "style resources: vector={} raster={} offline={} daylight={}",
            resources.vector.is_some(),
            resources.raster.is_some(),
            resources.offline.is_some(),
            resources.daylight.is_some()
        );
        resources
    }

    /// Online document for `mode`. Underwater prefers the vector style over
    /// the legacy raster one; daylight has a single variant.
    pub fn primary(&self, mode: StyleMode) -> Option<&str> {
        match mode {
            StyleMode::Underwater => self.vector.as_deref().or(self.raster.as_deref()),
            StyleMode::Daylight => self.daylight.as_deref(),
        }
    }

    pub fn offline(&self) -> Option<&str> {
        self.offline.as_deref()
    }

    /// No document at all: initialisation cannot succeed
    pub fn is_empty(&self) -> bool {
        self.vector.is_none()
            && self.raster.is_none()
            && self.offline.is_none()
            && self.daylight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_priority() {
        let config = StyleConfig::default();
        let resolver = StaticResolver::new()
            .with("underwater-vector", "https://tiles/vector.json")
            .with("underwater-raster", "https://tiles/raster.json");
        let resources = StyleResources::resolve(&config, &resolver);
        assert_eq!(
            resources.primary(StyleMode::Underwater),
            Some("https://tiles/vector.json")
        );
        assert_eq!(resources.primary(StyleMode::Daylight), None);

        let raster_only = StyleResources::resolve(
            &config,
            &StaticResolver::new().with("underwater-raster", "https://tiles/raster.json"),
        );
        assert_eq!(
            raster_only.primary(StyleMode::Underwater),
            Some("https://tiles/raster.json")
        );
    }

    #[test]
    fn test_bundle_resolver() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("underwater-offline.json"), "{}").unwrap();

        let resolver = BundleResolver::new(dir.path());
        let url = resolver.resolve("underwater-offline").unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("underwater-offline.json"));
        assert!(resolver.resolve("underwater-vector").is_none());
    }

    #[test]
    fn test_empty_resources() {
        let resources = StyleResources::resolve(&StyleConfig::default(), &StaticResolver::new());
        assert!(resources.is_empty());
        assert!(resources.offline().is_none());
    }
}
