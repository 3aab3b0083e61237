use super::{read_asset, AssetError, BUNDLED_URLS};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Country identifier to Atom feed endpoint.
///
/// Keys are stored lowercased and lookups lowercase their input, so
/// `"estonia"`, `"Estonia"` and `"ESTONIA"` all resolve to the same feed.
#[derive(Debug, Clone)]
pub struct UrlRegistry {
    endpoints: BTreeMap<String, Url>,
}

impl UrlRegistry {
    /// Loads the registry embedded in the crate.
    pub fn bundled() -> Result<Self, AssetError> {
        Self::from_yaml_str(BUNDLED_URLS)
    }

    /// Loads a registry from a YAML file of `country: url` pairs.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let content = read_asset(path)?;
        let registry = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            countries = registry.len(),
            "Loaded country URL registry"
        );
        Ok(registry)
    }

    /// Parses a YAML mapping of `country: url` pairs.
    ///
    /// # Errors
    ///
    /// - [`AssetError::Yaml`] if the document is not a string-to-string map
    /// - [`AssetError::InvalidUrl`] if any value is not an absolute URL
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AssetError> {
        let raw: BTreeMap<String, String> = serde_yaml::from_str(yaml)?;

        let mut endpoints = BTreeMap::new();
        for (country, url) in raw {
            let country = country.trim().to_lowercase();
            let parsed = Url::parse(url.trim()).map_err(|source| AssetError::InvalidUrl {
                country: country.clone(),
                source,
            })?;
            endpoints.insert(country, parsed);
        }

        Ok(Self { endpoints })
    }

    /// Returns the feed endpoint for a country, ignoring case.
    pub fn resolve(&self, country: &str) -> Option<&Url> {
        self.endpoints.get(&country.trim().to_lowercase())
    }

    /// Known country identifiers in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
