use super::{read_asset, AssetError, BUNDLED_GEOCODES};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Feature type tag that marks an EMMA_ID area.
const EMMA_ID: &str = "EMMA_ID";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    #[serde(default)]
    geometry: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(rename = "type")]
    kind: String,
    code: Option<String>,
}

/// EMMA_ID area code to geometry, serialized as compact GeoJSON.
///
/// Only features tagged `EMMA_ID` are indexed; NUTS and other geocode
/// families in the same collection are skipped.
#[derive(Debug, Clone, Default)]
pub struct GeocodeTable {
    geometries: HashMap<String, String>,
}

impl GeocodeTable {
    /// Loads the table embedded in the crate.
    pub fn bundled() -> Result<Self, AssetError> {
        Self::from_json_str(BUNDLED_GEOCODES)
    }

    /// Loads a table from a GeoJSON feature collection on disk.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let content = read_asset(path)?;
        let table = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            areas = table.len(),
            "Loaded geocode table"
        );
        Ok(table)
    }

    /// Builds the table from a feature collection document.
    ///
    /// # Errors
    ///
    /// - [`AssetError::Json`] if the document is not a feature collection
    /// - [`AssetError::MissingCode`] if an EMMA_ID feature has no `code`
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        let collection: FeatureCollection = serde_json::from_str(json)?;

        let mut geometries = HashMap::new();
        for (index, feature) in collection.features.into_iter().enumerate() {
            if feature.properties.kind != EMMA_ID {
                continue;
            }
            let code = feature
                .properties
                .code
                .ok_or(AssetError::MissingCode(index))?;
            geometries.insert(code, serde_json::to_string(&feature.geometry)?);
        }

        Ok(Self { geometries })
    }

    /// Returns the serialized geometry for an EMMA_ID code.
    pub fn resolve(&self, area_code: &str) -> Option<&str> {
        self.geometries.get(area_code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
