//! Static lookup tables bundled with the crate.
//!
//! Both tables are loaded once when a [`crate::MeteoAlarm`] client is built and
//! are read-only afterwards:
//!
//! - [`UrlRegistry`] - country identifier to Atom feed endpoint
//! - [`GeocodeTable`] - EMMA_ID area code to serialized geometry
//!
//! The bundled copies are embedded at compile time. Either can be replaced by a
//! file on disk through the `urls_file` / `geocodes_file` configuration keys.
//! A table that cannot be loaded is a hard error: nothing is fetched with a
//! half-configured client.

mod geocodes;
mod urls;

use std::path::PathBuf;
use thiserror::Error;

pub use geocodes::GeocodeTable;
pub use urls::UrlRegistry;

/// Bundled country to feed URL mapping.
pub(crate) const BUNDLED_URLS: &str = include_str!("../../assets/MeteoAlarm_urls.yaml");

/// Bundled EMMA_ID feature collection. Ships empty; the MeteoAlarm geocode
/// export is supplied through `geocodes_file`.
pub(crate) const BUNDLED_GEOCODES: &str = include_str!("../../assets/geocodes.json");

/// Errors raised while loading a lookup table.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset file could not be read.
    #[error("Failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The country URL mapping is not a valid YAML string map.
    #[error("Error loading country URLs configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A country maps to something that is not an absolute URL.
    #[error("Invalid feed URL for country {country}: {source}")]
    InvalidUrl {
        country: String,
        #[source]
        source: url::ParseError,
    },

    /// The geocode feature collection is not valid JSON of the expected shape.
    #[error("Error loading geocodes: {0}")]
    Json(#[from] serde_json::Error),

    /// An EMMA_ID feature carries no code to index it by.
    #[error("Error loading geocodes: EMMA_ID feature #{0} has no code")]
    MissingCode(usize),
}

/// Reads an asset override from disk.
pub(crate) fn read_asset(path: &std::path::Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}
