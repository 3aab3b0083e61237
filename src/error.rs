use crate::assets::AssetError;
use thiserror::Error;

/// Errors surfaced to callers of [`crate::MeteoAlarm`].
///
/// Network and parsing failures of individual feeds or documents never appear
/// here; they are logged and the affected country or alert is skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No countries provided")]
    NoCountries,

    #[error("Country at position {0} is blank")]
    BlankCountry(usize),

    #[error("No URL configuration found for country: {0}")]
    UnknownCountry(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl Error {
    /// The caller passed an unusable country list.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Error::NoCountries | Error::BlankCountry(_))
    }

    /// A lookup table is missing an entry or could not be loaded.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::UnknownCountry(_) | Error::Asset(_))
    }
}
