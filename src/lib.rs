//! MeteoAlarm weather warnings for European countries.
//!
//! Each country publishes an Atom feed whose entries link to CAP (Common
//! Alerting Protocol) documents. [`MeteoAlarm::fetch`] downloads those feeds,
//! parses every linked document into a multi-language [`Alert`] and returns
//! them as an [`AlertCollection`] that can be narrowed with a [`Filter`].

pub mod alert;
pub mod assets;
pub mod cap;
mod client;
pub mod collection;
pub mod config;
mod error;
pub mod feed;
pub mod filter;
pub mod util;

pub use alert::{Alert, Localized, DEFAULT_LANGUAGE};
pub use assets::{AssetError, GeocodeTable, UrlRegistry};
pub use client::MeteoAlarm;
pub use collection::AlertCollection;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use filter::{Criterion, CriterionParseError, Expected, Field, FieldKind, Filter};
