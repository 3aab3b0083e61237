//! CAP (Common Alerting Protocol) document parsing.
//!
//! A CAP document carries one alert as a sequence of `info` blocks, one per
//! language. Parsing happens in two layers:
//!
//! - [`document`] - a small namespace-aware element tree built with `quick-xml`
//! - [`parser`] - tolerant extraction of an [`Alert`](crate::Alert) from that tree
//!
//! Only a document that is not XML at all fails; missing elements and bad
//! field values degrade to empty strings or `None`.

pub mod document;
mod parser;

pub use document::{DocumentError, Element, CAP_NAMESPACE_PREFIX};
pub use parser::{parse_alert, parse_document};
