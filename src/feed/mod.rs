//! Country feed retrieval.
//!
//! Every country publishes an Atom feed whose entries link to full CAP
//! documents. This module turns one feed URL into a list of alerts:
//!
//! - [`fetcher`] - HTTP GET with timeout, retry with backoff, and a body size cap
//! - [`parser`] - Atom parsing with `feed-rs` and CAP link selection
//! - [`aggregator`] - order-preserving concurrent download of the linked documents
//!
//! # Example
//!
//! ```ignore
//! let feed = CountryFeed { client: &http, policy: &policy, geocodes: &table, concurrency: 4 };
//! let alerts = feed.collect("estonia", "https://feeds.meteoalarm.org/...").await?;
//! ```

mod aggregator;
mod fetcher;
mod parser;

pub use aggregator::{CountryFeed, FeedError};
pub use fetcher::{fetch_bytes, FetchError, FetchPolicy};
pub use parser::{parse_feed, FeedEntry, CAP_MEDIA_TYPE};
