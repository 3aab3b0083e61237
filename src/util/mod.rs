//! Utility functions shared across the crate.
//!
//! - **Timestamps**: tolerant ISO-8601 parsing normalized to UTC, used both
//!   when reading CAP documents and when interpreting filter criteria
//!
//! # Examples
//!
//! ```
//! use meteoalarm::util::parse_timestamp;
//!
//! let expires = parse_timestamp("2025-02-05T10:36:06+00:00");
//! assert!(expires.is_some());
//! ```

mod time;

pub use time::parse_timestamp;
