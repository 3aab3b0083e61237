use anyhow::Result;
use feed_rs::parser;

/// Media type of links that point at a full CAP alert document.
pub const CAP_MEDIA_TYPE: &str = "application/cap+xml";

/// One entry of a country's Atom feed.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub id: String,
    pub title: Option<String>,
    /// Link to the entry's CAP document, when the entry carries one.
    pub cap_url: Option<String>,
}

/// Parses an Atom (or RSS) feed into its entries, in feed order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let cap_url = entry
                .links
                .iter()
                .find(|link| {
                    link.media_type
                        .as_deref()
                        .is_some_and(|t| t.trim().eq_ignore_ascii_case(CAP_MEDIA_TYPE))
                })
                .map(|link| link.href.clone());

            FeedEntry {
                id: entry.id,
                title: entry.title.map(|t| t.content),
                cap_url,
            }
        })
        .collect();

    Ok(entries)
}
