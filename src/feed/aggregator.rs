use super::fetcher::{fetch_bytes, FetchError, FetchPolicy};
use super::parser::{parse_feed, FeedEntry};
use crate::alert::Alert;
use crate::assets::GeocodeTable;
use crate::cap::parse_alert;
use futures::stream::{self, StreamExt};
use thiserror::Error;

/// Failure of a whole country feed. Per-document failures never surface here.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

/// Shared inputs for collecting one country's alerts.
pub struct CountryFeed<'a> {
    pub client: &'a reqwest::Client,
    pub policy: &'a FetchPolicy,
    pub geocodes: &'a GeocodeTable,
    /// CAP documents in flight at once.
    pub concurrency: usize,
}

impl CountryFeed<'_> {
    /// Fetches the Atom feed at `feed_url` and every CAP document it links to.
    ///
    /// Alerts come back in feed order. Entries without a CAP link, documents
    /// that fail to download, and documents that fail to parse are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the feed itself cannot be fetched or parsed.
    pub async fn collect(&self, country: &str, feed_url: &str) -> Result<Vec<Alert>, FeedError> {
        let bytes = fetch_bytes(self.client, feed_url, self.policy).await?;
        let entries = parse_feed(&bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

        tracing::debug!(
            country = %country,
            entries = entries.len(),
            "Parsed country feed"
        );

        let alerts: Vec<Option<Alert>> = stream::iter(entries)
            .map(|entry| self.collect_entry(country, entry))
            .buffered(self.concurrency.max(1))
            .collect()
            .await;

        Ok(alerts.into_iter().flatten().collect())
    }

    async fn collect_entry(&self, country: &str, entry: FeedEntry) -> Option<Alert> {
        let Some(cap_url) = entry.cap_url else {
            tracing::debug!(
                country = %country,
                entry = %entry.id,
                title = entry.title.as_deref().unwrap_or(""),
                "Entry has no CAP link, skipping"
            );
            return None;
        };

        match fetch_bytes(self.client, &cap_url, self.policy).await {
            Ok(bytes) => parse_alert(&bytes, country, self.geocodes),
            Err(e) => {
                tracing::warn!(
                    country = %country,
                    url = %cap_url,
                    error = %e,
                    "Error fetching warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy() -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(1),
            max_response_bytes: 1024 * 1024,
        }
    }

    fn cap_document(identifier: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">
  <identifier>{identifier}</identifier>
  <sender>sender@example.org</sender>
  <info>
    <language>en-GB</language>
    <event>Wind</event>
    <severity>Moderate</severity>
    <headline>Headline {identifier}</headline>
  </info>
</alert>"#
        )
    }

    fn atom_feed(links: &[String]) -> String {
        let entries: String = links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                format!(
                    r#"<entry><id>urn:{i}</id><title>Entry {i}</title>
<updated>2025-02-04T10:45:01+00:00</updated>
<link href="{link}" type="application/cap+xml"/></entry>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><id>feed</id><title>Feed</title>
<updated>2025-02-04T10:45:01+00:00</updated>{entries}</feed>"#
        )
    }

    #[tokio::test]
    async fn test_collect_preserves_feed_order_and_skips_failures() {
        let server = MockServer::start().await;
        let links: Vec<String> = ["one", "broken", "missing", "two"]
            .iter()
            .map(|name| format!("{}/cap/{name}", server.uri()))
            .collect();

        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&links)))
            .mount(&server)
            .await;
        Mock::given(path("/cap/one"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cap_document("one")))
            .mount(&server)
            .await;
        Mock::given(path("/cap/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<alert><info>"))
            .mount(&server)
            .await;
        Mock::given(path("/cap/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/cap/two"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(cap_document("two"))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let policy = fast_policy();
        let geocodes = GeocodeTable::default();
        let feed = CountryFeed {
            client: &client,
            policy: &policy,
            geocodes: &geocodes,
            concurrency: 4,
        };

        let alerts = feed
            .collect("estonia", &format!("{}/feed", server.uri()))
            .await
            .unwrap();
        let ids: Vec<&str> = alerts.iter().map(|a| a.identifier.as_str()).collect();
        assert_eq!(ids, ["one", "two"]);
        assert!(alerts.iter().all(|a| a.country == "estonia"));
    }

    #[tokio::test]
    async fn test_collect_feed_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(path("/feed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let policy = fast_policy();
        let geocodes = GeocodeTable::default();
        let feed = CountryFeed {
            client: &client,
            policy: &policy,
            geocodes: &geocodes,
            concurrency: 1,
        };

        let err = feed
            .collect("estonia", &format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Fetch(FetchError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_collect_unparseable_feed_is_error() {
        let server = MockServer::start().await;
        Mock::given(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a feed"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let policy = fast_policy();
        let geocodes = GeocodeTable::default();
        let feed = CountryFeed {
            client: &client,
            policy: &policy,
            geocodes: &geocodes,
            concurrency: 2,
        };

        let err = feed
            .collect("estonia", &format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }
}
