use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

/// Language tag preferred when rendering an alert.
pub const DEFAULT_LANGUAGE: &str = "en-EN";

/// Language tag to localized text, in the order the languages appear in the
/// source document.
pub type Localized = IndexMap<String, String>;

/// One weather warning, normalized from a multi-language CAP document.
///
/// Single-valued fields come from the first `info` block of the document.
/// `headline` and `description` collect every language the document carries.
/// Timestamps that were missing or unparsable are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub identifier: String,
    pub category: String,
    pub event: String,
    pub urgency: String,
    pub severity: String,
    pub certainty: String,
    pub onset: Option<DateTime<Utc>>,
    pub effective: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    /// Keys: `sender`, `senderName`, `contact`, `web`.
    pub sender: IndexMap<String, String>,
    pub headline: Localized,
    pub description: Localized,
    pub awareness_level: String,
    pub awareness_type: String,
    /// Keys: `areaDesc` and, when the area carries a geocode, `EMMA_ID`.
    /// Empty when the document has no area block.
    pub area: IndexMap<String, String>,
    /// Lowercased registry key of the feed that produced this alert.
    pub country: String,
    /// Compact GeoJSON geometry for the area's EMMA_ID, if known.
    pub geometry: Option<String>,
}

impl Alert {
    /// Languages this alert has text for, in document order.
    pub fn available_languages(&self) -> Vec<&str> {
        let languages: IndexSet<&str> = self
            .headline
            .keys()
            .chain(self.description.keys())
            .map(String::as_str)
            .collect();
        languages.into_iter().collect()
    }

    pub fn headline(&self, lang: &str) -> Option<&str> {
        self.headline.get(lang).map(String::as_str)
    }

    pub fn description(&self, lang: &str) -> Option<&str> {
        self.description.get(lang).map(String::as_str)
    }

    /// Headline in `lang`, falling back to the first language available.
    pub fn headline_or_first(&self, lang: &str) -> Option<&str> {
        self.headline(lang)
            .or_else(|| self.headline.values().next().map(String::as_str))
    }

    /// The area's EMMA_ID code, when the document carried one.
    pub fn emma_id(&self) -> Option<&str> {
        self.area.get("EMMA_ID").map(String::as_str)
    }

    /// Human-readable summary with the headline in `lang` when present.
    pub fn summary(&self, lang: &str) -> String {
        let expires = self
            .expires
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%:z").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "Weather Warning for {} ({})\nHeadline: {}\nSeverity: {}\nValid until: {}",
            self.area.get("areaDesc").map(String::as_str).unwrap_or(""),
            self.country,
            self.headline_or_first(lang).unwrap_or(""),
            self.severity,
            expires
        )
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary(DEFAULT_LANGUAGE))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    /// Two-language Estonian alert used across module tests.
    pub(crate) fn sample_alert() -> Alert {
        Alert {
            identifier: "2.49.0.0.233.0.EE2025020412450132".to_string(),
            category: "Met".to_string(),
            event: "Strong Wind".to_string(),
            urgency: "Immediate".to_string(),
            severity: "Moderate".to_string(),
            certainty: "Likely".to_string(),
            onset: Some(Utc.with_ymd_and_hms(2025, 2, 4, 10, 45, 1).unwrap()),
            effective: Some(Utc.with_ymd_and_hms(2025, 2, 4, 10, 46, 1).unwrap()),
            expires: Some(Utc.with_ymd_and_hms(2025, 2, 5, 10, 36, 6).unwrap()),
            sender: IndexMap::from([
                ("sender".to_string(), "test@example.com".to_string()),
                ("senderName".to_string(), "Test Agency".to_string()),
                ("contact".to_string(), "Test Contact".to_string()),
                ("web".to_string(), "http://example.com".to_string()),
            ]),
            headline: IndexMap::from([
                ("en-EN".to_string(), "Strong Wind Warning".to_string()),
                ("et-ET".to_string(), "Tugeva tuule hoiatus".to_string()),
            ]),
            description: IndexMap::from([
                ("en-EN".to_string(), "Test description in English".to_string()),
                ("et-ET".to_string(), "Test kirjeldus eesti keeles".to_string()),
            ]),
            awareness_level: "2".to_string(),
            awareness_type: "1".to_string(),
            area: IndexMap::from([
                ("areaDesc".to_string(), "Valga maakond".to_string()),
                ("EMMA_ID".to_string(), "EE013".to_string()),
            ]),
            country: "estonia".to_string(),
            geometry: None,
        }
    }

    #[test]
    fn test_available_languages_in_document_order() {
        let alert = sample_alert();
        assert_eq!(alert.available_languages(), vec!["en-EN", "et-ET"]);
    }

    #[test]
    fn test_available_languages_is_union() {
        let mut alert = sample_alert();
        alert.headline.shift_remove("et-ET");
        alert
            .description
            .insert("lv-LV".to_string(), "Apraksts".to_string());
        assert_eq!(alert.available_languages(), vec!["en-EN", "et-ET", "lv-LV"]);
    }

    #[test]
    fn test_localized_lookup() {
        let alert = sample_alert();
        assert_eq!(alert.headline("et-ET"), Some("Tugeva tuule hoiatus"));
        assert_eq!(alert.description("en-EN"), Some("Test description in English"));
        assert_eq!(alert.headline("fr-FR"), None);
    }

    #[test]
    fn test_display_uses_english() {
        let alert = sample_alert();
        assert_eq!(
            alert.to_string(),
            "Weather Warning for Valga maakond (estonia)\n\
             Headline: Strong Wind Warning\n\
             Severity: Moderate\n\
             Valid until: 2025-02-05 10:36:06+00:00"
        );
    }

    #[test]
    fn test_display_falls_back_to_first_language() {
        let mut alert = sample_alert();
        alert.headline.shift_remove("en-EN");
        assert!(alert.to_string().contains("Headline: Tugeva tuule hoiatus"));
    }

    #[test]
    fn test_summary_in_requested_language() {
        let alert = sample_alert();
        assert!(alert
            .summary("et-ET")
            .contains("Headline: Tugeva tuule hoiatus"));
    }

    #[test]
    fn test_display_tolerates_missing_data() {
        let mut alert = sample_alert();
        alert.headline.clear();
        alert.area.clear();
        alert.expires = None;

        let text = alert.to_string();
        assert!(text.starts_with("Weather Warning for  (estonia)"));
        assert!(text.contains("Headline: \n"));
        assert!(text.ends_with("Valid until: unknown"));
    }

    #[test]
    fn test_emma_id() {
        let mut alert = sample_alert();
        assert_eq!(alert.emma_id(), Some("EE013"));
        alert.area.shift_remove("EMMA_ID");
        assert_eq!(alert.emma_id(), None);
    }
}
