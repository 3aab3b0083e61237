use super::document::{DocumentError, Element};
use crate::alert::{Alert, Localized};
use crate::assets::GeocodeTable;
use crate::util::parse_timestamp;
use indexmap::IndexMap;

const AWARENESS_LEVEL: &str = "awareness_level";
const AWARENESS_TYPE: &str = "awareness_type";
const EMMA_ID: &str = "EMMA_ID";

/// Parses one CAP document, absorbing any failure.
///
/// Returns `None` when the document is unreadable or carries no `info` block.
/// Failures are logged with the country so one bad document never affects
/// its siblings.
pub fn parse_alert(bytes: &[u8], country: &str, geocodes: &GeocodeTable) -> Option<Alert> {
    match parse_document(bytes, country, geocodes) {
        Ok(alert) => alert,
        Err(e) => {
            tracing::warn!(country = %country, error = %e, "Error parsing warning");
            None
        }
    }
}

/// Parses one CAP document into an [`Alert`].
///
/// Single-valued fields are read from the first `info` block only; headline
/// and description are gathered from every block that declares a language.
/// Missing elements degrade to empty strings and bad timestamps to `None`.
///
/// # Errors
///
/// Returns [`DocumentError`] only when the XML itself cannot be read.
/// `Ok(None)` means well-formed XML without any `info` block.
pub fn parse_document(
    bytes: &[u8],
    country: &str,
    geocodes: &GeocodeTable,
) -> Result<Option<Alert>, DocumentError> {
    let root = Element::parse(bytes)?;

    let Some(first_info) = root.find("info") else {
        tracing::debug!(country = %country, "CAP document has no info block, skipping");
        return Ok(None);
    };

    let (headline, description) = localized_text(&root);
    let area = area_fields(first_info);
    let geometry = area
        .get(EMMA_ID)
        .and_then(|code| geocodes.resolve(code))
        .map(str::to_string);

    Ok(Some(Alert {
        identifier: text_or_default(Some(&root), "identifier"),
        category: text_or_default(Some(first_info), "category"),
        event: text_or_default(Some(first_info), "event"),
        urgency: text_or_default(Some(first_info), "urgency"),
        severity: text_or_default(Some(first_info), "severity"),
        certainty: text_or_default(Some(first_info), "certainty"),
        onset: parse_timestamp(&text_or_default(Some(first_info), "onset")),
        effective: parse_timestamp(&text_or_default(Some(first_info), "effective")),
        expires: parse_timestamp(&text_or_default(Some(first_info), "expires")),
        sender: sender_fields(&root, first_info),
        headline,
        description,
        awareness_level: parameter_value(first_info, AWARENESS_LEVEL),
        awareness_type: parameter_value(first_info, AWARENESS_TYPE),
        area,
        country: country.to_string(),
        geometry,
    }))
}

/// Text of the first `name` element below `scope`, or an empty string.
fn text_or_default(scope: Option<&Element>, name: &str) -> String {
    scope
        .and_then(|element| element.find(name))
        .map(|element| element.text().to_string())
        .unwrap_or_default()
}

/// Headline and description per language across all info blocks.
/// Blocks without a language tag, and empty texts, contribute nothing.
fn localized_text(root: &Element) -> (Localized, Localized) {
    let mut headlines = Localized::new();
    let mut descriptions = Localized::new();

    for info in root.descendants("info") {
        let lang = text_or_default(Some(info), "language");
        if lang.is_empty() {
            continue;
        }

        let headline = text_or_default(Some(info), "headline");
        if !headline.is_empty() {
            headlines.insert(lang.clone(), headline);
        }

        let description = text_or_default(Some(info), "description");
        if !description.is_empty() {
            descriptions.insert(lang, description);
        }
    }

    (headlines, descriptions)
}

fn sender_fields(root: &Element, first_info: &Element) -> IndexMap<String, String> {
    IndexMap::from([
        ("sender".to_string(), text_or_default(Some(root), "sender")),
        (
            "senderName".to_string(),
            text_or_default(Some(first_info), "senderName"),
        ),
        ("contact".to_string(), text_or_default(Some(first_info), "contact")),
        ("web".to_string(), text_or_default(Some(first_info), "web")),
    ])
}

fn area_fields(first_info: &Element) -> IndexMap<String, String> {
    let mut area = IndexMap::new();
    let Some(area_element) = first_info.find("area") else {
        return area;
    };

    area.insert(
        "areaDesc".to_string(),
        text_or_default(Some(area_element), "areaDesc"),
    );

    // Prefer the geocode explicitly named EMMA_ID; areas may also carry
    // NUTS or national codes.
    let geocode = area_element
        .descendants("geocode")
        .find(|geocode| text_or_default(Some(*geocode), "valueName") == EMMA_ID)
        .or_else(|| area_element.find("geocode"));
    if let Some(geocode) = geocode {
        area.insert(EMMA_ID.to_string(), text_or_default(Some(geocode), "value"));
    }

    area
}

/// First segment of the first `parameter` named `name`, e.g. `"2"` for
/// `awareness_level = "2; yellow; Moderate"`.
fn parameter_value(info: &Element, name: &str) -> String {
    info.descendants("parameter")
        .find_map(|parameter| {
            let key = parameter.find("valueName")?;
            let value = parameter.find("value")?;
            (key.text() == name).then(|| first_segment(value.text()))
        })
        .unwrap_or_default()
}

fn first_segment(value: &str) -> String {
    value.split(';').next().unwrap_or_default().trim().to_string()
}
