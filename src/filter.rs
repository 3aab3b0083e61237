//! Predicate filtering over alerts.
//!
//! A [`Filter`] is a list of named criteria that must all hold. Each field
//! name maps to a [`Field`], and each field belongs to a [`FieldKind`] that
//! decides how an expected value is compared:
//!
//! | Kind        | Fields                                   | Rule                                   |
//! |-------------|------------------------------------------|----------------------------------------|
//! | `Localized` | `headline`, `description`                | case-insensitive substring, any language |
//! | `StringMap` | `sender`, `area`                         | case-insensitive substring, any value  |
//! | `Temporal`  | `onset`, `effective`, `expires`          | exact instant equality                 |
//! | `Text`      | everything else                          | case-insensitive substring             |
//!
//! Criteria that cannot be evaluated (unknown field, unparsable timestamp,
//! a timestamp compared with a text field, a missing value) exclude the alert
//! instead of raising.

use crate::alert::Alert;
use crate::util::parse_timestamp;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a field's value is compared against an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Localized,
    StringMap,
    Temporal,
    Text,
}

/// Filterable alert attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Identifier,
    Category,
    Event,
    Urgency,
    Severity,
    Certainty,
    Onset,
    Effective,
    Expires,
    Sender,
    Headline,
    Description,
    AwarenessLevel,
    AwarenessType,
    Area,
    Country,
    Geometry,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Identifier,
        Field::Category,
        Field::Event,
        Field::Urgency,
        Field::Severity,
        Field::Certainty,
        Field::Onset,
        Field::Effective,
        Field::Expires,
        Field::Sender,
        Field::Headline,
        Field::Description,
        Field::AwarenessLevel,
        Field::AwarenessType,
        Field::Area,
        Field::Country,
        Field::Geometry,
    ];

    /// Attribute name as used in filter criteria.
    pub fn name(self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::Category => "category",
            Field::Event => "event",
            Field::Urgency => "urgency",
            Field::Severity => "severity",
            Field::Certainty => "certainty",
            Field::Onset => "onset",
            Field::Effective => "effective",
            Field::Expires => "expires",
            Field::Sender => "sender",
            Field::Headline => "headline",
            Field::Description => "description",
            Field::AwarenessLevel => "awareness_level",
            Field::AwarenessType => "awareness_type",
            Field::Area => "area",
            Field::Country => "country",
            Field::Geometry => "geometry",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Headline | Field::Description => FieldKind::Localized,
            Field::Sender | Field::Area => FieldKind::StringMap,
            Field::Onset | Field::Effective | Field::Expires => FieldKind::Temporal,
            _ => FieldKind::Text,
        }
    }

    fn text<'a>(self, alert: &'a Alert) -> Option<&'a str> {
        match self {
            Field::Identifier => Some(alert.identifier.as_str()),
            Field::Category => Some(alert.category.as_str()),
            Field::Event => Some(alert.event.as_str()),
            Field::Urgency => Some(alert.urgency.as_str()),
            Field::Severity => Some(alert.severity.as_str()),
            Field::Certainty => Some(alert.certainty.as_str()),
            Field::AwarenessLevel => Some(alert.awareness_level.as_str()),
            Field::AwarenessType => Some(alert.awareness_type.as_str()),
            Field::Country => Some(alert.country.as_str()),
            Field::Geometry => alert.geometry.as_deref(),
            _ => None,
        }
    }

    fn map<'a>(self, alert: &'a Alert) -> Option<&'a IndexMap<String, String>> {
        match self {
            Field::Sender => Some(&alert.sender),
            Field::Area => Some(&alert.area),
            Field::Headline => Some(&alert.headline),
            Field::Description => Some(&alert.description),
            _ => None,
        }
    }

    fn time(self, alert: &Alert) -> Option<DateTime<Utc>> {
        match self {
            Field::Onset => alert.onset,
            Field::Effective => alert.effective,
            Field::Expires => alert.expires,
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value a criterion compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Text(String),
    Time(DateTime<Utc>),
}

impl From<&str> for Expected {
    fn from(value: &str) -> Self {
        Expected::Text(value.to_string())
    }
}

impl From<String> for Expected {
    fn from(value: String) -> Self {
        Expected::Text(value)
    }
}

impl From<DateTime<Utc>> for Expected {
    fn from(value: DateTime<Utc>) -> Self {
        Expected::Time(value)
    }
}

/// One `field = value` constraint.
///
/// The key is kept as given so that unknown names can be carried and simply
/// never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    key: String,
    expected: Expected,
}

impl Criterion {
    pub fn new(key: impl Into<String>, expected: impl Into<Expected>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        let Some(field) = Field::from_name(&self.key) else {
            return false;
        };

        match (field.kind(), &self.expected) {
            (FieldKind::Localized | FieldKind::StringMap, Expected::Text(needle)) => field
                .map(alert)
                .is_some_and(|map| map.values().any(|value| contains_ignore_case(value, needle))),
            (FieldKind::Temporal, Expected::Text(raw)) => match parse_timestamp(raw) {
                Some(expected) => field.time(alert) == Some(expected),
                None => false,
            },
            (FieldKind::Temporal, Expected::Time(expected)) => field.time(alert) == Some(*expected),
            (FieldKind::Text, Expected::Text(needle)) => field
                .text(alert)
                .is_some_and(|value| contains_ignore_case(value, needle)),
            // A timestamp never equals a string or a map
            (_, Expected::Time(_)) => false,
        }
    }
}

/// Error parsing a `KEY=VALUE` criterion.
#[derive(Debug, Error, PartialEq)]
pub enum CriterionParseError {
    #[error("expected KEY=VALUE, got {0:?}")]
    MissingSeparator(String),
    #[error("unknown filter field {0:?}")]
    UnknownField(String),
}

/// Parses `KEY=VALUE`, as given on the command line.
///
/// Unlike [`Criterion::new`], this rejects unknown field names: a typo on the
/// command line is reported instead of silently filtering out everything.
impl FromStr for Criterion {
    type Err = CriterionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| CriterionParseError::MissingSeparator(s.to_string()))?;
        let key = key.trim();
        if Field::from_name(key).is_none() {
            return Err(CriterionParseError::UnknownField(key.to_string()));
        }
        Ok(Criterion::new(key, value.trim()))
    }
}

/// Conjunction of criteria. An empty filter matches every alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    criteria: Vec<Criterion>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, builder style.
    ///
    /// ```
    /// use meteoalarm::Filter;
    ///
    /// let filter = Filter::new()
    ///     .with("severity", "Moderate")
    ///     .with("urgency", "Immediate");
    /// assert_eq!(filter.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, expected: impl Into<Expected>) -> Self {
        self.criteria.push(Criterion::new(key, expected));
        self
    }

    pub fn push(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(alert))
    }
}

impl FromIterator<Criterion> for Filter {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        Self {
            criteria: iter.into_iter().collect(),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
