use crate::alert::Alert;
use crate::filter::Filter;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Index;

/// Ordered alerts from one fetch: countries in request order, then feed
/// entries in feed order.
///
/// Filtering builds a new collection and leaves this one untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlertCollection {
    alerts: Vec<Alert>,
}

impl AlertCollection {
    pub fn new(alerts: Vec<Alert>) -> Self {
        Self { alerts }
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Alert> {
        self.alerts.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.alerts.iter()
    }

    pub fn as_slice(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn into_vec(self) -> Vec<Alert> {
        self.alerts
    }

    /// Every language any alert has text for.
    pub fn available_languages(&self) -> BTreeSet<&str> {
        self.alerts
            .iter()
            .flat_map(Alert::available_languages)
            .collect()
    }

    /// Alerts matching every criterion, in their original relative order.
    ///
    /// ```
    /// use meteoalarm::{AlertCollection, Filter};
    ///
    /// let alerts = AlertCollection::default();
    /// let moderate = alerts.filter(&Filter::new().with("severity", "Moderate"));
    /// assert!(moderate.is_empty());
    /// ```
    pub fn filter(&self, filter: &Filter) -> AlertCollection {
        self.alerts
            .iter()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect()
    }
}

impl Index<usize> for AlertCollection {
    type Output = Alert;

    fn index(&self, index: usize) -> &Alert {
        &self.alerts[index]
    }
}

impl FromIterator<Alert> for AlertCollection {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for AlertCollection {
    type Item = Alert;
    type IntoIter = std::vec::IntoIter<Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.into_iter()
    }
}

impl<'a> IntoIterator for &'a AlertCollection {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}
