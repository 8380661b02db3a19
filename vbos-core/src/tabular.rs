use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute name used when a row carries no `attribute` of its own.
pub const DEFAULT_ATTRIBUTE: &str = "value";

/// One row of a tabular dataset.
///
/// On the wire a row is `{id, attribute, date, value, province, area_council}`
/// with any per-row metadata flattened into the same object.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct TabularRow {
    #[serde(default)]
    pub id: Option<u64>,
    /// ISO date, year first (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub area_council: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl TabularRow {
    /// Convenience constructor for a row keyed by province.
    pub fn new(date: &str, province: &str, attribute: &str, value: f64) -> Self {
        Self {
            date: Some(date.to_string()),
            province: Some(province.to_string()),
            attribute: Some(attribute.to_string()),
            value,
            ..Default::default()
        }
    }

    pub fn with_area_council(mut self, area_council: &str) -> Self {
        self.area_council = Some(area_council.to_string());
        self
    }

    pub fn attribute_name(&self) -> &str {
        self.attribute
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_ATTRIBUTE)
    }

    /// The row as an attribute -> value pair.
    pub fn entry(&self) -> (&str, f64) {
        (self.attribute_name(), self.value)
    }

    pub fn date_str(&self) -> Option<&str> {
        self.date.as_deref()
    }
}
