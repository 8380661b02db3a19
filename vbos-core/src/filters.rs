//! Query filters accepted by the tabular and vector data endpoints.

use serde::{Deserialize, Serialize};

/// Server-side filters for a data request.
///
/// `province` and `area_council` match names case-insensitively on the
/// server; `attribute` is a substring match; `date_after`/`date_before`
/// bound an inclusive ISO date range; `metadata` pairs must all match exactly.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct DataFilters {
    pub province: Option<String>,
    pub area_council: Option<String>,
    pub attribute: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
    pub metadata: Vec<(String, String)>,
}

impl DataFilters {
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Filters as ordered `(key, value)` query parameters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let fields = [
            ("province", &self.province),
            ("area_council", &self.area_council),
            ("attribute", &self.attribute),
            ("date_after", &self.date_after),
            ("date_before", &self.date_before),
        ];
        for (key, value) in fields {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        if !self.metadata.is_empty() {
            let joined = self
                .metadata
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("metadata", joined));
        }
        pairs
    }

    /// Filters encoded as a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        let filters = DataFilters::default();
        assert!(filters.is_empty());
        assert_eq!(filters.to_query_string(), "");
    }

    #[test]
    fn test_filters_encode() {
        let filters = DataFilters {
            province: Some("Torba".to_string()),
            date_after: Some("2020-01-01".to_string()),
            metadata: vec![
                ("sex".to_string(), "female".to_string()),
                ("age".to_string(), "5".to_string()),
            ],
            ..Default::default()
        };
        assert_eq!(
            filters.to_query_string(),
            "province=Torba&date_after=2020-01-01&metadata=sex%3Dfemale%2Cage%3D5"
        );
    }
}
