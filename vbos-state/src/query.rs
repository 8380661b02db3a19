//! Query-string codec shared by every view-state store.

use url::form_urlencoded;

/// Ordered query parameters. Setting a key replaces its first occurrence in
/// place and drops any repeats, so parameters a store does not own keep
/// their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without its leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value for `key`, ignoring blank values.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// `set` when there is a value, `remove` otherwise.
    pub fn set_or_remove(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => self.set(key, v),
            None => self.remove(key),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded query without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Encoded query with a leading `?`, or empty when there are no params.
    pub fn to_search(&self) -> String {
        if self.pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", self.to_query_string())
        }
    }
}

/// A store's slice of the URL.
pub trait UrlState {
    /// Parameter names this state reads and writes.
    const PARAMS: &'static [&'static str];

    /// Bring the state in line with `params`. Missing or malformed values
    /// fall back without raising an error.
    fn read_query(&mut self, params: &QueryParams);

    /// Write this state's parameters, leaving every other parameter alone.
    fn write_query(&self, params: &mut QueryParams);
}

/// Shortest text that parses back to exactly `value`.
pub fn format_float(value: f64) -> String {
    value.to_string()
}

/// A finite float, or `None`.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1`/`true`/`yes`, case-insensitively.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| {
        let v = v.to_ascii_lowercase();
        v == "1" || v == "true" || v == "yes"
    })
}
