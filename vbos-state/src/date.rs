//! Selected year and optional month.

use crate::query::{QueryParams, UrlState};
use vbos_utils::dates::{current_year, parse_month, parse_year};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateState {
    year: i32,
    month: Option<u32>,
}

impl Default for DateState {
    fn default() -> Self {
        Self {
            year: current_year(),
            month: None,
        }
    }
}

impl DateState {
    pub fn new(year: i32, month: Option<u32>) -> Self {
        Self {
            year,
            month: month.filter(|m| (1..=12).contains(m)),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// The `YYYY` prefix rows are filtered on.
    pub fn year_key(&self) -> String {
        format!("{:04}", self.year)
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Out-of-range months are ignored.
    pub fn set_month(&mut self, month: Option<u32>) {
        match month {
            Some(m) if !(1..=12).contains(&m) => {}
            _ => self.month = month,
        }
    }
}

impl UrlState for DateState {
    const PARAMS: &'static [&'static str] = &["year", "month"];

    fn read_query(&mut self, params: &QueryParams) {
        *self = match params.get("year").and_then(parse_year) {
            Some(year) => Self::new(year, params.get("month").and_then(parse_month)),
            None => Self::default(),
        };
    }

    fn write_query(&self, params: &mut QueryParams) {
        params.set("year", self.year_key());
        params.set_or_remove("month", self.month.map(|m| m.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_current_year() {
        let date = DateState::default();
        assert_eq!(date.year(), current_year());
        assert_eq!(date.month(), None);
    }

    #[test]
    fn test_read_query() {
        let mut date = DateState::default();
        date.read_query(&QueryParams::parse("year=2020&month=3"));
        assert_eq!(date, DateState::new(2020, Some(3)));

        date.read_query(&QueryParams::parse("year=2020&month=13"));
        assert_eq!(date, DateState::new(2020, None));

        date.read_query(&QueryParams::parse("year=20x0&month=3"));
        assert_eq!(date, DateState::default());

        date.read_query(&QueryParams::parse("month=3"));
        assert_eq!(date.month(), None);
    }

    #[test]
    fn test_set_month_validates() {
        let mut date = DateState::new(2021, None);
        date.set_month(Some(0));
        assert_eq!(date.month(), None);
        date.set_month(Some(12));
        assert_eq!(date.month(), Some(12));
        date.set_month(None);
        assert_eq!(date.month(), None);
    }

    #[test]
    fn test_write_query() {
        let mut params = QueryParams::parse("month=4");
        DateState::new(2019, None).write_query(&mut params);
        assert_eq!(params.to_query_string(), "year=2019");
        DateState::new(2019, Some(7)).write_query(&mut params);
        assert_eq!(params.to_query_string(), "year=2019&month=7");
    }
}
