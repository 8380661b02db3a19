//! Selected province and area council.

use crate::query::{QueryParams, UrlState};
use vbos_data::{normalize_name, Granularity};

/// An area council is only ever selected inside a province.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaState {
    province: Option<String>,
    area_council: Option<String>,
}

fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

impl AreaState {
    pub fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn area_council(&self) -> Option<&str> {
        self.area_council.as_deref()
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::for_selection(self.province())
    }

    /// Selecting a different province drops the area council.
    pub fn select_province(&mut self, province: Option<&str>) {
        let province = non_blank(province);
        let same = match (&self.province, &province) {
            (Some(a), Some(b)) => normalize_name(a) == normalize_name(b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.area_council = None;
        }
        self.province = province;
    }

    /// Returns false, leaving the state unchanged, when no province is
    /// selected.
    pub fn select_area_council(&mut self, area_council: Option<&str>) -> bool {
        if self.province.is_none() {
            return false;
        }
        self.area_council = non_blank(area_council);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl UrlState for AreaState {
    const PARAMS: &'static [&'static str] = &["province", "ac"];

    fn read_query(&mut self, params: &QueryParams) {
        self.clear();
        self.select_province(params.get("province"));
        self.select_area_council(params.get("ac"));
    }

    fn write_query(&self, params: &mut QueryParams) {
        params.set_or_remove("province", self.province.clone());
        params.set_or_remove("ac", self.area_council.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_council_needs_province() {
        let mut area = AreaState::default();
        assert!(!area.select_area_council(Some("Torres")));
        assert_eq!(area.area_council(), None);
        area.select_province(Some("Torba"));
        assert!(area.select_area_council(Some("Torres")));
        assert_eq!(area.area_council(), Some("Torres"));
        assert_eq!(area.granularity(), Granularity::AreaCouncil);
    }

    #[test]
    fn test_changing_province_clears_area_council() {
        let mut area = AreaState::default();
        area.select_province(Some("Torba"));
        area.select_area_council(Some("Torres"));
        area.select_province(Some("TORBA"));
        assert_eq!(area.area_council(), Some("Torres"));
        area.select_province(Some("Sanma"));
        assert_eq!(area.area_council(), None);
        area.select_province(None);
        assert_eq!(area, AreaState::default());
        assert_eq!(area.granularity(), Granularity::Province);
    }

    #[test]
    fn test_read_query_ignores_orphan_area_council() {
        let mut area = AreaState::default();
        area.read_query(&QueryParams::parse("ac=Torres"));
        assert_eq!(area, AreaState::default());

        area.read_query(&QueryParams::parse("province=Torba&ac=Torres"));
        assert_eq!(area.province(), Some("Torba"));
        assert_eq!(area.area_council(), Some("Torres"));
    }

    #[test]
    fn test_write_query_removes_unset() {
        let mut params = QueryParams::parse("province=Sanma&ac=Luganville&year=2020");
        let mut area = AreaState::default();
        area.select_province(Some("Torba"));
        area.write_query(&mut params);
        assert_eq!(params.to_query_string(), "province=Torba&year=2020");
    }
}
