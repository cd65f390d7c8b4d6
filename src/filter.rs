//! Multi-select filter state and search-query serialization.
//!
//! One `FilterSelection` value object per view replaces the ambient
//! globals the original pages shared; panel visibility lives elsewhere
//! (see [`crate::session`]) so closing a panel never clears what was
//! picked in it.

use crate::timeslot::{DAY_SYMBOLS, PERIOD_TIMES};

/// The four multi-select filter categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCategory {
    Weekday,
    Period,
    Degree,
    Category,
}

impl FilterCategory {
    /// Query-parameter key for this category.
    pub fn key(&self) -> &'static str {
        match self {
            FilterCategory::Weekday => "weekday",
            FilterCategory::Period => "period",
            FilterCategory::Degree => "degree",
            FilterCategory::Category => "category",
        }
    }

    pub const ALL: [FilterCategory; 4] = [
        FilterCategory::Weekday,
        FilterCategory::Period,
        FilterCategory::Degree,
        FilterCategory::Category,
    ];
}

/// One checkbox in a filter panel.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// Degree programs offered in the degree panel.
pub const DEGREE_OPTIONS: [&str; 8] = [
    "四技",
    "二技",
    "二技(三年)",
    "碩士班",
    "博士班",
    "學士後系",
    "學士後多元專長",
    "學士後學位學程",
];

/// Course-content categories offered in the category panel.
pub const CATEGORY_OPTIONS: [&str; 9] = [
    "跨校",
    "跨域課程",
    "全英語授課",
    "EMI全英語授課",
    "同步遠距教學",
    "非同步遠距教學",
    "混合式遠距教學",
    "遠距教學課程",
    "遠距輔助課程",
];

/// The checkbox set a panel for `category` is built from.
///
/// Identical for every role; guest, student and admin panels differ only
/// in surrounding chrome.
pub fn panel_options(category: FilterCategory) -> Vec<FilterOption> {
    match category {
        FilterCategory::Weekday => DAY_SYMBOLS
            .iter()
            .enumerate()
            .map(|(i, symbol)| FilterOption {
                value: (i + 1).to_string(),
                label: format!("週{symbol}"),
            })
            .collect(),
        FilterCategory::Period => PERIOD_TIMES
            .iter()
            .map(|(p, time)| FilterOption {
                value: p.to_string(),
                label: format!("第{}節 ({})", p, time.replace('-', "~")),
            })
            .collect(),
        FilterCategory::Degree => DEGREE_OPTIONS
            .iter()
            .map(|v| FilterOption {
                value: v.to_string(),
                label: v.to_string(),
            })
            .collect(),
        FilterCategory::Category => CATEGORY_OPTIONS
            .iter()
            .map(|v| FilterOption {
                value: v.to_string(),
                label: v.to_string(),
            })
            .collect(),
    }
}

/// In-memory search criteria for one view.
///
/// Multi-select categories keep insertion order with uniqueness enforced;
/// single-select fields are plain strings where blank means "any".
/// Nothing here is persisted; a page load starts empty.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    weekday: Vec<String>,
    period: Vec<String>,
    degree: Vec<String>,
    category: Vec<String>,
    pub keyword: String,
    pub semester: String,
    pub department: String,
    pub grade: String,
    pub course_type: String,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, category: FilterCategory) -> &mut Vec<String> {
        match category {
            FilterCategory::Weekday => &mut self.weekday,
            FilterCategory::Period => &mut self.period,
            FilterCategory::Degree => &mut self.degree,
            FilterCategory::Category => &mut self.category,
        }
    }

    /// Current members of a category's set, in insertion order.
    pub fn selected(&self, category: FilterCategory) -> &[String] {
        match category {
            FilterCategory::Weekday => &self.weekday,
            FilterCategory::Period => &self.period,
            FilterCategory::Degree => &self.degree,
            FilterCategory::Category => &self.category,
        }
    }

    /// Adds `value` to the category when `included`, removes it otherwise.
    ///
    /// Idempotent: repeating a toggle with the same `included` flag is a
    /// no-op beyond the first.
    pub fn toggle(&mut self, category: FilterCategory, value: &str, included: bool) {
        let set = self.set_mut(category);
        if included {
            if !set.iter().any(|v| v == value) {
                set.push(value.to_string());
            }
        } else {
            set.retain(|v| v != value);
        }
    }

    /// Clears every category and single-select field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when no criterion is set at all.
    pub fn is_empty(&self) -> bool {
        self.serialize().is_empty()
    }

    /// Serializes to query parameters for `/api/courses`.
    ///
    /// Multi-select sets become comma-joined values; empty sets and blank
    /// single-selects emit no key. This is the only path by which filter
    /// state reaches a search request.
    pub fn serialize(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let singles = [
            ("keyword", &self.keyword),
            ("semester", &self.semester),
            ("department", &self.department),
            ("grade", &self.grade),
            ("type", &self.course_type),
        ];
        for (key, value) in singles {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                params.push((key, trimmed.to_string()));
            }
        }

        for category in FilterCategory::ALL {
            let set = self.selected(category);
            if !set.is_empty() {
                params.push((category.key(), set.join(",")));
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let mut filters = FilterSelection::new();
        filters.toggle(FilterCategory::Weekday, "1", true);
        filters.toggle(FilterCategory::Weekday, "1", true);
        filters.toggle(FilterCategory::Weekday, "3", true);
        assert_eq!(filters.selected(FilterCategory::Weekday), ["1", "3"]);

        filters.toggle(FilterCategory::Weekday, "1", false);
        filters.toggle(FilterCategory::Weekday, "1", false);
        assert_eq!(filters.selected(FilterCategory::Weekday), ["3"]);
    }

    #[test]
    fn test_last_toggle_per_value_decides() {
        // replaying only the last toggle per distinct value yields the
        // same set as the full sequence
        let sequence = [
            ("2", true),
            ("5", true),
            ("2", false),
            ("7", true),
            ("5", false),
            ("5", true),
            ("2", true),
        ];

        let mut full = FilterSelection::new();
        for (value, included) in sequence {
            full.toggle(FilterCategory::Period, value, included);
        }

        let mut last_only = FilterSelection::new();
        last_only.toggle(FilterCategory::Period, "7", true);
        last_only.toggle(FilterCategory::Period, "5", true);
        last_only.toggle(FilterCategory::Period, "2", true);

        let mut a: Vec<_> = full.selected(FilterCategory::Period).to_vec();
        let mut b: Vec<_> = last_only.selected(FilterCategory::Period).to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_joins_and_omits_empty() {
        let mut filters = FilterSelection::new();
        filters.toggle(FilterCategory::Weekday, "1", true);
        filters.toggle(FilterCategory::Weekday, "5", true);
        filters.toggle(FilterCategory::Degree, "四技", true);
        filters.semester = "113-1".to_string();
        filters.keyword = "  ".to_string();

        let params = filters.serialize();
        assert_eq!(value_of(&params, "weekday"), Some("1,5"));
        assert_eq!(value_of(&params, "degree"), Some("四技"));
        assert_eq!(value_of(&params, "semester"), Some("113-1"));
        assert_eq!(value_of(&params, "keyword"), None);
        assert_eq!(value_of(&params, "period"), None);
        assert_eq!(value_of(&params, "category"), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut filters = FilterSelection::new();
        filters.toggle(FilterCategory::Category, "跨校", true);
        filters.department = "護理系".to_string();
        filters.reset();
        assert!(filters.is_empty());
        assert!(filters.serialize().is_empty());
    }

    #[test]
    fn test_panel_option_catalogs() {
        assert_eq!(panel_options(FilterCategory::Weekday).len(), 7);
        assert_eq!(panel_options(FilterCategory::Period).len(), 14);
        assert_eq!(panel_options(FilterCategory::Degree).len(), 8);
        assert_eq!(panel_options(FilterCategory::Category).len(), 9);

        let periods = panel_options(FilterCategory::Period);
        assert_eq!(periods[0].value, "1");
        assert_eq!(periods[0].label, "第1節 (08:10~09:00)");
        let weekdays = panel_options(FilterCategory::Weekday);
        assert_eq!(weekdays[6].value, "7");
        assert_eq!(weekdays[6].label, "週日");
    }
}
