//! Day and period resolution for course time placements.
//!
//! Courses carry their time in one of two shapes: structured `weekday`
//! ("1".."7") + `period` (single value, comma list, or dash range), or a
//! free-text `day_time` such as "週五，2-4節". The structured shape always
//! wins; the free-text shape is pattern-extracted only when the structured
//! fields are absent or blank. The two paths are never merged for one
//! record.

use crate::types::CourseRecord;
use regex::Regex;
use std::sync::LazyLock;

/// Day symbols indexed by weekday code 1..=7 (Monday through Sunday).
pub const DAY_SYMBOLS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

/// Periods per day.
pub const PERIOD_COUNT: usize = 14;

/// Weekdays per grid.
pub const WEEKDAY_COUNT: usize = 7;

/// Fixed clock times per period, indexed by period number 1..=14.
///
/// The midday and evening gaps (after periods 4 and 10) are part of the
/// institution's timetable and are reproduced literally.
pub const PERIOD_TIMES: [(u32, &str); PERIOD_COUNT] = [
    (1, "08:10-09:00"),
    (2, "09:10-10:00"),
    (3, "10:10-11:00"),
    (4, "11:10-12:00"),
    (5, "12:40-13:30"),
    (6, "13:40-14:30"),
    (7, "14:40-15:30"),
    (8, "15:40-16:30"),
    (9, "16:40-17:30"),
    (10, "17:40-18:30"),
    (11, "18:35-19:25"),
    (12, "19:30-20:20"),
    (13, "20:25-21:15"),
    (14, "21:20-22:10"),
];

// Compiled once; same extraction patterns the UI applied to day_time text.
static DAY_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"週([一二三四五六日])").unwrap());
static PERIOD_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+[-,\d]*)").unwrap());

/// Maps a structured weekday code "1".."7" to its day symbol.
pub fn weekday_symbol(code: &str) -> Option<&'static str> {
    let n: usize = code.trim().parse().ok()?;
    (1..=WEEKDAY_COUNT).contains(&n).then(|| DAY_SYMBOLS[n - 1])
}

/// Maps a day symbol back to its weekday code 1..=7.
pub fn symbol_weekday(symbol: &str) -> Option<u8> {
    DAY_SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|i| i as u8 + 1)
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Resolves the display day symbol for a course.
///
/// Structured `weekday` takes priority; a structured code outside 1..=7
/// yields nothing rather than falling back to `day_time`.
pub fn resolve_weekday_symbol(course: &CourseRecord) -> Option<&'static str> {
    if let Some(code) = non_blank(&course.weekday) {
        return weekday_symbol(code);
    }
    non_blank(&course.day_time)
        .and_then(|text| DAY_TOKEN_REGEX.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| symbol_weekday(m.as_str()))
        .map(|n| DAY_SYMBOLS[n as usize - 1])
}

/// Resolves the weekday code 1..=7 for grid placement.
pub fn resolve_weekday_number(course: &CourseRecord) -> Option<u8> {
    if let Some(code) = non_blank(&course.weekday) {
        let n: u8 = code.parse().ok()?;
        return (1..=WEEKDAY_COUNT as u8).contains(&n).then_some(n);
    }
    non_blank(&course.day_time)
        .and_then(|text| DAY_TOKEN_REGEX.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| symbol_weekday(m.as_str()))
}

/// Resolves the raw period string for a course.
///
/// Structured `period` is used verbatim; otherwise the first maximal run of
/// digits, commas and hyphens in `day_time` is extracted.
pub fn resolve_period(course: &CourseRecord) -> Option<String> {
    if let Some(period) = non_blank(&course.period) {
        return Some(period.to_string());
    }
    non_blank(&course.day_time)
        .and_then(|text| PERIOD_RUN_REGEX.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Expands a raw period string into an ordered list of distinct period
/// numbers.
///
/// A string containing `-` is one inclusive range from the integer before
/// the first hyphen to the leading integer after the last hyphen, so a
/// mixed "2-4,6" reads as 2..=4 with the tail dropped. Otherwise a comma
/// list is parsed per token, and anything else as a single number.
/// Out-of-range values survive here; they are dropped at grid placement.
pub fn expand_periods(raw: &str) -> Vec<u32> {
    let raw = raw.trim();
    let mut out: Vec<u32> = Vec::new();

    if raw.contains('-') {
        let mut parts = raw.split('-');
        let start = parts.next().and_then(parse_leading_u32);
        let end = parts.next_back().and_then(parse_leading_u32);
        if let (Some(start), Some(end)) = (start, end) {
            out.extend(start..=end);
        }
    } else if raw.contains(',') {
        for token in raw.split(',') {
            if let Some(p) = parse_leading_u32(token.trim()) {
                out.push(p);
            }
        }
    } else if let Some(p) = parse_leading_u32(raw) {
        out.push(p);
    }

    let mut distinct = Vec::with_capacity(out.len());
    for p in out {
        if !distinct.contains(&p) {
            distinct.push(p);
        }
    }
    distinct
}

/// parseInt-style leading integer, None when the token has no digit prefix.
fn parse_leading_u32(token: &str) -> Option<u32> {
    let token = token.trim();
    let end = token
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i + 1)?;
    token[..end].parse().ok()
}

/// Clock-time label for a period number, if in range.
pub fn period_time_label(period: u32) -> Option<&'static str> {
    PERIOD_TIMES
        .iter()
        .find(|(p, _)| *p == period)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CourseRecord;

    fn course(weekday: Option<&str>, period: Option<&str>, day_time: Option<&str>) -> CourseRecord {
        CourseRecord {
            weekday: weekday.map(str::to_string),
            period: period.map(str::to_string),
            day_time: day_time.map(str::to_string),
            ..CourseRecord::default()
        }
    }

    #[test]
    fn test_expand_range() {
        assert_eq!(expand_periods("2-4"), vec![2, 3, 4]);
    }

    #[test]
    fn test_expand_comma_list() {
        assert_eq!(expand_periods("2,3,4"), vec![2, 3, 4]);
        assert_eq!(expand_periods("2, 5 ,9"), vec![2, 5, 9]);
    }

    #[test]
    fn test_expand_single() {
        assert_eq!(expand_periods("5"), vec![5]);
    }

    #[test]
    fn test_expand_mixed_keeps_rightmost_hyphen_reading() {
        // "4,6" parses as leading integer 4; the tail never becomes richer
        // list semantics
        assert_eq!(expand_periods("2-4,6"), vec![2, 3, 4]);
        assert_eq!(expand_periods("1-2-5"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_expand_keeps_out_of_range_values() {
        // dropping happens at grid placement, not here
        assert_eq!(expand_periods("13-16"), vec![13, 14, 15, 16]);
        assert_eq!(expand_periods("0,1"), vec![0, 1]);
    }

    #[test]
    fn test_expand_garbage_is_empty() {
        assert!(expand_periods("").is_empty());
        assert!(expand_periods("節次未定").is_empty());
    }

    #[test]
    fn test_expand_dedupes_preserving_order() {
        assert_eq!(expand_periods("3,2,3"), vec![3, 2]);
    }

    #[test]
    fn test_structured_weekday_wins_over_day_time() {
        let c = course(Some("3"), None, Some("週五，2"));
        assert_eq!(resolve_weekday_symbol(&c), Some("三"));
        assert_eq!(resolve_weekday_number(&c), Some(3));
    }

    #[test]
    fn test_day_time_fallback_extracts_first_day_token() {
        let c = course(None, None, Some("週五，2-4節"));
        assert_eq!(resolve_weekday_symbol(&c), Some("五"));
        assert_eq!(resolve_weekday_number(&c), Some(5));
        assert_eq!(resolve_period(&c).as_deref(), Some("2-4"));
    }

    #[test]
    fn test_invalid_structured_weekday_does_not_fall_back() {
        let c = course(Some("9"), None, Some("週五，2"));
        assert_eq!(resolve_weekday_symbol(&c), None);
        assert_eq!(resolve_weekday_number(&c), None);
    }

    #[test]
    fn test_blank_structured_fields_fall_back() {
        let c = course(Some(""), Some("  "), Some("週日，11,12"));
        assert_eq!(resolve_weekday_symbol(&c), Some("日"));
        assert_eq!(resolve_period(&c).as_deref(), Some("11,12"));
    }

    #[test]
    fn test_no_time_information_resolves_to_nothing() {
        let c = course(None, None, None);
        assert_eq!(resolve_weekday_symbol(&c), None);
        assert_eq!(resolve_period(&c), None);
    }

    #[test]
    fn test_structured_period_used_verbatim() {
        let c = course(Some("1"), Some("2-3"), Some("週五，7"));
        assert_eq!(resolve_period(&c).as_deref(), Some("2-3"));
    }

    #[test]
    fn test_period_time_table_boundaries() {
        assert_eq!(period_time_label(1), Some("08:10-09:00"));
        assert_eq!(period_time_label(4), Some("11:10-12:00"));
        assert_eq!(period_time_label(5), Some("12:40-13:30"));
        assert_eq!(period_time_label(11), Some("18:35-19:25"));
        assert_eq!(period_time_label(14), Some("21:20-22:10"));
        assert_eq!(period_time_label(0), None);
        assert_eq!(period_time_label(15), None);
    }

    #[test]
    fn test_symbol_round_trip() {
        for code in 1..=7u8 {
            let symbol = weekday_symbol(&code.to_string()).unwrap();
            assert_eq!(symbol_weekday(symbol), Some(code));
        }
        assert_eq!(weekday_symbol("0"), None);
        assert_eq!(weekday_symbol("8"), None);
    }
}
