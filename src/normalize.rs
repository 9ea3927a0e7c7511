//! Publication-date normalization.
//!
//! Source payloads carry timestamps in at least two dialects: RFC-2822
//! strings from RSS `pubDate` elements ("Wed, 02 Oct 2024 13:00:00 +0700")
//! and Indonesian-language dates from index pages ("2 Oktober 2024, 13:00
//! WIB"). [`normalize_date`] maps any of these, or their absence, to a naive
//! timestamp at second precision. The function is total: one malformed date
//! must never abort a batch of otherwise-valid articles, so every failure
//! path resolves to the supplied processing time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::{NormalizedArticle, RawCandidate};

/// Timezone abbreviations stripped before localized parsing.
///
/// Order matters: "wita" contains "wit", so it must be removed first or the
/// shorter token leaves a stray "a" behind.
const TZ_TOKENS: [&str; 3] = ["wib", "wita", "wit"];

/// Indonesian month names mapped to two-digit month numbers.
///
/// Full names are enumerated before abbreviations and the first name found
/// during a single pass wins. The order is load-bearing: an abbreviation is
/// a prefix of its full form ("okt" / "oktober"), and scanning full names
/// first resolves the overlap consistently.
const MONTHS: [(&str, &str); 23] = [
    ("januari", "01"),
    ("februari", "02"),
    ("maret", "03"),
    ("april", "04"),
    ("mei", "05"),
    ("juni", "06"),
    ("juli", "07"),
    ("agustus", "08"),
    ("september", "09"),
    ("oktober", "10"),
    ("november", "11"),
    ("desember", "12"),
    ("jan", "01"),
    ("feb", "02"),
    ("mar", "03"),
    ("apr", "04"),
    ("jun", "06"),
    ("jul", "07"),
    ("agu", "08"),
    ("sep", "09"),
    ("okt", "10"),
    ("nov", "11"),
    ("des", "12"),
];

/// Resolve a free-form date string to a canonical timestamp.
///
/// Strategies are attempted in order, first success wins:
///
/// 1. Absent or empty input returns `now` immediately.
/// 2. RFC-2822 parse; the timezone offset is discarded and the wall-clock
///    value kept as naive local time.
/// 3. Localized parse of `"<day> <month-name> <year> [HH:MM]"` with
///    timezone tokens and commas stripped.
/// 4. Anything else returns `now`.
pub fn normalize_date(raw: Option<&str>, now: NaiveDateTime) -> NaiveDateTime {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return now,
    };

    if let Some(dt) = parse_rfc2822(raw) {
        return dt;
    }
    parse_localized(raw).unwrap_or(now)
}

/// Normalize a batch of candidates, consuming them.
pub fn normalize_all(candidates: Vec<RawCandidate>, now: NaiveDateTime) -> Vec<NormalizedArticle> {
    candidates
        .into_iter()
        .map(|c| NormalizedArticle {
            published_at: normalize_date(c.raw_date.as_deref(), now),
            source: c.source,
            title: c.title,
            url: c.url,
            scraped_at: c.scraped_at,
        })
        .collect()
}

fn parse_rfc2822(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.naive_local())
}

fn parse_localized(raw: &str) -> Option<NaiveDateTime> {
    let mut clean = raw.to_lowercase();
    for token in TZ_TOKENS {
        clean = clean.replace(token, "");
    }
    clean = clean.replace(',', "");

    // Substitute the first month name found; every occurrence of that one
    // name is replaced, then the scan stops.
    for (name, number) in MONTHS {
        if clean.contains(name) {
            clean = clean.replace(name, number);
            break;
        }
    }

    let parts: Vec<&str> = clean.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (hour, minute) = match parts.get(3) {
        Some(clock) if clock.contains(':') => {
            let mut pieces = clock.split(':');
            let hour: u32 = pieces.next()?.parse().ok()?;
            let minute: u32 = pieces.next()?.parse().ok()?;
            (hour, minute)
        }
        _ => (0, 0),
    };

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn fallback() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn expect(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_rfc2822_offset_discarded() {
        let got = normalize_date(Some("Wed, 02 Oct 2024 13:00:00 +0700"), fallback());
        assert_eq!(got, expect(2024, 10, 2, 13, 0));
    }

    #[test]
    fn test_rfc2822_gmt() {
        let got = normalize_date(Some("Mon, 15 Jan 2024 08:30:00 GMT"), fallback());
        assert_eq!(got, expect(2024, 1, 15, 8, 30));
    }

    #[test]
    fn test_indonesian_full_month_with_wib() {
        let got = normalize_date(Some("2 Oktober 2024 13:00 WIB"), fallback());
        assert_eq!(got, expect(2024, 10, 2, 13, 0));
    }

    #[test]
    fn test_indonesian_with_comma_and_wita() {
        let got = normalize_date(Some("17 Agustus 2025, 09:45 WITA"), fallback());
        assert_eq!(got, expect(2025, 8, 17, 9, 45));
    }

    #[test]
    fn test_indonesian_wit_token() {
        let got = normalize_date(Some("5 Mei 2024 21:10 WIT"), fallback());
        assert_eq!(got, expect(2024, 5, 5, 21, 10));
    }

    #[test]
    fn test_indonesian_abbreviated_month() {
        let got = normalize_date(Some("2 Okt 2024 13:00"), fallback());
        assert_eq!(got, expect(2024, 10, 2, 13, 0));
    }

    #[test]
    fn test_missing_clock_defaults_to_midnight() {
        let got = normalize_date(Some("31 Desember 2023"), fallback());
        assert_eq!(got, expect(2023, 12, 31, 0, 0));
    }

    #[test]
    fn test_absent_returns_now() {
        assert_eq!(normalize_date(None, fallback()), fallback());
    }

    #[test]
    fn test_empty_returns_now() {
        assert_eq!(normalize_date(Some("   "), fallback()), fallback());
    }

    #[test]
    fn test_unparseable_returns_now() {
        assert_eq!(normalize_date(Some("baru saja"), fallback()), fallback());
    }

    #[test]
    fn test_invalid_calendar_date_returns_now() {
        assert_eq!(
            normalize_date(Some("31 Februari 2024 10:00"), fallback()),
            fallback()
        );
    }

    #[test]
    fn test_invalid_clock_returns_now() {
        assert_eq!(
            normalize_date(Some("2 Oktober 2024 25:99"), fallback()),
            fallback()
        );
    }

    proptest! {
        // Totality: no input string may panic or escape the fallback.
        #[test]
        fn test_normalize_is_total(s in "\\PC*") {
            let _ = normalize_date(Some(&s), fallback());
        }
    }
}
