use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// The format used when a date has to be written back as text, for example
/// when a workbook cell holds a native date value.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to parse date: \"{input}\"")]
pub struct DateParseError {
    input: String,
}

impl DateParseError {
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Date,
    DateTime,
    Rfc3339,
}

/// A single textual date format that the flexible parser knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    name: &'static str,
    format: &'static str,
    kind: PatternKind,
}

impl DatePattern {
    const fn date(name: &'static str, format: &'static str) -> Self {
        Self {
            name,
            format,
            kind: PatternKind::Date,
        }
    }

    const fn date_time(name: &'static str, format: &'static str) -> Self {
        Self {
            name,
            format,
            kind: PatternKind::DateTime,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Tries to parse the whole `input` with this pattern.
    ///
    /// Years are only accepted with four digits, a two-digit year would
    /// otherwise silently end up in the first century.
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<NaiveDateTime> {
        match self.kind {
            PatternKind::Date => NaiveDate::parse_from_str(input, self.format)
                .ok()
                .filter(|date| has_four_digit_year(date.year()))
                .map(|date| date.and_time(NaiveTime::MIN)),
            PatternKind::DateTime => NaiveDateTime::parse_from_str(input, self.format)
                .ok()
                .filter(|date| has_four_digit_year(date.year())),
            PatternKind::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|date| date.naive_utc()),
        }
    }

    /// Writes `date` in this pattern, so that [`DatePattern::parse`] accepts it.
    #[must_use]
    pub fn format(&self, date: NaiveDateTime) -> String {
        match self.kind {
            PatternKind::Rfc3339 => date.and_utc().to_rfc3339(),
            PatternKind::Date | PatternKind::DateTime => date.format(self.format).to_string(),
        }
    }
}

const fn has_four_digit_year(year: i32) -> bool {
    year >= 1000 && year <= 9999
}

/// The ranked list of formats, the first one that matches wins.
///
/// The order matters: the numeric month-first variants come before ISO and the
/// day-first forms, because spreadsheets filled in by hand mostly use them.
pub const PATTERNS: [DatePattern; 14] = [
    DatePattern::date("MM/DD/YYYY", "%m/%d/%Y"),
    DatePattern::date("M/D/YYYY", "%-m/%-d/%Y"),
    DatePattern::date("M/DD/YYYY", "%-m/%d/%Y"),
    DatePattern::date("MM/D/YYYY", "%m/%-d/%Y"),
    DatePattern::date("YYYY-MM-DD", "%Y-%m-%d"),
    DatePattern::date("YYYY/MM/DD", "%Y/%m/%d"),
    DatePattern::date("Month D, YYYY", "%B %-d, %Y"),
    DatePattern::date("Mon D, YYYY", "%b %-d, %Y"),
    DatePattern::date("D Month YYYY", "%-d %B %Y"),
    DatePattern::date("D Mon YYYY", "%-d %b %Y"),
    DatePattern::date("DD-Mon-YYYY", "%d-%b-%Y"),
    DatePattern::date("D-Mon-YYYY", "%-d-%b-%Y"),
    DatePattern::date_time("YYYY-MM-DD HH:MM:SS", "%Y-%m-%d %H:%M:%S"),
    DatePattern {
        name: "RFC 3339",
        format: "%+",
        kind: PatternKind::Rfc3339,
    },
];

/// Converts a spreadsheet serial date (days since 1899-12-30) to a date.
///
/// The fractional part (time of day) is dropped.
#[must_use]
pub fn date_from_serial(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days <= 0.0 {
        return None;
    }

    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days.trunc() as u64))
}

/// Parses a date the way it is found in club spreadsheets.
///
/// All [`PATTERNS`] are tried in order. If none of them matches and the input
/// is a positive number, it is read as a spreadsheet serial date.
pub fn parse_flexible_date(input: &str) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = input.trim();

    PATTERNS
        .iter()
        .find_map(|pattern| pattern.parse(trimmed))
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(date_from_serial)
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| DateParseError {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_every_pattern_round_trips() {
        let dates = [
            date(2025, 10, 15),
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(1999, 12, 31),
            date(2026, 7, 4),
        ];

        for pattern in PATTERNS {
            for expected in dates {
                let text = pattern.format(expected);

                assert_eq!(
                    pattern.parse(&text),
                    Some(expected),
                    "pattern {} did not accept \"{}\"",
                    pattern.name(),
                    text
                );
                assert_eq!(
                    parse_flexible_date(&text),
                    Ok(expected),
                    "flexible parser misread \"{}\" (written as {})",
                    text,
                    pattern.name()
                );
            }
        }
    }

    #[test]
    fn test_common_spreadsheet_dates() {
        assert_eq!(parse_flexible_date("10/15/2025"), Ok(date(2025, 10, 15)));
        assert_eq!(parse_flexible_date("1/2/2006"), Ok(date(2006, 1, 2)));
        assert_eq!(parse_flexible_date("01/02/2006"), Ok(date(2006, 1, 2)));
        assert_eq!(parse_flexible_date("2025-10-15"), Ok(date(2025, 10, 15)));
        assert_eq!(parse_flexible_date("October 15, 2025"), Ok(date(2025, 10, 15)));
        assert_eq!(parse_flexible_date("Oct 15, 2025"), Ok(date(2025, 10, 15)));
        assert_eq!(parse_flexible_date("15 Oct 2025"), Ok(date(2025, 10, 15)));
        assert_eq!(parse_flexible_date("02-Jan-2006"), Ok(date(2006, 1, 2)));
        assert_eq!(
            parse_flexible_date("2025-10-15 00:00:00"),
            Ok(date(2025, 10, 15))
        );
        assert_eq!(
            parse_flexible_date("2025-10-15T12:30:00Z"),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 15)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap())
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_flexible_date("  10/15/2025 "), Ok(date(2025, 10, 15)));
    }

    #[test]
    fn test_serial_fallback() {
        assert_eq!(parse_flexible_date("45678"), Ok(date(2025, 1, 21)));
        assert_eq!(parse_flexible_date("45678.75"), Ok(date(2025, 1, 21)));
        assert_eq!(parse_flexible_date("1"), Ok(date(1899, 12, 31)));
    }

    #[test]
    fn test_serial_requires_positive_number() {
        assert!(parse_flexible_date("0").is_err());
        assert!(parse_flexible_date("-45678").is_err());
        assert!(parse_flexible_date("NaN").is_err());
        assert!(parse_flexible_date("inf").is_err());
    }

    #[test]
    fn test_textual_pattern_wins_over_serial() {
        assert_eq!(parse_flexible_date("2025/10/15"), Ok(date(2025, 10, 15)));
        // plain digits without separators only ever match the serial fallback
        let serial = date_from_serial(20_251_015.0)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_flexible_date("20251015"), Ok(serial));
    }

    #[test]
    fn test_unparseable_date_keeps_input() {
        let error = parse_flexible_date("next tuesday").unwrap_err();
        assert_eq!(error.input(), "next tuesday");
        assert_eq!(error.to_string(), "unable to parse date: \"next tuesday\"");

        assert!(parse_flexible_date("").is_err());
        assert!(parse_flexible_date("TBD").is_err());
    }

    #[test]
    fn test_day_first_numeric_is_rejected() {
        // there is no month 15, so this must not be guessed
        assert!(parse_flexible_date("15/10/2025").is_err());
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        assert!(parse_flexible_date("10/15/25").is_err());
    }

    #[test]
    fn test_date_from_serial() {
        assert_eq!(
            date_from_serial(45945.0),
            NaiveDate::from_ymd_opt(2025, 10, 15)
        );
        assert_eq!(date_from_serial(0.0), None);
        assert_eq!(date_from_serial(f64::MAX), None);
    }
}
