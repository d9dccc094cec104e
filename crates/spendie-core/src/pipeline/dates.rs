//! Date range resolution for queries
//!
//! Expands the relative period tokens produced by the query extractor into
//! inclusive absolute ranges. Pure: the reference date is always passed in.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::DateRange;

/// Relative period vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Last7Days,
    Last30Days,
}

impl DateToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::Last7Days => "last_7_days",
            Self::Last30Days => "last_30_days",
        }
    }

    /// Expand the token against `today`
    ///
    /// Weeks start on Monday.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            Self::Today => DateRange::single(today),
            Self::Yesterday => DateRange::single(today - Duration::days(1)),
            Self::ThisWeek => DateRange::new(start_of_week(today), today),
            Self::LastWeek => {
                let end = start_of_week(today) - Duration::days(1);
                DateRange::new(end - Duration::days(6), end)
            }
            Self::ThisMonth => DateRange::new(start_of_month(today), today),
            Self::LastMonth => {
                let end = start_of_month(today) - Duration::days(1);
                DateRange::new(start_of_month(end), end)
            }
            Self::Last7Days => DateRange::new(today - Duration::days(6), today),
            Self::Last30Days => DateRange::new(today - Duration::days(29), today),
        }
    }
}

impl std::str::FromStr for DateToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "this_week" => Ok(Self::ThisWeek),
            "last_week" => Ok(Self::LastWeek),
            "this_month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "last_7_days" => Ok(Self::Last7Days),
            "last_30_days" => Ok(Self::Last30Days),
            _ => Err(format!("Unknown date token: {}", s)),
        }
    }
}

fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn start_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}

/// A candidate date as emitted by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExpr {
    Absolute(NaiveDate),
    Relative(DateToken),
}

impl DateExpr {
    /// Parse `YYYY-MM-DD` or a relative token
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Self::Absolute(date));
        }
        s.parse().ok().map(Self::Relative)
    }
}

/// Outcome of resolving a start/end candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeResolution {
    pub range: Option<DateRange>,
    /// A candidate was present but not understood; the range was dropped
    pub unrecognised: bool,
}

/// Resolve the extractor's `start_date` / `end_date` candidates
///
/// - a relative start fixes both bounds
/// - an absolute start without end runs until `today`
/// - a relative end alone names its whole period; an absolute end alone is dropped
/// - an unrecognised candidate drops the range
/// - reversed bounds are swapped
pub fn resolve_range(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> RangeResolution {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    let parse = |raw: Option<&str>| -> Result<Option<DateExpr>, ()> {
        match raw {
            None => Ok(None),
            Some(s) => DateExpr::parse(s).map(Some).ok_or(()),
        }
    };

    let (start, end) = match (parse(start), parse(end)) {
        (Ok(s), Ok(e)) => (s, e),
        _ => {
            return RangeResolution {
                range: None,
                unrecognised: true,
            }
        }
    };

    let range = match (start, end) {
        (None, None) => None,
        (Some(DateExpr::Relative(token)), _) => Some(token.resolve(today)),
        (Some(DateExpr::Absolute(s)), None) => Some(DateRange::new(s, today)),
        (Some(DateExpr::Absolute(s)), Some(DateExpr::Absolute(e))) => Some(DateRange::new(s, e)),
        (Some(DateExpr::Absolute(s)), Some(DateExpr::Relative(token))) => {
            Some(DateRange::new(s, token.resolve(today).end))
        }
        (None, Some(DateExpr::Relative(token))) => Some(token.resolve(today)),
        (None, Some(DateExpr::Absolute(_))) => None,
    };

    RangeResolution {
        range,
        unrecognised: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-06-13 is a Thursday
    fn thursday() -> NaiveDate {
        d(2024, 6, 13)
    }

    #[test]
    fn test_today_and_yesterday() {
        assert_eq!(DateToken::Today.resolve(thursday()), DateRange::single(thursday()));
        assert_eq!(
            DateToken::Yesterday.resolve(d(2024, 3, 1)),
            DateRange::single(d(2024, 2, 29))
        );
    }

    #[test]
    fn test_this_week_starts_monday() {
        let range = DateToken::ThisWeek.resolve(thursday());
        assert_eq!(range.start, d(2024, 6, 10));
        assert_eq!(range.end, thursday());

        let monday = DateToken::ThisWeek.resolve(d(2024, 6, 10));
        assert_eq!(monday, DateRange::single(d(2024, 6, 10)));
    }

    #[test]
    fn test_last_week_is_previous_monday_to_sunday() {
        let range = DateToken::LastWeek.resolve(thursday());
        assert_eq!(range.start, d(2024, 6, 3));
        assert_eq!(range.end, d(2024, 6, 9));

        // On a Sunday, this week is Mon..Sun and last week the seven days before
        let sunday = DateToken::LastWeek.resolve(d(2024, 6, 16));
        assert_eq!(sunday.start, d(2024, 6, 3));
        assert_eq!(sunday.end, d(2024, 6, 9));
    }

    #[test]
    fn test_month_tokens() {
        let range = DateToken::ThisMonth.resolve(thursday());
        assert_eq!(range.start, d(2024, 6, 1));
        assert_eq!(range.end, thursday());

        let last = DateToken::LastMonth.resolve(d(2024, 3, 15));
        assert_eq!(last.start, d(2024, 2, 1));
        assert_eq!(last.end, d(2024, 2, 29));

        let january = DateToken::LastMonth.resolve(d(2024, 1, 5));
        assert_eq!(january.start, d(2023, 12, 1));
        assert_eq!(january.end, d(2023, 12, 31));
    }

    #[test]
    fn test_trailing_windows_are_inclusive() {
        let week = DateToken::Last7Days.resolve(thursday());
        assert_eq!(week.start, d(2024, 6, 7));
        let month = DateToken::Last30Days.resolve(thursday());
        assert_eq!((month.end - month.start).num_days(), 29);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        for token in ["today", "yesterday", "this_week", "last_week", "last_month"] {
            let a = resolve_range(Some(token), None, thursday());
            let b = resolve_range(Some(token), None, thursday());
            assert_eq!(a, b);
            assert!(a.range.is_some());
        }
    }

    #[test]
    fn test_token_spellings() {
        assert_eq!("This Week".parse::<DateToken>(), Ok(DateToken::ThisWeek));
        assert_eq!("last-7-days".parse::<DateToken>(), Ok(DateToken::Last7Days));
        assert!("fortnight".parse::<DateToken>().is_err());
    }

    #[test]
    fn test_resolve_range_rules() {
        let today = thursday();

        // Relative start wins over any end
        let r = resolve_range(Some("yesterday"), Some("2024-01-01"), today);
        assert_eq!(r.range, Some(DateRange::single(d(2024, 6, 12))));

        // Absolute start runs to today
        let r = resolve_range(Some("2024-06-01"), None, today);
        assert_eq!(r.range, Some(DateRange::new(d(2024, 6, 1), today)));

        // Reversed bounds are swapped
        let r = resolve_range(Some("2024-06-30"), Some("2024-06-01"), today);
        assert_eq!(r.range, Some(DateRange::new(d(2024, 6, 1), d(2024, 6, 30))));

        // Absolute start, relative end
        let r = resolve_range(Some("2024-06-01"), Some("yesterday"), today);
        assert_eq!(r.range, Some(DateRange::new(d(2024, 6, 1), d(2024, 6, 12))));

        // Relative end alone names its period
        let r = resolve_range(None, Some("last_week"), today);
        assert_eq!(r.range, Some(DateRange::new(d(2024, 6, 3), d(2024, 6, 9))));

        // Absolute end alone is dropped
        let r = resolve_range(Some(" "), Some("2024-06-01"), today);
        assert_eq!(r, RangeResolution::default());

        // Nothing at all
        assert_eq!(resolve_range(None, None, today), RangeResolution::default());
    }

    #[test]
    fn test_unrecognised_token_drops_range() {
        let r = resolve_range(Some("last_quarter"), None, thursday());
        assert!(r.range.is_none());
        assert!(r.unrecognised);

        let r = resolve_range(Some("2024-06-01"), Some("13/06/2024"), thursday());
        assert!(r.range.is_none());
        assert!(r.unrecognised);
    }
}
