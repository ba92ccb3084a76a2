//! Close-latency histogram
//!
//! Nine fixed, non-overlapping buckets measured in fractional days. Each
//! bucket is inclusive of its upper bound; the first bucket also takes every
//! negative or zero duration and the last is unbounded.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    Hour,
    ThreeHours,
    NineHours,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    OverYear,
}

impl AgeBucket {
    /// Buckets in histogram order
    pub const ALL: [AgeBucket; 9] = [
        AgeBucket::Hour,
        AgeBucket::ThreeHours,
        AgeBucket::NineHours,
        AgeBucket::Day,
        AgeBucket::Week,
        AgeBucket::Month,
        AgeBucket::Quarter,
        AgeBucket::Year,
        AgeBucket::OverYear,
    ];

    /// Inclusive upper bound in days; `None` for the last bucket
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            AgeBucket::Hour => Some(0.0417),
            AgeBucket::ThreeHours => Some(0.125),
            AgeBucket::NineHours => Some(0.375),
            AgeBucket::Day => Some(1.0),
            AgeBucket::Week => Some(7.0),
            AgeBucket::Month => Some(30.0),
            AgeBucket::Quarter => Some(90.0),
            AgeBucket::Year => Some(365.0),
            AgeBucket::OverYear => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Hour => "1 hour",
            AgeBucket::ThreeHours => "3 hours",
            AgeBucket::NineHours => "9 hours",
            AgeBucket::Day => "1 day",
            AgeBucket::Week => "1 week",
            AgeBucket::Month => "1 month",
            AgeBucket::Quarter => "1 quarter",
            AgeBucket::Year => "1 year",
            AgeBucket::OverYear => "over 1 year",
        }
    }

    /// The single bucket a duration in days falls into
    pub fn for_days(days: f64) -> AgeBucket {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.upper_bound().map_or(true, |upper| days <= upper))
            .unwrap_or(AgeBucket::OverYear)
    }

    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|b| b == self)
            .unwrap_or(Self::ALL.len() - 1)
    }
}

/// Counts per age bucket, always nine entries in fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgeHistogram {
    counts: [u64; 9],
}

impl AgeHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, days: f64) {
        self.counts[AgeBucket::for_days(days).index()] += 1;
    }

    /// (bucket, count) pairs in histogram order
    pub fn iter(&self) -> impl Iterator<Item = (AgeBucket, u64)> + '_ {
        AgeBucket::ALL.into_iter().zip(self.counts.iter().copied())
    }
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` with an optional ` UTC` or
/// numeric offset suffix, and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = value.strip_suffix(" UTC").unwrap_or(value);
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Fractional days from `start` to `end`
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Whole days from `start` to `end`, rounded to the nearest day
pub fn whole_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    days_between(start, end).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries_are_inclusive_upper() {
        assert_eq!(AgeBucket::for_days(-2.0), AgeBucket::Hour);
        assert_eq!(AgeBucket::for_days(0.0), AgeBucket::Hour);
        assert_eq!(AgeBucket::for_days(0.0417), AgeBucket::Hour);
        assert_eq!(AgeBucket::for_days(0.0418), AgeBucket::ThreeHours);
        assert_eq!(AgeBucket::for_days(0.125), AgeBucket::ThreeHours);
        assert_eq!(AgeBucket::for_days(0.375), AgeBucket::NineHours);
        assert_eq!(AgeBucket::for_days(1.0), AgeBucket::Day);
        assert_eq!(AgeBucket::for_days(7.0), AgeBucket::Week);
        assert_eq!(AgeBucket::for_days(30.0), AgeBucket::Month);
        assert_eq!(AgeBucket::for_days(90.0), AgeBucket::Quarter);
        assert_eq!(AgeBucket::for_days(365.0), AgeBucket::Year);
        assert_eq!(AgeBucket::for_days(365.0001), AgeBucket::OverYear);
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(AgeBucket::for_days(0.05).label(), "3 hours");
        assert_eq!(AgeBucket::for_days(400.0).label(), "over 1 year");
    }

    #[test]
    fn test_every_sample_lands_in_exactly_one_bucket() {
        let mut histogram = AgeHistogram::new();
        let mut samples = 0;
        let mut days = 0.0;
        while days < 800.0 {
            histogram.record(days);
            samples += 1;
            days += 0.01 + days / 50.0;
        }
        assert_eq!(histogram.iter().map(|(_, count)| count).sum::<u64>(), samples);
        assert_eq!(histogram.iter().count(), 9);
        let labels: Vec<_> = histogram.iter().map(|(b, _)| b.label()).collect();
        assert_eq!(labels.first(), Some(&"1 hour"));
        assert_eq!(labels.last(), Some(&"over 1 year"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2015-03-04T05:06:07Z").unwrap();
        assert_eq!(parse_timestamp("2015-03-04 05:06:07 UTC"), Some(expected));
        assert_eq!(parse_timestamp("2015-03-04 05:06:07"), Some(expected));
        assert_eq!(parse_timestamp("2015-03-04 06:06:07 +0100"), Some(expected));
        assert!(parse_timestamp("2015-03-04").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_days_between() {
        let start = parse_timestamp("2015-01-01T00:00:00Z").unwrap();
        let end = parse_timestamp("2015-01-01T01:12:00Z").unwrap();
        assert!((days_between(start, end) - 0.05).abs() < 1e-9);

        let later = parse_timestamp("2015-01-03T13:00:00Z").unwrap();
        assert_eq!(whole_days_between(start, later), 3);
    }
}
