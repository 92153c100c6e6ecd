//! [`Period`] definitions.

use common::Date;
use derive_more::{Display, Error};

#[cfg(doc)]
use super::Contract;

/// Whole-day date range a [`Contract`] spans, both ends inclusive.
///
/// Open-ended if [`Period::end()`] is [`None`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Period {
    /// First day of this [`Period`].
    start: Date,

    /// Last day of this [`Period`], if any.
    end: Option<Date>,
}

impl Period {
    /// Creates a new [`Period`] out of the provided bounds.
    ///
    /// # Errors
    ///
    /// If the provided `end` precedes the `start`.
    pub fn new(start: Date, end: Option<Date>) -> Result<Self, InvalidPeriod> {
        if let Some(end) = end {
            if end < start {
                return Err(InvalidPeriod { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates a new open-ended [`Period`] starting at the provided [`Date`].
    #[must_use]
    pub const fn open(start: Date) -> Self {
        Self { start, end: None }
    }

    /// Returns the first day of this [`Period`].
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of this [`Period`], if any.
    #[must_use]
    pub const fn end(&self) -> Option<Date> {
        self.end
    }

    /// Returns this [`Period`] with the provided `end`.
    ///
    /// # Errors
    ///
    /// If the provided `end` precedes the start of this [`Period`].
    pub fn with_end(self, end: Option<Date>) -> Result<Self, InvalidPeriod> {
        Self::new(self.start, end)
    }

    /// Checks whether this [`Period`] shares at least one day with the
    /// `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.end.map_or(true, |end| other.start <= end)
            && other.end.map_or(true, |end| self.start <= end)
    }

    /// Checks whether this [`Period`] includes the provided [`Date`].
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && self.end.map_or(true, |end| date <= end)
    }
}

/// Error of a [`Period`] ending before it starts.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`Period` ends ({end}) before it starts ({start})")]
pub struct InvalidPeriod {
    /// Requested start of the [`Period`].
    pub start: Date,

    /// Requested end of the [`Period`].
    pub end: Date,
}

#[cfg(test)]
mod spec {
    use common::Date;
    use proptest::prelude::*;

    use super::Period;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn period(start: &str, end: Option<&str>) -> Period {
        Period::new(date(start), end.map(date)).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let start = date("2024-02-01");
        assert!(Period::new(start, Some(date("2024-01-31"))).is_err());
        assert!(Period::new(start, Some(start)).is_ok());
    }

    #[test]
    fn overlaps_on_shared_boundary_day() {
        let a = period("2024-01-01", Some("2024-01-31"));
        let b = period("2024-01-31", Some("2024-02-29"));
        let c = period("2024-02-01", None);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&c));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn open_ended_periods_always_meet() {
        let a = period("2020-01-01", None);
        let b = period("2030-01-01", None);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn contains() {
        let p = period("2024-01-01", Some("2024-01-31"));
        assert!(p.contains(date("2024-01-01")));
        assert!(p.contains(date("2024-01-31")));
        assert!(!p.contains(date("2023-12-31")));
        assert!(!p.contains(date("2024-02-01")));
        assert!(Period::open(date("2024-01-01")).contains(date("2999-01-01")));
    }

    /// Builds a [`Period`] out of day offsets from a fixed origin.
    fn from_offsets(start: i64, len: Option<i64>) -> Period {
        let origin = date("2024-01-01");
        let start_date = origin.add_days(start).unwrap();
        Period::new(start_date, len.and_then(|l| start_date.add_days(l)))
            .unwrap()
    }

    proptest! {
        #[test]
        fn overlap_matches_interval_intersection(
            a_start in 0_i64..400,
            a_len in proptest::option::of(0_i64..120),
            b_start in 0_i64..400,
            b_len in proptest::option::of(0_i64..120),
        ) {
            let a = from_offsets(a_start, a_len);
            let b = from_offsets(b_start, b_len);

            let a_end = a_len.map_or(i64::MAX, |l| a_start + l);
            let b_end = b_len.map_or(i64::MAX, |l| b_start + l);
            let expected = a_start.max(b_start) <= a_end.min(b_end);

            prop_assert_eq!(a.overlaps(&b), expected);
            prop_assert_eq!(b.overlaps(&a), expected);
        }
    }
}
