//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, hash, marker::PhantomData, str::FromStr};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::DateTime;

/// `YYYY-MM-DD` format of a [`Date`].
const ISO_DATE: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date with a whole-day granularity.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self::from_inner)
    }

    /// Wraps the provided [`time::Date`].
    const fn from_inner(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    /// Returns the month (`1..=12`) of this [`Date`].
    #[must_use]
    pub fn month(&self) -> u8 {
        self.inner.month().into()
    }

    /// Returns the day of month of this [`Date`].
    #[must_use]
    pub fn day(&self) -> u8 {
        self.inner.day()
    }

    /// Returns the [`Date`] following this one.
    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.inner.next_day().map(Self::from_inner)
    }

    /// Returns the [`Date`] preceding this one.
    #[must_use]
    pub fn previous_day(self) -> Option<Self> {
        self.inner.previous_day().map(Self::from_inner)
    }

    /// Shifts this [`Date`] by the provided number of days (negative values
    /// shift it backwards).
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn add_days(self, days: i64) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(days))
            .map(Self::from_inner)
    }

    /// Returns the number of days from this [`Date`] until the `other` one.
    ///
    /// The result is negative if the `other` [`Date`] precedes this one.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.inner - self.inner).whole_days()
    }

    /// Returns the [`YearMonth`] this [`Date`] belongs to.
    #[must_use]
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.inner.year(),
            month: self.inner.month(),
        }
    }

    /// Returns the midnight (UTC) starting this [`Date`].
    #[must_use]
    pub fn midnight(self) -> DateTime {
        self.inner
            .midnight()
            .assume_utc()
            .try_into()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf::from_inner(self.inner)
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> hash::Hash for DateOf<Of> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.format(ISO_DATE).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, ISO_DATE)
            .map(Self::from_inner)
            .map_err(|_| "invalid `Date`, expected `YYYY-MM-DD`")
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(date: time::Date) -> Self {
        Self::from_inner(date)
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from_inner)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
impl<Of: ?Sized> serde::Serialize for DateOf<Of> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de, Of: ?Sized> serde::Deserialize<'de> for DateOf<Of> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Calendar month of a specific year.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct YearMonth {
    /// Year of this [`YearMonth`].
    year: i32,

    /// Month of this [`YearMonth`].
    month: time::Month,
}

impl YearMonth {
    /// Creates a new [`YearMonth`] out of the provided `year` and `month`
    /// (`1..=12`).
    #[must_use]
    pub fn new(year: i32, month: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        // Ensure the whole month is representable.
        let last = time::util::days_in_year_month(year, month);
        time::Date::from_calendar_date(year, month, 1)
            .and(time::Date::from_calendar_date(year, month, last))
            .ok()
            .map(|_| Self { year, month })
    }

    /// Returns the year of this [`YearMonth`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (`1..=12`) of this [`YearMonth`].
    #[must_use]
    pub fn month(&self) -> u8 {
        self.month.into()
    }

    /// Returns the first [`Date`] of this [`YearMonth`].
    #[must_use]
    pub fn first_day(&self) -> Date {
        time::Date::from_calendar_date(self.year, self.month, 1)
            .map(Date::from_inner)
            .unwrap_or_else(|_| unreachable!("checked on creation"))
    }

    /// Returns the last [`Date`] of this [`YearMonth`].
    #[must_use]
    pub fn last_day(&self) -> Date {
        let day = time::util::days_in_year_month(self.year, self.month);
        time::Date::from_calendar_date(self.year, self.month, day)
            .map(Date::from_inner)
            .unwrap_or_else(|_| unreachable!("checked on creation"))
    }

    /// Returns the [`YearMonth`] shifted by the provided number of `months`
    /// (negative values shift it backwards).
    #[must_use]
    pub fn add_months(&self, months: i32) -> Option<Self> {
        let index = self.year.checked_mul(12)?.checked_add(
            i32::from(u8::from(self.month)) - 1 + months,
        )?;
        let year = index.div_euclid(12);
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        Self::new(year, month)
    }

    /// Checks whether the provided [`Date`] belongs to this [`YearMonth`].
    #[must_use]
    pub fn contains<Of: ?Sized>(&self, date: DateOf<Of>) -> bool {
        date.inner.year() == self.year && date.inner.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl FromStr for YearMonth {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ERR: &str = "invalid `YearMonth`, expected `YYYY-MM`";

        let (year, month) = s.split_once('-').ok_or(ERR)?;
        let year = year.parse().map_err(|_| ERR)?;
        let month = month.parse().map_err(|_| ERR)?;
        Self::new(year, month).ok_or(ERR)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, YearMonth};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_iso() {
        let d = date("2024-02-29");
        assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
        assert_eq!(d.to_string(), "2024-02-29");

        assert!("2023-02-29".parse::<Date>().is_err());
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("yesterday".parse::<Date>().is_err());

        assert_eq!(Date::from_ymd(2024, 2, 29), Some(d));
        assert_eq!(Date::from_ymd(2023, 2, 29), None);
    }

    #[test]
    fn shifts_days() {
        assert_eq!(date("2024-12-31").next_day(), Some(date("2025-01-01")));
        assert_eq!(date("2024-03-01").previous_day(), Some(date("2024-02-29")));
        assert_eq!(date("2024-01-01").add_days(30), Some(date("2024-01-31")));
        assert_eq!(date("2024-01-31").add_days(-30), Some(date("2024-01-01")));
        assert_eq!(date("2024-01-01").days_until(date("2024-03-01")), 60);
        assert_eq!(date("2024-03-01").days_until(date("2024-01-01")), -60);
    }

    #[test]
    fn year_month_bounds() {
        let m = date("2024-02-10").year_month();
        assert_eq!(m.to_string(), "2024-02");
        assert_eq!(m.first_day(), date("2024-02-01"));
        assert_eq!(m.last_day(), date("2024-02-29"));
        assert!(m.contains(date("2024-02-29")));
        assert!(!m.contains(date("2024-03-01")));
        assert!(!m.contains(date("2023-02-10")));
    }

    #[test]
    fn year_month_arithmetic() {
        let m: YearMonth = "2024-11".parse().unwrap();
        assert_eq!(m.add_months(1).unwrap().to_string(), "2024-12");
        assert_eq!(m.add_months(2).unwrap().to_string(), "2025-01");
        assert_eq!(m.add_months(-11).unwrap().to_string(), "2023-12");
        assert_eq!(m.add_months(-23).unwrap().to_string(), "2022-12");
        assert_eq!(m.add_months(0), Some(m));

        assert!("2024-00".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
    }
}
