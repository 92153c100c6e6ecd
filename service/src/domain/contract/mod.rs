//! [`Contract`] definitions.

pub mod period;

use common::{define_kind, Date, Money};
use derive_more::{Display, Error};

use super::{define_id, impl_audited, tenant, unit, Audit};
#[cfg(doc)]
use super::{Tenant, Unit};

pub use self::period::{InvalidPeriod, Period};

/// Rental agreement binding a [`Unit`] to a [`Tenant`] for a [`Period`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the rented [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the [`Tenant`] renting the [`Unit`].
    pub tenant_id: tenant::Id,

    /// [`Period`] this [`Contract`] spans.
    pub period: Period,

    /// Monthly price, frozen at signing.
    pub price: Money,

    /// Deposit to be paid by the [`Tenant`], if any.
    pub deposit: Option<Money>,

    /// Indicator whether the deposit has been paid.
    pub deposit_paid: bool,

    /// Stored [`Status`] of this [`Contract`].
    ///
    /// Only a hint (except [`Status::Cancelled`], which is authoritative),
    /// use [`Contract::status_on()`] instead.
    pub status: Status,

    /// [`Audit`] of this [`Contract`].
    pub audit: Audit<Contract>,
}

impl_audited!(Contract);

impl Contract {
    /// Computes the effective [`Status`] of this [`Contract`] on the provided
    /// [`Date`].
    #[must_use]
    pub fn status_on(&self, date: Date) -> Status {
        Status::compute(self.status, &self.period, date)
    }

    /// Indicates whether this [`Contract`] is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == Status::Cancelled
    }

    /// Indicates whether this [`Contract`] is [`Status::Active`] on the
    /// provided [`Date`].
    #[must_use]
    pub fn is_active_on(&self, date: Date) -> bool {
        self.status_on(date) == Status::Active
    }

    /// Indicates whether this [`Contract`] has a deposit which is not paid
    /// yet.
    #[must_use]
    pub fn has_unpaid_deposit(&self) -> bool {
        self.deposit.is_some() && !self.deposit_paid
    }

    /// Indicates whether this [`Contract`] is [`Status::Active`] on the
    /// provided `today` and ends within the provided number of `days` from
    /// it (inclusive).
    #[must_use]
    pub fn expires_within(&self, today: Date, days: u16) -> bool {
        self.is_active_on(today)
            && self
                .period
                .end()
                .is_some_and(|end| today.days_until(end) <= i64::from(days))
    }

    /// Cancels this [`Contract`].
    ///
    /// # Errors
    ///
    /// If this [`Contract`] is cancelled already.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        if self.is_cancelled() {
            return Err(TransitionError::AlreadyCancelled);
        }
        self.status = Status::Cancelled;
        Ok(())
    }

    /// Terminates this [`Contract`] early, making the provided `today` its
    /// last day.
    ///
    /// Only ever shortens the [`Period`].
    ///
    /// # Errors
    ///
    /// If this [`Contract`] is cancelled or finished already, or it hasn't
    /// started by `today`.
    pub fn finalize_early(
        &mut self,
        today: Date,
    ) -> Result<(), TransitionError> {
        match self.status_on(today) {
            Status::Cancelled => return Err(TransitionError::AlreadyCancelled),
            Status::Finished => return Err(TransitionError::AlreadyFinished),
            Status::Active | Status::Pending => {}
        }
        self.period = self
            .period
            .with_end(Some(today))
            .map_err(TransitionError::NotStarted)?;
        self.refresh_status(today);
        Ok(())
    }

    /// Refreshes the stored [`Status`] of this [`Contract`] with the one
    /// computed on the provided [`Date`].
    pub fn refresh_status(&mut self, today: Date) {
        self.status = self.status_on(today);
    }
}

define_id! {
    /// ID of a [`Contract`].
    Id
}

define_kind! {
    #[doc = "Status of a [`Contract`]."]
    enum Status {
        #[doc = "[`Contract`] is in force."]
        Active = 1,

        #[doc = "[`Contract`] has ended."]
        Finished = 2,

        #[doc = "[`Contract`] was cancelled."]
        Cancelled = 3,

        #[doc = "[`Contract`] hasn't started yet."]
        Pending = 4,
    }
}

impl Status {
    /// Derives the effective [`Status`] of a [`Contract`] out of its `stored`
    /// [`Status`] and [`Period`] on the provided [`Date`].
    ///
    /// [`Status::Cancelled`] is absorbing, other stored values are ignored.
    #[must_use]
    pub fn compute(stored: Self, period: &Period, on: Date) -> Self {
        if stored == Self::Cancelled {
            Self::Cancelled
        } else if on < period.start() {
            Self::Pending
        } else if period.end().is_some_and(|end| on > end) {
            Self::Finished
        } else {
            Self::Active
        }
    }
}

/// Error of a [`Contract`] [`Status`] transition.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum TransitionError {
    /// [`Contract`] is cancelled already.
    #[display("`Contract` is cancelled already")]
    AlreadyCancelled,

    /// [`Contract`] has ended already.
    #[display("`Contract` has ended already")]
    AlreadyFinished,

    /// [`Contract`] hasn't started yet, so cannot be finalized.
    #[display("`Contract` hasn't started yet: {_0}")]
    NotStarted(InvalidPeriod),
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};
    use strum::IntoEnumIterator as _;

    use crate::domain::{tenant, unit, Audit};

    use super::{Contract, Id, Period, Status, TransitionError};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn contract(start: &str, end: Option<&str>) -> Contract {
        Contract {
            id: Id::new(),
            unit_id: unit::Id::new(),
            tenant_id: tenant::Id::new(),
            period: Period::new(date(start), end.map(date)).unwrap(),
            price: "100".parse::<Money>().unwrap(),
            deposit: None,
            deposit_paid: false,
            status: Status::Pending,
            audit: Audit::new(DateTime::UNIX_EPOCH, None),
        }
    }

    #[test]
    fn computes_status_from_dates() {
        let c = contract("2024-01-01", Some("2024-12-31"));

        assert_eq!(c.status_on(date("2023-12-31")), Status::Pending);
        assert_eq!(c.status_on(date("2024-01-01")), Status::Active);
        assert_eq!(c.status_on(date("2024-12-31")), Status::Active);
        assert_eq!(c.status_on(date("2025-01-01")), Status::Finished);

        let open = contract("2024-01-01", None);
        assert_eq!(open.status_on(date("2099-01-01")), Status::Active);
    }

    #[test]
    fn stored_hint_is_ignored_unless_cancelled() {
        let period = Period::new(date("2024-01-01"), None).unwrap();
        for stored in Status::iter().filter(|s| *s != Status::Cancelled) {
            assert_eq!(
                Status::compute(stored, &period, date("2024-06-01")),
                Status::Active,
            );
        }
    }

    #[test]
    fn status_is_stored_by_discriminant() {
        for s in Status::iter() {
            assert_eq!(Status::from_u8(s.u8()), Some(s));
        }
        assert_eq!(Status::from_u8(0), None);
        assert_eq!(Status::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn cancelled_is_sticky() {
        let mut c = contract("2024-01-01", Some("2024-12-31"));
        c.cancel().unwrap();

        for on in ["2023-01-01", "2024-06-01", "2030-01-01"] {
            assert_eq!(c.status_on(date(on)), Status::Cancelled);
        }
        assert!(matches!(c.cancel(), Err(TransitionError::AlreadyCancelled)));
        assert!(matches!(
            c.finalize_early(date("2024-06-01")),
            Err(TransitionError::AlreadyCancelled),
        ));
    }

    #[test]
    fn finalize_early_ends_today() {
        let mut c = contract("2024-01-01", None);
        c.finalize_early(date("2024-06-15")).unwrap();

        assert_eq!(c.period.end(), Some(date("2024-06-15")));
        assert_eq!(c.status, Status::Active);
        assert_eq!(c.status_on(date("2024-06-15")), Status::Active);
        assert_eq!(c.status_on(date("2024-06-16")), Status::Finished);
    }

    #[test]
    fn finalize_early_never_extends() {
        let mut c = contract("2024-01-01", Some("2024-01-31"));

        assert!(matches!(
            c.finalize_early(date("2024-03-15")),
            Err(TransitionError::AlreadyFinished),
        ));
        assert_eq!(c.period.end(), Some(date("2024-01-31")));

        c.finalize_early(date("2024-01-31")).unwrap();
        assert_eq!(c.period.end(), Some(date("2024-01-31")));
    }

    #[test]
    fn finalize_early_rejects_pending() {
        let mut c = contract("2024-07-01", None);
        assert!(matches!(
            c.finalize_early(date("2024-06-15")),
            Err(TransitionError::NotStarted(_)),
        ));
        assert_eq!(c.period.end(), None);
    }

    #[test]
    fn expires_within_days() {
        let c = contract("2024-01-01", Some("2024-06-30"));

        assert!(c.expires_within(date("2024-06-01"), 30));
        assert!(c.expires_within(date("2024-06-30"), 0));
        assert!(!c.expires_within(date("2024-05-30"), 30));
        assert!(!c.expires_within(date("2024-07-01"), 30));
        let open = contract("2024-01-01", None);
        assert!(!open.expires_within(date("2024-06-01"), 365));
    }
}
