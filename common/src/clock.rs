//! [`Clock`] abstractions.

use std::{sync::Mutex, time::Duration};

use crate::{Date, DateTime};

/// Source of the current date and time.
pub trait Clock {
    /// Returns the current [`DateTime`].
    fn now(&self) -> DateTime;

    /// Returns the current calendar [`Date`].
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// [`Clock`] reading the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        DateTime::now()
    }
}

/// [`Clock`] frozen at a specific [`DateTime`], unless advanced manually.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime>);

impl FixedClock {
    /// Creates a new [`FixedClock`] frozen at the provided [`DateTime`].
    #[must_use]
    pub fn new(now: DateTime) -> Self {
        Self(Mutex::new(now))
    }

    /// Creates a new [`FixedClock`] frozen at the midnight of the provided
    /// [`Date`].
    #[must_use]
    pub fn at(today: Date) -> Self {
        Self::new(today.midnight())
    }

    /// Moves this [`FixedClock`] to the midnight of the provided [`Date`].
    pub fn set(&self, today: Date) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = today.midnight();
    }

    /// Advances this [`FixedClock`] by the provided [`Duration`].
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Clock as _, FixedClock};
    use crate::Date;

    #[test]
    fn fixed_clock_moves_only_on_demand() {
        let d: Date = "2024-01-31".parse().unwrap();
        let clock = FixedClock::at(d);
        assert_eq!(clock.today(), d);

        clock.advance(Duration::from_secs(24 * 60 * 60));
        assert_eq!(clock.today().to_string(), "2024-02-01");

        clock.set(d);
        assert_eq!(clock.today(), d);
    }
}
