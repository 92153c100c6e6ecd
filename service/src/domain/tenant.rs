//! [`Tenant`] definitions.

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

use super::{define_id, define_text, impl_audited, Audit};
#[cfg(doc)]
use super::Contract;

/// Person or company renting units under [`Contract`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tenant {
    /// ID of this [`Tenant`].
    pub id: Id,

    /// [`Name`] of this [`Tenant`].
    pub name: Name,

    /// Identity [`Document`] of this [`Tenant`], if provided.
    pub document: Option<Document>,

    /// [`Email`] of this [`Tenant`], if provided.
    pub email: Option<Email>,

    /// [`Phone`] of this [`Tenant`], if provided.
    pub phone: Option<Phone>,

    /// [`Audit`] of this [`Tenant`].
    pub audit: Audit<Tenant>,
}

impl_audited!(Tenant);

define_id! {
    /// ID of a [`Tenant`].
    Id
}

define_text! {
    /// Full name of a [`Tenant`].
    Name, max = 512
}

define_text! {
    /// Identity document number of a [`Tenant`] (passport, tax ID, etc).
    Document, max = 64
}

/// Email address of a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{5,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Email, Name, Phone};

    #[test]
    fn email() {
        assert!(Email::new("jane@example.com").is_some());
        assert!(Email::new("j.doe+box@mail.example.org").is_some());

        assert!(Email::new("jane@localhost").is_none());
        assert!(Email::new("jane example@mail.com").is_none());
        assert!(Email::new("@example.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn phone() {
        assert!(Phone::new("+34 600 123 456").is_some());
        assert!(Phone::new("600-123-456").is_some());
        assert!(Phone::new("912345678").is_some());

        assert!(Phone::new("12345").is_none());
        assert!(Phone::new("call me").is_none());
        assert!(Phone::new("+34 600 123 456 ").is_none());
    }

    #[test]
    fn name() {
        assert!(Name::new("Jane Doe").is_some());
        assert!(Name::new(" Jane").is_none());
        assert!(Name::new("").is_none());
        assert!("x".repeat(513).parse::<Name>().is_err());
    }
}
