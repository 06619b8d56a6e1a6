//! Penalty [`Charge`] definitions.

use common::{define_kind, unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{lodger, property};
#[cfg(doc)]
use crate::domain::{duty::LogEntry, Property};

/// Extra charge raised against a lodger.
///
/// The rotation engine only ever creates [`Kind::BinDutyMissed`] charges in
/// [`Status::Pending`] state; settling them is owned by the billing side of
/// the system.
#[derive(Clone, Debug)]
pub struct Charge {
    /// ID of this [`Charge`].
    pub id: Id,

    /// ID of the charged lodger.
    pub lodger_id: lodger::Id,

    /// ID of the [`Property`] the charge originates from.
    pub property_id: property::Id,

    /// [`Kind`] of this [`Charge`].
    pub kind: Kind,

    /// Charged [`Money`] amount.
    pub amount: Money,

    /// [`Status`] of this [`Charge`].
    pub status: Status,

    /// [`DateTime`] when this [`Charge`] was raised.
    pub charged_on: CreationDateTime,

    /// Human-readable [`Description`] of this [`Charge`].
    pub description: Description,
}

/// ID of a [`Charge`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Charge`]."]
    enum Kind {
        #[doc = "Penalty for a missed bin duty."]
        BinDutyMissed = 1,
    }
}

define_kind! {
    #[doc = "Status of a [`Charge`]."]
    enum Status {
        #[doc = "The charge awaits payment."]
        Pending = 1,

        #[doc = "The charge has been paid."]
        Paid = 2,
    }
}

/// Human-readable description of a [`Charge`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}

/// [`DateTime`] when a [`Charge`] was raised.
pub type CreationDateTime = DateTimeOf<(Charge, unit::Creation)>;
