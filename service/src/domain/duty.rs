//! Bin duty [`LogEntry`] definitions.

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{charge, lodger, property, room};
#[cfg(doc)]
use crate::domain::{rotation::Assignment, Charge, Property, Room};

/// Log of a single bin duty of a [`Room`].
///
/// Created alongside the weekly [`Assignment`], dated at the period start,
/// and evaluated on the engine's daily cadence: reminded about the day
/// before its [`Date`], resolved the day after. Entries are never deleted.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// ID of this [`LogEntry`].
    pub id: Id,

    /// ID of the [`Property`] this [`LogEntry`] belongs to.
    pub property_id: property::Id,

    /// ID of the [`Room`] holding the duty.
    pub room_id: room::Id,

    /// ID of the lodger holding the duty, if the [`Room`] is occupied.
    pub lodger_id: Option<lodger::Id>,

    /// [`Date`] the duty falls on.
    pub date: Date,

    /// [`Status`] of this [`LogEntry`].
    pub status: Status,

    /// Indicator whether a reminder notification has been sent for this
    /// [`LogEntry`].
    pub reminder_sent: bool,

    /// Indicator whether a penalty [`Charge`] has been raised for this
    /// [`LogEntry`].
    ///
    /// This flag is the authoritative idempotency guard against double
    /// charging.
    pub charge_applied: bool,

    /// ID of the raised penalty [`Charge`], if any.
    pub charge_id: Option<charge::Id>,

    /// [`DateTime`] when this [`LogEntry`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`LogEntry`].
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
    #[doc = "Status of a [`LogEntry`]."]
    enum Status {
        #[doc = "The duty is assigned and pending."]
        Assigned = 1,

        #[doc = "The duty was carried out."]
        Completed = 2,

        #[doc = "The duty elapsed without being carried out."]
        Missed = 3,
    }
}

/// [`DateTime`] of the day a [`LogEntry`]'s duty falls on.
///
/// Always normalized to midnight UTC.
pub type Date = DateTimeOf<(LogEntry, unit::Duty)>;

/// [`DateTime`] when a [`LogEntry`] was created.
pub type CreationDateTime = DateTimeOf<(LogEntry, unit::Creation)>;
