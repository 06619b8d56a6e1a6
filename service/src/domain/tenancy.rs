//! [`Tenancy`] definitions.

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{lodger, room};
#[cfg(doc)]
use crate::domain::Room;

/// Occupancy of a [`Room`] by a lodger.
///
/// Only a [`Status::Active`] [`Tenancy`] makes its lodger eligible to hold
/// bin duty.
#[derive(Clone, Debug)]
pub struct Tenancy {
    /// ID of this [`Tenancy`].
    pub id: Id,

    /// ID of the occupied [`Room`].
    pub room_id: room::Id,

    /// ID of the occupying lodger.
    pub lodger_id: lodger::Id,

    /// [`Status`] of this [`Tenancy`].
    pub status: Status,

    /// [`DateTime`] when this [`Tenancy`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Tenancy`].
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
    #[doc = "Status of a [`Tenancy`]."]
    enum Status {
        #[doc = "The lodger currently occupies the room."]
        Active = 1,

        #[doc = "The tenancy has ended."]
        Ended = 2,
    }
}

/// [`DateTime`] when a [`Tenancy`] was created.
pub type CreationDateTime = DateTimeOf<(Tenancy, unit::Creation)>;
