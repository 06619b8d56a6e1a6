//! Bin duty rotation [`Assignment`] definitions.

use std::time::Duration;

use common::{define_kind, unit, DateTime, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{lodger, property, room, Room};
#[cfg(doc)]
use crate::domain::Property;

/// Duration of a single rotation period.
///
/// Each [`Room`] holds bin duty for one week.
pub const PERIOD: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Weekly bin duty [`Assignment`] of a [`Room`] within a [`Property`].
///
/// At most one [`Assignment`] exists per `(property, period start)` pair;
/// assignments are never deleted and form the rotation audit trail.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// ID of this [`Assignment`].
    pub id: Id,

    /// ID of the [`Property`] this [`Assignment`] belongs to.
    pub property_id: property::Id,

    /// ID of the [`Room`] holding bin duty.
    pub room_id: room::Id,

    /// ID of the lodger occupying the assigned [`Room`], if it's occupied.
    pub lodger_id: Option<lodger::Id>,

    /// [`PeriodStart`] of this [`Assignment`].
    pub period_start: PeriodStart,

    /// [`Status`] of this [`Assignment`].
    pub status: Status,

    /// [`DateTime`] when this [`Assignment`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Assignment`].
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
    #[doc = "Status of an [`Assignment`]."]
    enum Status {
        #[doc = "The duty is assigned and pending."]
        Assigned = 1,

        #[doc = "The duty was carried out."]
        Completed = 2,

        #[doc = "The duty elapsed without being carried out."]
        Missed = 3,
    }
}

/// [`DateTime`] a rotation period of an [`Assignment`] starts at.
///
/// Always normalized to midnight UTC.
pub type PeriodStart = DateTimeOf<(Assignment, unit::Period)>;

/// [`DateTime`] when an [`Assignment`] was created.
pub type CreationDateTime = DateTimeOf<(Assignment, unit::Creation)>;

/// Returns the index of the [`Room`] holding bin duty next, given the
/// `prior` assigned [`Room`], if any.
///
/// The index is recomputed against the current `rooms` list on every run, so
/// rooms added or removed since the prior assignment are tolerated: a prior
/// [`Room`] no longer present falls back to index `0`.
///
/// [`None`] is returned only when `rooms` is empty.
#[must_use]
pub fn next_room_index(
    rooms: &[Room],
    prior: Option<room::Id>,
) -> Option<usize> {
    if rooms.is_empty() {
        return None;
    }
    Some(
        prior
            .and_then(|id| rooms.iter().position(|r| r.id == id))
            .map_or(0, |i| (i + 1) % rooms.len()),
    )
}

/// Returns the [`PeriodStart`] for a [`Property`] having no prior
/// [`Assignment`].
///
/// Targets the next occurrence of the [`Property`]'s bin collection day on
/// or after `today`, or `today` itself when no collection day is configured.
#[must_use]
pub fn first_period_start(
    collection_day: Option<property::CollectionDay>,
    today: DateTime,
) -> PeriodStart {
    let today = today.start_of_day();
    collection_day
        .map_or(today, |day| today.next_occurrence(day.weekday()))
        .coerce()
}
