//! [`Notification`] definitions.

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lodger;

/// Outbound message to a lodger.
///
/// An append-only outbox record: actual delivery is owned by the messaging
/// side of the system.
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the lodger this [`Notification`] is addressed to.
    pub recipient_id: lodger::Id,

    /// [`Title`] of this [`Notification`].
    pub title: Title,

    /// [`Message`] body of this [`Notification`].
    pub message: Message,

    /// [`Priority`] of this [`Notification`].
    pub priority: Priority,

    /// [`DateTime`] when this [`Notification`] was sent.
    pub sent_at: SendingDateTime,
}

/// ID of a [`Notification`].
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

/// Title of a [`Notification`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}

/// Message body of a [`Notification`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Message(String);

impl Message {
    /// Creates a new [`Message`].
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

define_kind! {
    #[doc = "Priority of a [`Notification`]."]
    enum Priority {
        #[doc = "Informational, may be batched."]
        Low = 1,

        #[doc = "Regular delivery."]
        Normal = 2,

        #[doc = "Urgent, delivered immediately."]
        High = 3,
    }
}

/// [`DateTime`] when a [`Notification`] was sent.
pub type SendingDateTime = DateTimeOf<(Notification, unit::Sending)>;
