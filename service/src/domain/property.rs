//! [`Property`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;

#[cfg(doc)]
use common::DateTime;
use common::{datetime::Weekday, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Room;

/// Managed house in multiple occupation.
///
/// Read-only for the rotation engine: properties are administered by the
/// portal side of the system.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Name`] of this [`Property`].
    pub name: Name,

    /// [`Weekday`] refuse bins are collected on at this [`Property`], if
    /// configured.
    pub bin_collection_day: Option<CollectionDay>,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
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

/// Name of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`Weekday`] refuse bins are collected on at a [`Property`].
///
/// Defines which day a rotation period starts on when no prior assignment
/// exists for the [`Property`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct CollectionDay(Weekday);

impl CollectionDay {
    /// Returns the [`Weekday`] of this [`CollectionDay`].
    #[must_use]
    pub fn weekday(self) -> Weekday {
        self.0
    }
}

// Stored as the number of days since Monday, `0..=6`.
#[cfg(feature = "postgres")]
impl FromSql<'_> for CollectionDay {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let days = u8::try_from(i16::from_sql(ty, raw)?)?;
        if days > 6 {
            return Err(format!("invalid `CollectionDay` value: {days}").into());
        }
        Ok(Self(Weekday::Monday.nth_next(days)))
    }
}

#[cfg(feature = "postgres")]
impl ToSql for CollectionDay {
    accepts!(INT2);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        i16::from(self.0.number_days_from_monday()).to_sql(ty, w)
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;
