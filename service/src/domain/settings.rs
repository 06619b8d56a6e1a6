//! System settings definitions.
//!
//! A flat key-value store administered by the staff side of the system; the
//! rotation engine only reads from it.

use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Key of a system setting.
#[derive(AsRef, Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Key(&'static str);

impl Key {
    /// Penalty amount charged for a missed bin duty, as a decimal number.
    pub const BIN_DUTY_CHARGE_AMOUNT: Self = Self("bin_duty_charge_amount");
}

/// Value of a system setting.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Value(String);
