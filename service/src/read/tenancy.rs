//! [`Tenancy`] read model definition.

#[cfg(doc)]
use crate::domain::{tenancy::Status, Tenancy};

/// Wrapper around a [`Tenancy`] indicating that it's [`Status::Active`].
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);
