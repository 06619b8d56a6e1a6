//! Bin duty [`LogEntry`] read model definitions.

#[cfg(doc)]
use crate::domain::duty::{LogEntry, Status};

/// Wrapper around a [`LogEntry`] that is still [`Status::Assigned`] and has
/// no reminder sent yet.
#[derive(Clone, Copy, Debug)]
pub struct Unreminded<T>(pub T);

/// Wrapper around a [`LogEntry`] still awaiting resolution: either
/// [`Status::Assigned`], or already [`Status::Missed`] with an occupant and
/// its penalty charge not applied yet (a prior run failed to raise it).
#[derive(Clone, Copy, Debug)]
pub struct Unresolved<T>(pub T);
