//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a rotation period start.
#[derive(Clone, Copy, Debug)]
pub struct Period;

/// Marker type describing a duty day.
#[derive(Clone, Copy, Debug)]
pub struct Duty;

/// Marker type describing a message sending.
#[derive(Clone, Copy, Debug)]
pub struct Sending;
