//! [`Command`] definition.

pub mod advance_rotation;
pub mod resolve_elapsed_duties;
pub mod send_duty_reminders;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    advance_rotation::AdvanceRotation,
    resolve_elapsed_duties::ResolveElapsedDuties,
    send_duty_reminders::SendDutyReminders,
};
