//! Background [`Task`]s definitions.

mod background;
pub mod rotate_bin_duty;

pub use common::Handler as Task;

pub use self::{background::Background, rotate_bin_duty::RotateBinDuty};
