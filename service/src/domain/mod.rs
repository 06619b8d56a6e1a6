//! Domain definitions.

pub mod charge;
pub mod duty;
pub mod lodger;
pub mod notification;
pub mod property;
pub mod room;
pub mod rotation;
pub mod settings;
pub mod tenancy;

pub use self::{
    charge::Charge, notification::Notification, property::Property,
    room::Room, tenancy::Tenancy,
};
