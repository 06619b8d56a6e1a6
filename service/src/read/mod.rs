//! Read entities definitions.

pub mod duty;
pub mod tenancy;
