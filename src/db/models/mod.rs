//! Database models.

pub mod organization;

pub use organization::*;
