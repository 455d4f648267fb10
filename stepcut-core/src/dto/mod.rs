//! Data Transfer Objects
//!
//! Request and response bodies exchanged with the conversion service.

pub mod job;
pub mod payload;
pub mod vendor;
