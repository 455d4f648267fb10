//! Core domain types
//!
//! These types mirror the entities owned by the conversion service. The client
//! only ever holds read-only snapshots of them.

pub mod job;
pub mod material;
