//! Stepcut Core
//!
//! Core types shared by the STEP-to-DXF service client and CLI.
//!
//! This crate contains:
//! - Domain types: the job snapshot, its status and quote, materials
//! - DTOs: request and response bodies exchanged with the service
//! - Tracker: the monotonic last-known view of a single job

pub mod domain;
pub mod dto;
pub mod tracker;

pub use tracker::JobTracker;
