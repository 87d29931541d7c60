//! Domain layer for the Clinic Manager backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs for every tenant-owned record
//! - Business rules (plan limits, appointment transitions, report windows)

pub mod models;
pub mod services;
