//! HTTP route handlers.

pub mod appointments;
pub mod attendance;
pub mod auth;
pub mod goals;
pub mod health;
pub mod notes;
pub mod patients;
pub mod payments;
pub mod professionals;
pub mod reports;
pub mod seo;
pub mod subscription;
pub mod todos;
pub mod webhooks;
