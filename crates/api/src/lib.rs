//! HTTP API for the clinic manager: tenant CRUD, scheduling, billing and
//! reports over a Postgres store.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
