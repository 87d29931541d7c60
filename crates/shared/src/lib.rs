//! Shared utilities and common types for the Clinic Manager backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing, webhook signature verification)
//! - JWT session tokens
//! - Password hashing with Argon2id
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
