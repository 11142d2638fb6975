//! Bistro Core - Shared domain types.
//!
//! This crate provides common types used across all Bistro components:
//! - `server` - The HTTP ordering API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, statuses, role
//!   groups, and validated text fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
