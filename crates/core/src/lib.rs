//! Matchday Core - Shared types library.
//!
//! This crate provides common types used across all Matchday components:
//! - `shop` - Public-facing shop server (catalog, cart, checkout, wallet)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, roles,
//!   statuses, and wallet reference IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
