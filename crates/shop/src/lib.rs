//! Matchday shop library.
//!
//! The shop server as a library, so handlers and services can be tested and
//! reused by the CLI and integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
