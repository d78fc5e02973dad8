//! Crewdesk API server library.
//!
//! Exposes the server internals as a library so the CLI can reuse the
//! configuration, database and auth layers, and so integration tests
//! can build routers without spawning the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
