//! # Craft Market server
//!
//! This crate hosts the HTTP boundary of the marketplace. It is a thin request/response mapping
//! over the engine APIs: handlers extract the acting user, call into the engine, and serialize
//! the result or map the engine error onto a status code.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Identity
//! Authentication is handled upstream; requests arrive with `cm-user-id` and `cm-user-role`
//! headers already established. See [auth](auth/index.html).
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
