//! The engine public API.
//!
//! Each API struct is a thin, stateless wrapper around a backend `B` that implements the traits
//! in [`crate::traits`]. The APIs own all request-level validation — actor identity checks,
//! legal-edge dispatch, input validation — and leave storage atomicity to the backend.
pub mod analytics_api;
pub mod chat_api;
pub mod chat_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod product_api;
pub mod profile_api;
