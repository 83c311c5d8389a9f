//! Craft Market Engine
//!
//! The Craft Market Engine contains the core logic of the marketplace backend: the direct-order
//! lifecycle state machine, the buyer–artisan conversation and messaging model, and the read-only
//! revenue analytics that share the order records. It is provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You
//!    should never need to access the database directly. Instead, use the public API provided by
//!    the engine. The exception is the data types used in the database, which are defined in the
//!    [`db_types`] module and are public.
//! 2. The engine public API ([`mod@cme_api`]). This provides the public-facing functionality of
//!    the engine: order flow, chat, analytics and the small product/profile surfaces the core
//!    needs. Backends implement the traits in the [`traits`] module in order to drive these APIs.
pub mod cme_api;
pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use cme_api::{
    analytics_api::AnalyticsApi,
    chat_api::ChatApi,
    chat_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    product_api::ProductApi,
    profile_api::ProfileApi,
};
