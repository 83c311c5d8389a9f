//! # Database management and control.
//!
//! This module defines the interface contracts that engine database *backends* must fulfil, one
//! trait per concern:
//!
//! * [`OrderManagement`] — order storage plus the compare-and-swap transition primitives the
//!   order lifecycle state machine is built on.
//! * [`MessageManagement`] — conversations, per-participant read pointers and message storage.
//! * [`ProductCatalog`] — the minimal product surface the core reads (owner, price, unit) plus
//!   transactional review recording.
//! * [`ProfileManagement`] — user records and profile coordinates.
//! * [`ShopAnalytics`] — the read-only revenue aggregations.
//!
//! Each trait carries its own error enum. Every enum has a `DatabaseError` variant that backend
//! failures collapse into; the remaining variants express the request-level failure taxonomy
//! (missing entity, forbidden actor, invalid input, state conflict) that the HTTP boundary maps
//! onto status codes.
mod analytics;
mod data_objects;
mod message_management;
mod order_management;
mod product_catalog;
mod profile_management;

pub use analytics::{AnalyticsApiError, ShopAnalytics};
pub use data_objects::{ConversationEntry, ProductSales, RevenueBucket};
pub use message_management::{ChatApiError, MessageManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use product_catalog::{ProductApiError, ProductCatalog};
pub use profile_management::{ProfileApiError, ProfileManagement};
