use cm_common::{GeoPoint, Money};
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    traits::{ProductApiError, ProfileApiError},
};

/// Storage contract for the order lifecycle.
///
/// The engine's [`OrderFlowApi`](crate::OrderFlowApi) performs all validation (ownership, legal
/// edges, preconditions) and then calls one of the transition methods below with the `version`
/// token it read. Backends must apply transitions as a compare-and-swap on `(order_id, version)`:
/// if the token is stale the transition fails with
/// [`OrderApiError::ConcurrentModification`] rather than overwriting a racing write.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order with status `Open` and a delivery estimate a week out, atomically.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError>;

    /// All orders placed by the given buyer, most recent first.
    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderApiError>;

    /// All orders against the given artisan's products, most recent first.
    async fn fetch_orders_for_artisan(&self, artisan_id: i64) -> Result<Vec<Order>, OrderApiError>;

    /// Transition to `Approved`, snapshotting the artisan's coordinates into the order.
    async fn approve_order(&self, order_id: i64, version: i64, location: GeoPoint) -> Result<Order, OrderApiError>;

    /// Plain status overwrite (used for `Rejected`). Still a CAS on the version token.
    async fn update_order_status(
        &self,
        order_id: i64,
        version: i64,
        status: OrderStatusType,
    ) -> Result<Order, OrderApiError>;

    /// Transition to `Delivered` and, in the same transaction, add `revenue` to the artisan's
    /// cumulative total via an atomic in-place increment.
    async fn deliver_order(
        &self,
        order_id: i64,
        version: i64,
        artisan_id: i64,
        revenue: Money,
    ) -> Result<Order, OrderApiError>;

    /// Transition to `Cancelled`, storing the buyer's cancellation message.
    async fn cancel_order(&self, order_id: i64, version: i64, message: &str) -> Result<Order, OrderApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
    #[error("Order quantity must be a positive integer")]
    InvalidQuantity,
    #[error("Only the artisan who owns the product may manage this order")]
    NotProductOwner,
    #[error("Only the buyer who placed the order may cancel it")]
    NotOrderBuyer,
    #[error("Artisan location not set. Please set your location first.")]
    ArtisanLocationNotSet,
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The order was modified concurrently. Fetch it again and retry.")]
    ConcurrentModification,
    #[error("{0}")]
    ProductError(#[from] ProductApiError),
    #[error("{0}")]
    ProfileError(#[from] ProfileApiError),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}
