use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    cme_api::order_objects::{OrderSummary, ProductRef, TrackingEvent, TrackingInfo},
    db_types::{NewOrder, Order, OrderStatusType},
    traits::{OrderApiError, OrderManagement, ProductCatalog, ProfileManagement},
};

/// How far back the synthesized "Confirmed & Processing" tracking event is placed for a
/// delivered order.
const CONFIRMED_EVENT_BACKDATE_HOURS: i64 = 24;

/// `OrderFlowApi` is the primary API for the direct-order lifecycle: creation, the artisan's
/// approve/reject/deliver decisions, buyer cancellation, and the derived tracking and summary
/// views.
///
/// The state machine it enforces:
///
/// | From \ To | Approved | Rejected | Delivered | Cancelled |
/// |-----------|----------|----------|-----------|-----------|
/// | Open      | ok       | ok       | Conflict  | ok        |
/// | Approved  | Conflict | Conflict | ok        | ok        |
///
/// Any transition out of `Delivered`, `Cancelled`, `Rejected` (or the dormant `Processing` /
/// `Completed` statuses) is a conflict. Every transition is applied as a compare-and-swap on
/// the order's version token, so two racing transitions cannot both win.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    /// Creates a new direct order in `Open` status with a delivery estimate a week out.
    ///
    /// The product must exist; the quantity must be positive. The insert runs in its own
    /// transaction.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        if order.quantity <= 0 {
            return Err(OrderApiError::InvalidQuantity);
        }
        let product = self
            .db
            .fetch_product(order.product_id)
            .await?
            .ok_or(OrderApiError::ProductNotFound(order.product_id))?;
        let order = self.db.insert_order(order).await?;
        debug!("📦️ Order #{} placed: {} x product #{} by buyer #{}", order.id, order.quantity, product.id, order.buyer_id);
        Ok(order)
    }

    /// The artisan accepts an order.
    ///
    /// The acting user must own the referenced product and must have profile coordinates set;
    /// the coordinates are snapshotted into the order so later profile moves do not affect it.
    pub async fn approve_order(&self, order_id: i64, artisan_id: i64) -> Result<Order, OrderApiError> {
        let (order, _) = self.owned_order(order_id, artisan_id).await?;
        // The location precondition is reported ahead of the state check: a mapless artisan gets
        // the same answer whatever the order looks like.
        let artisan = self.db.fetch_user(artisan_id).await?.ok_or(OrderApiError::UserNotFound(artisan_id))?;
        let location = artisan.location().ok_or(OrderApiError::ArtisanLocationNotSet)?;
        ensure_edge(order.status, OrderStatusType::Approved)?;
        let order = self.db.approve_order(order.id, order.version, location).await?;
        debug!("📦️ Order #{} approved by artisan #{artisan_id} at {location}", order.id);
        Ok(order)
    }

    /// The artisan declines an order. No stock restoration is modelled.
    pub async fn reject_order(&self, order_id: i64, artisan_id: i64) -> Result<Order, OrderApiError> {
        let (order, _) = self.owned_order(order_id, artisan_id).await?;
        ensure_edge(order.status, OrderStatusType::Rejected)?;
        let order = self.db.update_order_status(order.id, order.version, OrderStatusType::Rejected).await?;
        debug!("📦️ Order #{} rejected by artisan #{artisan_id}", order.id);
        Ok(order)
    }

    /// The artisan hands the order over.
    ///
    /// Only valid from `Approved`. Sets the actual delivery instant and credits the artisan's
    /// cumulative revenue with `quantity × price_per_kg`, priced from the product's *current*
    /// price, in the same transaction as the status change.
    pub async fn deliver_order(&self, order_id: i64, artisan_id: i64) -> Result<Order, OrderApiError> {
        let (order, product) = self.owned_order(order_id, artisan_id).await?;
        ensure_edge(order.status, OrderStatusType::Delivered)?;
        let revenue = product.price_per_kg * order.quantity;
        let order = self.db.deliver_order(order.id, order.version, product.artisan_id, revenue).await?;
        debug!("📦️ Order #{} delivered. Artisan #{artisan_id} credited with {revenue}", order.id);
        Ok(order)
    }

    /// The buyer withdraws an order.
    ///
    /// An order already in a terminal status is a conflict for any caller; otherwise only the
    /// buyer who placed the order may cancel, and only from `Open` or `Approved`. The message
    /// defaults to "Cancelled by buyer.".
    pub async fn cancel_order(
        &self,
        order_id: i64,
        buyer_id: i64,
        message: Option<String>,
    ) -> Result<Order, OrderApiError> {
        let order = self.fetch_order(order_id).await?;
        if order.status.is_terminal() {
            return Err(OrderApiError::InvalidTransition { from: order.status, to: OrderStatusType::Cancelled });
        }
        if order.buyer_id != buyer_id {
            warn!("📦️ User #{buyer_id} tried to cancel order #{order_id} they did not place");
            return Err(OrderApiError::NotOrderBuyer);
        }
        ensure_edge(order.status, OrderStatusType::Cancelled)?;
        let message = message.unwrap_or_else(|| "Cancelled by buyer.".to_string());
        let order = self.db.cancel_order(order.id, order.version, &message).await?;
        debug!("📦️ Order #{} cancelled by buyer #{buyer_id}", order.id);
        Ok(order)
    }

    /// The buyer-facing tracking view: an ordered list of lifecycle events derived from the
    /// order status on every read.
    pub async fn track_order(&self, order_id: i64) -> Result<TrackingInfo, OrderApiError> {
        let order = self.fetch_order(order_id).await?;
        let product = self
            .db
            .fetch_product(order.product_id)
            .await?
            .ok_or(OrderApiError::ProductNotFound(order.product_id))?;
        let mut events = vec![TrackingEvent::new("Order Placed", order.created_at)];
        match order.status {
            OrderStatusType::Completed => {
                events.push(TrackingEvent::new("Order Confirmed & Processing", Utc::now()));
            },
            OrderStatusType::Delivered => {
                let confirmed_at = order.updated_at - Duration::hours(CONFIRMED_EVENT_BACKDATE_HOURS);
                events.push(TrackingEvent::new("Order Confirmed & Processing", confirmed_at));
                events.push(TrackingEvent::new("Delivered", order.delivery_date));
            },
            _ => {},
        }
        events.sort_by_key(|e| e.timestamp);
        Ok(TrackingInfo {
            order_id: order.id,
            product_name: product.name,
            status: order.status,
            estimated_delivery: order.delivery_date,
            events,
        })
    }

    /// The buyer-facing summary used for map rendering: status, the resolved artisan location
    /// (approval snapshot if present, live profile coordinates otherwise) and minimal product
    /// identity.
    pub async fn order_summary(&self, order_id: i64) -> Result<OrderSummary, OrderApiError> {
        let order = self.fetch_order(order_id).await?;
        let product = self
            .db
            .fetch_product(order.product_id)
            .await?
            .ok_or(OrderApiError::ProductNotFound(order.product_id))?;
        let artisan_location = match order.artisan_location() {
            Some(snapshot) => Some(snapshot),
            None => self.db.fetch_user(product.artisan_id).await?.and_then(|artisan| artisan.location()),
        };
        Ok(OrderSummary {
            order_id: order.id,
            status: order.status,
            artisan_location,
            product: ProductRef { id: product.id, name: product.name },
        })
    }

    /// All orders placed by the buyer, most recent first.
    pub async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderApiError> {
        self.db.fetch_orders_for_buyer(buyer_id).await
    }

    /// All orders placed against the artisan's products, most recent first.
    pub async fn orders_for_artisan(&self, artisan_id: i64) -> Result<Vec<Order>, OrderApiError> {
        self.db.fetch_orders_for_artisan(artisan_id).await
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, OrderApiError> {
        self.db.fetch_order(order_id).await?.ok_or(OrderApiError::OrderNotFound(order_id))
    }

    /// Fetches the order and its product, and verifies the acting artisan owns the product.
    async fn owned_order(&self, order_id: i64, artisan_id: i64) -> Result<(Order, crate::db_types::Product), OrderApiError> {
        let order = self.fetch_order(order_id).await?;
        let product = self
            .db
            .fetch_product(order.product_id)
            .await?
            .ok_or(OrderApiError::ProductNotFound(order.product_id))?;
        if product.artisan_id != artisan_id {
            warn!("📦️ User #{artisan_id} tried to manage order #{order_id} on product they do not own");
            return Err(OrderApiError::NotProductOwner);
        }
        Ok((order, product))
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn ensure_edge(from: OrderStatusType, to: OrderStatusType) -> Result<(), OrderApiError> {
    if from.permits(to) {
        Ok(())
    } else {
        Err(OrderApiError::InvalidTransition { from, to })
    }
}
