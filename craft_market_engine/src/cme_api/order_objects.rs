use chrono::{DateTime, Utc};
use cm_common::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::db_types::OrderStatusType;

/// One synthesized lifecycle event in an order's tracking view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn new<S: Into<String>>(status: S, timestamp: DateTime<Utc>) -> Self {
        Self { status: status.into(), timestamp }
    }
}

/// The buyer-facing tracking view of an order, derived read-only from its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub order_id: i64,
    pub product_name: String,
    pub status: OrderStatusType,
    pub estimated_delivery: DateTime<Utc>,
    pub events: Vec<TrackingEvent>,
}

/// Minimal product identity carried by order views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

/// The buyer-facing summary used by map rendering: where the order's artisan is, if known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub status: OrderStatusType,
    /// The approval-time snapshot when present, otherwise the artisan's live profile
    /// coordinates, otherwise `None`.
    pub artisan_location: Option<GeoPoint>,
    pub product: ProductRef,
}
