use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cm_common::{GeoPoint, Money};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        Role        ---------------------------------------------------------
/// The two actor roles in the marketplace. Buyers create and cancel orders and initiate chats;
/// artisans own products and approve, reject or deliver the orders placed against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    Buyer,
    Artisan,
}

impl Role {
    /// The counterpart role. A conversation always pairs a role with its opposite.
    pub fn opposite(self) -> Self {
        match self {
            Role::Buyer => Role::Artisan,
            Role::Artisan => Role::Buyer,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "Buyer"),
            Role::Artisan => write!(f, "Artisan"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid role: {0}")]
pub struct RoleConversionError(String);

impl FromStr for Role {
    type Err = RoleConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "artisan" => Ok(Self::Artisan),
            s => Err(RoleConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is newly created and awaiting the artisan's decision.
    Open,
    /// The artisan has accepted the order. A snapshot of their location was taken at this moment.
    Approved,
    /// Dormant status. No engine transition produces it, but legacy data may carry it.
    Processing,
    /// Dormant status. Counted by analytics alongside `Delivered`.
    Completed,
    /// The artisan has handed the order over. Terminal.
    Delivered,
    /// The buyer withdrew the order. Terminal.
    Cancelled,
    /// The artisan declined the order. Terminal.
    Rejected,
}

impl OrderStatusType {
    /// Whether the state machine allows a transition from `self` to `next`.
    ///
    /// | From \ To | Approved | Rejected | Delivered | Cancelled |
    /// |-----------|----------|----------|-----------|-----------|
    /// | Open      | ✓        | ✓        |           | ✓         |
    /// | Approved  |          |          | ✓         | ✓         |
    ///
    /// Every other edge is a conflict. `Processing` and `Completed` are never produced and never
    /// permit an outgoing transition.
    pub fn permits(self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((self, next), (Open, Approved | Rejected | Cancelled) | (Approved, Delivered | Cancelled))
    }

    /// True for statuses no buyer action can move the order out of.
    pub fn is_terminal(self) -> bool {
        use OrderStatusType::*;
        matches!(self, Completed | Delivered | Cancelled | Rejected)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Open => write!(f, "Open"),
            OrderStatusType::Approved => write!(f, "Approved"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "Approved" => Ok(Self::Approved),
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            "Rejected" => Ok(Self::Rejected),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Open");
            OrderStatusType::Open
        })
    }
}

//--------------------------------------        User        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Cumulative revenue from delivered orders. Always zero for buyers.
    pub revenue: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's profile coordinates, if they have set them.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub role: Role,
    pub location: Option<GeoPoint>,
}

impl NewUser {
    pub fn new<S: Into<String>>(name: S, role: Role) -> Self {
        Self { name: name.into(), role, location: None }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }
}

//--------------------------------------      Product       ---------------------------------------------------------
/// A product listing. The engine reads the owner, price and unit for authorization and revenue
/// computation; everything else about products is managed outside the core.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub artisan_id: i64,
    pub name: String,
    pub price_per_kg: Money,
    pub unit: String,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub artisan_id: i64,
    pub name: String,
    pub price_per_kg: Money,
    pub unit: String,
}

impl NewProduct {
    pub fn new<S: Into<String>>(artisan_id: i64, name: S, price_per_kg: Money) -> Self {
        Self { artisan_id, name: name.into(), price_per_kg, unit: "kg".to_string() }
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = unit.into();
        self
    }
}

//--------------------------------------    ProductReview    ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: i64,
    pub product_id: i64,
    pub reviewer_id: i64,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: i64,
    pub reviewer_id: i64,
    pub rating: i64,
    pub comment: String,
}

//--------------------------------------       Order        ---------------------------------------------------------
/// A single buyer's purchase request against one product.
///
/// `version` is the optimistic concurrency token. Every transition is a compare-and-swap on
/// `(id, version)`, so two racing transitions cannot both succeed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
    pub status: OrderStatusType,
    /// Estimated delivery while the order is in flight; overwritten with the actual delivery
    /// instant when the order is marked delivered.
    pub delivery_date: DateTime<Utc>,
    pub artisan_lat: Option<f64>,
    pub artisan_lng: Option<f64>,
    pub cancellation_message: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The artisan coordinates snapshotted at approval time, if the order has been approved.
    pub fn artisan_location(&self) -> Option<GeoPoint> {
        match (self.artisan_lat, self.artisan_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    /// Derived view of the old `artisanApproved` flag: the status carries this information now.
    pub fn artisan_approved(&self) -> bool {
        matches!(self.status, OrderStatusType::Approved | OrderStatusType::Delivered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
}

impl NewOrder {
    pub fn new(product_id: i64, buyer_id: i64, quantity: i64) -> Self {
        Self { product_id, buyer_id, quantity }
    }
}

//--------------------------------------    Conversation     ---------------------------------------------------------
/// A persistent two-party thread between one buyer and one artisan. There is exactly one per
/// pair of users; all products between the same two users share it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub buyer_id: i64,
    pub artisan_id: i64,
    pub last_message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.buyer_id == user_id || self.artisan_id == user_id
    }

    /// The role a participant holds in this conversation, or `None` for outsiders.
    pub fn role_of(&self, user_id: i64) -> Option<Role> {
        if self.buyer_id == user_id {
            Some(Role::Buyer)
        } else if self.artisan_id == user_id {
            Some(Role::Artisan)
        } else {
            None
        }
    }

    pub fn other_participant(&self, user_id: i64) -> Option<i64> {
        if self.buyer_id == user_id {
            Some(self.artisan_id)
        } else if self.artisan_id == user_id {
            Some(self.buyer_id)
        } else {
            None
        }
    }
}

//--------------------------------------      Message       ---------------------------------------------------------
/// A single chat message. Immutable once created; there is no edit or delete path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_role: Role,
    pub content: String,
}

#[cfg(test)]
mod test {
    use super::OrderStatusType::*;
    use super::*;

    #[test]
    fn legal_edges_only() {
        assert!(Open.permits(Approved));
        assert!(Open.permits(Rejected));
        assert!(Open.permits(Cancelled));
        assert!(Approved.permits(Delivered));
        assert!(Approved.permits(Cancelled));
        // No other edge exists.
        assert!(!Open.permits(Delivered));
        assert!(!Approved.permits(Approved));
        assert!(!Delivered.permits(Cancelled));
        assert!(!Rejected.permits(Approved));
        assert!(!Cancelled.permits(Open));
        assert!(!Processing.permits(Delivered));
        assert!(!Completed.permits(Cancelled));
    }

    #[test]
    fn status_round_trip() {
        for s in [Open, Approved, Processing, Completed, Delivered, Cancelled, Rejected] {
            assert_eq!(s.to_string().parse::<OrderStatusType>().unwrap(), s);
        }
        assert_eq!(OrderStatusType::from("garbage".to_string()), Open);
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("Artisan".parse::<Role>().unwrap(), Role::Artisan);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Buyer.opposite(), Role::Artisan);
    }

    #[test]
    fn artisan_approved_is_derived_from_status() {
        let mut order = Order {
            id: 1,
            product_id: 1,
            buyer_id: 1,
            quantity: 1,
            status: Open,
            delivery_date: chrono::Utc::now(),
            artisan_lat: None,
            artisan_lng: None,
            cancellation_message: None,
            version: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(!order.artisan_approved());
        order.status = Approved;
        assert!(order.artisan_approved());
        order.status = Delivered;
        assert!(order.artisan_approved());
        order.status = Rejected;
        assert!(!order.artisan_approved());
    }
}
