use cm_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::Conversation;

/// One calendar month of revenue for an artisan.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RevenueBucket {
    pub year: i64,
    pub month: i64,
    pub revenue: Money,
}

/// Sales total for one product, used by the top-products rollup.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: i64,
    pub name: String,
    pub total_quantity_sold: i64,
}

/// A conversation paired with one participant's read pointer, as fetched for that participant.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationEntry {
    #[sqlx(flatten)]
    pub conversation: Conversation,
    pub last_read_message_id: Option<i64>,
}
