use chrono::{Duration, Utc};
use cm_common::GeoPoint;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderStatusType};

/// How far out the delivery estimate is set when an order is created.
const DELIVERY_ESTIMATE_DAYS: i64 = 7;

/// Inserts a new order in `Open` status with a delivery estimate a week out. This is not atomic
/// on its own. You can embed this call inside a transaction and pass `&mut *tx` as the
/// connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let delivery_date = Utc::now() + Duration::days(DELIVERY_ESTIMATE_DAYS);
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (product_id, buyer_id, quantity, delivery_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.product_id)
    .bind(order.buyer_id)
    .bind(order.quantity)
    .bind(delivery_date)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order #{} inserted for buyer #{}", order.id, order.buyer_id);
    Ok(order)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// All orders placed by the given buyer, most recent first.
pub async fn fetch_orders_for_buyer(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(buyer_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// All orders placed against the given artisan's products, most recent first.
pub async fn fetch_orders_for_artisan(artisan_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT orders.*
        FROM orders JOIN products ON products.id = orders.product_id
        WHERE products.artisan_id = $1
        ORDER BY orders.created_at DESC, orders.id DESC
        "#,
    )
    .bind(artisan_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Compare-and-swap transition to `Approved`, snapshotting the artisan coordinates into the
/// order. Returns `None` when the version token is stale or the order does not exist.
pub(crate) async fn approve(
    order_id: i64,
    version: i64,
    location: GeoPoint,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders
        SET status = 'Approved', artisan_lat = $1, artisan_lng = $2,
            version = version + 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3 AND version = $4
        RETURNING *
        "#,
    )
    .bind(location.lat)
    .bind(location.lng)
    .bind(order_id)
    .bind(version)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Compare-and-swap status overwrite. Returns `None` on a stale token or missing order.
pub(crate) async fn set_status(
    order_id: i64,
    version: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = $1, version = version + 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $2 AND version = $3 RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id)
    .bind(version)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Compare-and-swap transition to `Delivered`. The delivery estimate is overwritten with the
/// actual delivery instant.
pub(crate) async fn deliver(
    order_id: i64,
    version: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders
        SET status = 'Delivered', delivery_date = CURRENT_TIMESTAMP,
            version = version + 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND version = $2
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(version)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Compare-and-swap transition to `Cancelled`, storing the buyer's message.
pub(crate) async fn cancel(
    order_id: i64,
    version: i64,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders
        SET status = 'Cancelled', cancellation_message = $1,
            version = version + 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND version = $3
        RETURNING *
        "#,
    )
    .bind(message)
    .bind(order_id)
    .bind(version)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
