use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::traits::{ProductSales, RevenueBucket};

/// Revenue from the artisan's completed and delivered orders updated after `since`, bucketed by
/// calendar month. Priced at read time from the current product price, matching the delivery
/// flow.
pub async fn monthly_revenue(
    artisan_id: i64,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<RevenueBucket>, sqlx::Error> {
    let buckets = sqlx::query_as(
        r#"
        SELECT CAST(strftime('%Y', orders.updated_at) AS INTEGER) AS year,
               CAST(strftime('%m', orders.updated_at) AS INTEGER) AS month,
               CAST(SUM(orders.quantity * products.price_per_kg) AS INTEGER) AS revenue
        FROM orders
        JOIN products ON products.id = orders.product_id
        WHERE products.artisan_id = $1
          AND orders.status IN ('Completed', 'Delivered')
          AND datetime(orders.updated_at) >= datetime($2)
        GROUP BY year, month
        ORDER BY year ASC, month ASC
        "#,
    )
    .bind(artisan_id)
    .bind(since)
    .fetch_all(conn)
    .await?;
    Ok(buckets)
}

/// The artisan's best sellers by total quantity across completed and delivered orders, no time
/// window.
pub async fn top_products(
    artisan_id: i64,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductSales>, sqlx::Error> {
    let products = sqlx::query_as(
        r#"
        SELECT products.id AS product_id,
               products.name AS name,
               CAST(SUM(orders.quantity) AS INTEGER) AS total_quantity_sold
        FROM orders
        JOIN products ON products.id = orders.product_id
        WHERE products.artisan_id = $1
          AND orders.status IN ('Completed', 'Delivered')
        GROUP BY products.id, products.name
        ORDER BY total_quantity_sold DESC
        LIMIT $2
        "#,
    )
    .bind(artisan_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(products)
}
