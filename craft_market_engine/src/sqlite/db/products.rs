use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, NewReview, Product, ProductReview};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        "INSERT INTO products (artisan_id, name, price_per_kg, unit) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(product.artisan_id)
    .bind(product.name)
    .bind(product.price_per_kg)
    .bind(product.unit)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Product #{} ({}) listed by artisan #{}", product.id, product.name, product.artisan_id);
    Ok(product)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn review_exists(
    product_id: i64,
    reviewer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM product_reviews WHERE product_id = $1 AND reviewer_id = $2")
            .bind(product_id)
            .bind(reviewer_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<ProductReview, sqlx::Error> {
    let review = sqlx::query_as(
        "INSERT INTO product_reviews (product_id, reviewer_id, rating, comment) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(review.product_id)
    .bind(review.reviewer_id)
    .bind(review.rating)
    .bind(review.comment)
    .fetch_one(conn)
    .await?;
    Ok(review)
}

/// Recomputes the product's average rating from its stored reviews. Call inside the same
/// transaction as the review insert so the two can never diverge.
pub(crate) async fn recompute_average_rating(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
        UPDATE products
        SET average_rating = COALESCE(
                (SELECT AVG(rating) FROM product_reviews WHERE product_id = $1), 0),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_reviews(product_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ProductReview>, sqlx::Error> {
    let reviews =
        sqlx::query_as("SELECT * FROM product_reviews WHERE product_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(product_id)
            .fetch_all(conn)
            .await?;
    Ok(reviews)
}
