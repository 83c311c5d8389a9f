use thiserror::Error;

use crate::db_types::{NewProduct, NewReview, Product, ProductReview};

/// The product surface the core needs: reads for authorization and pricing, plus transactional
/// review recording. Full product CRUD lives outside the engine.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError>;

    /// Stores a review and recomputes the product's average rating in a single all-or-nothing
    /// transaction. One review per reviewer per product. Returns the updated product.
    async fn add_review(&self, review: NewReview) -> Result<Product, ProductApiError>;

    async fn fetch_reviews(&self, product_id: i64) -> Result<Vec<ProductReview>, ProductApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum ProductApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Product already reviewed")]
    AlreadyReviewed,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("A rating and a comment are required")]
    EmptyComment,
}

impl From<sqlx::Error> for ProductApiError {
    fn from(e: sqlx::Error) -> Self {
        ProductApiError::DatabaseError(e.to_string())
    }
}
