use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::{NewReview, Product, ProductReview},
    traits::{ProductApiError, ProductCatalog},
};

/// `ProductApi` exposes the slim product surface the marketplace core needs: reads, and review
/// recording with its average-rating recomputation.
pub struct ProductApi<B> {
    db: B,
}

impl<B> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi")
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProductApi<B>
where B: ProductCatalog
{
    pub async fn product(&self, product_id: i64) -> Result<Product, ProductApiError> {
        self.db.fetch_product(product_id).await?.ok_or(ProductApiError::ProductNotFound(product_id))
    }

    /// Records a review and recomputes the product's average rating in a single transaction.
    /// One review per reviewer per product.
    pub async fn add_review(
        &self,
        product_id: i64,
        reviewer_id: i64,
        rating: i64,
        comment: &str,
    ) -> Result<Product, ProductApiError> {
        if !(1..=5).contains(&rating) {
            return Err(ProductApiError::InvalidRating);
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ProductApiError::EmptyComment);
        }
        let review = NewReview { product_id, reviewer_id, rating, comment: comment.to_string() };
        let product = self.db.add_review(review).await?;
        debug!("⭐️ Review added to product #{product_id}; average is now {:.2}", product.average_rating);
        Ok(product)
    }

    pub async fn reviews(&self, product_id: i64) -> Result<Vec<ProductReview>, ProductApiError> {
        self.db.fetch_reviews(product_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
