use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::traits::data_objects::{ProductSales, RevenueBucket};

/// Read-only revenue rollups over the order records. No mutation, no side effects; zero matching
/// rows yields empty vectors, never an error.
#[allow(async_fn_in_trait)]
pub trait ShopAnalytics {
    /// Revenue from the artisan's completed and delivered orders whose last update falls after
    /// `since`, bucketed by calendar month in ascending chronological order.
    async fn monthly_revenue(&self, artisan_id: i64, since: DateTime<Utc>) -> Result<Vec<RevenueBucket>, AnalyticsApiError>;

    /// The artisan's best sellers by total quantity sold, descending, at most `limit` entries.
    async fn top_products(&self, artisan_id: i64, limit: i64) -> Result<Vec<ProductSales>, AnalyticsApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AnalyticsApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AnalyticsApiError {
    fn from(e: sqlx::Error) -> Self {
        AnalyticsApiError::DatabaseError(e.to_string())
    }
}
