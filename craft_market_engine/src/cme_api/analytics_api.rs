use std::fmt::Debug;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::{AnalyticsApiError, ProductSales, RevenueBucket, ShopAnalytics};

/// Trailing window for the monthly revenue rollup.
pub const DEFAULT_REVENUE_WINDOW_MONTHS: u32 = 12;
/// Number of entries in the top-products rollup.
pub const DEFAULT_TOP_PRODUCTS: i64 = 5;

/// The artisan dashboard payload: both rollups in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub monthly_revenue: Vec<RevenueBucket>,
    pub top_products: Vec<ProductSales>,
}

/// `AnalyticsApi` provides the read-only revenue rollups over the order records. It never
/// mutates anything and tolerates empty result sets.
pub struct AnalyticsApi<B> {
    db: B,
}

impl<B> Debug for AnalyticsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalyticsApi")
    }
}

impl<B> AnalyticsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AnalyticsApi<B>
where B: ShopAnalytics
{
    /// Monthly revenue buckets over the trailing `window_months`, ascending chronologically.
    pub async fn monthly_revenue(
        &self,
        artisan_id: i64,
        window_months: u32,
    ) -> Result<Vec<RevenueBucket>, AnalyticsApiError> {
        self.db.monthly_revenue(artisan_id, window_start(window_months)).await
    }

    /// The artisan's best sellers by quantity, at most `limit` entries.
    pub async fn top_products(&self, artisan_id: i64, limit: i64) -> Result<Vec<ProductSales>, AnalyticsApiError> {
        self.db.top_products(artisan_id, limit).await
    }

    /// Both rollups with their default parameters, as served to the artisan dashboard.
    pub async fn dashboard(&self, artisan_id: i64) -> Result<AnalyticsSummary, AnalyticsApiError> {
        let monthly_revenue = self.monthly_revenue(artisan_id, DEFAULT_REVENUE_WINDOW_MONTHS).await?;
        let top_products = self.top_products(artisan_id, DEFAULT_TOP_PRODUCTS).await?;
        Ok(AnalyticsSummary { monthly_revenue, top_products })
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn window_start(window_months: u32) -> DateTime<Utc> {
    Utc::now().checked_sub_months(Months::new(window_months)).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
