//! `SqliteDatabase` is a concrete implementation of a Craft Market engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`traits`](crate::traits) module. Multi-step flows (order creation, message send, review
//! recording, delivery plus revenue) run inside a transaction; single-row transitions rely on
//! the atomicity of the individual `UPDATE`.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use cm_common::{GeoPoint, Money};
use log::*;
use sqlx::SqlitePool;

use super::db::{analytics, conversations, db_url, messages, new_pool, orders, products, users};
use crate::{
    db_types::{
        Conversation,
        Message,
        NewMessage,
        NewOrder,
        NewProduct,
        NewReview,
        NewUser,
        Order,
        OrderStatusType,
        Product,
        ProductReview,
        User,
    },
    traits::{
        AnalyticsApiError,
        ChatApiError,
        ConversationEntry,
        MessageManagement,
        OrderApiError,
        OrderManagement,
        ProductApiError,
        ProductCatalog,
        ProductSales,
        ProfileApiError,
        ProfileManagement,
        RevenueBucket,
        ShopAnalytics,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance using the `CM_DATABASE_URL` environment variable, or the
    /// default URL if it is not set.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any pending schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        // A single insert today, but kept transactional so follow-up writes (audit, stock) can
        // join the same unit of work.
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} has been saved in the DB", order.id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_buyer(buyer_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_artisan(&self, artisan_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_artisan(artisan_id, &mut conn).await?;
        Ok(orders)
    }

    async fn approve_order(&self, order_id: i64, version: i64, location: GeoPoint) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let res = match orders::approve(order_id, version, location, &mut tx).await? {
            Some(order) => Ok(order),
            None => Err(stale_or_missing(order_id, &mut tx).await),
        };
        tx.commit().await?;
        res
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        version: i64,
        status: OrderStatusType,
    ) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let res = match orders::set_status(order_id, version, status, &mut tx).await? {
            Some(order) => Ok(order),
            None => Err(stale_or_missing(order_id, &mut tx).await),
        };
        tx.commit().await?;
        res
    }

    async fn deliver_order(
        &self,
        order_id: i64,
        version: i64,
        artisan_id: i64,
        revenue: Money,
    ) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::deliver(order_id, version, &mut tx).await? else {
            let err = stale_or_missing(order_id, &mut tx).await;
            return Err(err);
        };
        users::incr_revenue(artisan_id, revenue, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} delivered. {revenue} credited to artisan #{artisan_id}");
        Ok(order)
    }

    async fn cancel_order(&self, order_id: i64, version: i64, message: &str) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let res = match orders::cancel(order_id, version, message, &mut tx).await? {
            Some(order) => Ok(order),
            None => Err(stale_or_missing(order_id, &mut tx).await),
        };
        tx.commit().await?;
        res
    }
}

/// A compare-and-swap transition matched no row: either the token was stale or the order is
/// gone. Re-fetch to tell the two apart.
async fn stale_or_missing(order_id: i64, conn: &mut sqlx::SqliteConnection) -> OrderApiError {
    match orders::fetch_order(order_id, conn).await {
        Ok(Some(_)) => {
            warn!("🗃️ Concurrent modification detected on order #{order_id}");
            OrderApiError::ConcurrentModification
        },
        Ok(None) => OrderApiError::OrderNotFound(order_id),
        Err(e) => OrderApiError::from(e),
    }
}

impl MessageManagement for SqliteDatabase {
    async fn get_or_create_conversation(&self, buyer_id: i64, artisan_id: i64) -> Result<Conversation, ChatApiError> {
        let mut tx = self.pool.begin().await?;
        let conversation = conversations::get_or_create(buyer_id, artisan_id, &mut tx).await?;
        tx.commit().await?;
        Ok(conversation)
    }

    async fn fetch_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let conversation = conversations::fetch_conversation(conversation_id, &mut conn).await?;
        Ok(conversation)
    }

    async fn fetch_conversations_for_user(&self, user_id: i64) -> Result<Vec<ConversationEntry>, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = conversations::fetch_for_user(user_id, &mut conn).await?;
        Ok(entries)
    }

    /// The full send unit: message insert, `last_message_id` update, sender pointer stamp and
    /// recipient pointer clear, all or nothing.
    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatApiError> {
        let mut tx = self.pool.begin().await?;
        let message = messages::insert_message(message, &mut tx).await?;
        conversations::set_last_message(message.conversation_id, message.id, &mut tx).await?;
        conversations::stamp_read_pointer(message.conversation_id, message.sender_id, message.id, &mut tx).await?;
        conversations::clear_other_read_pointers(message.conversation_id, message.sender_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Message #{} stored in conversation #{}", message.id, message.conversation_id);
        Ok(message)
    }

    async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let messages = messages::fetch_messages(conversation_id, &mut conn).await?;
        Ok(messages)
    }

    async fn fetch_latest_message(&self, conversation_id: i64) -> Result<Option<Message>, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let message = messages::fetch_latest_message(conversation_id, &mut conn).await?;
        Ok(message)
    }

    async fn mark_read(&self, conversation_id: i64, user_id: i64, message_id: i64) -> Result<(), ChatApiError> {
        let mut tx = self.pool.begin().await?;
        conversations::stamp_read_pointer(conversation_id, user_id, message_id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn add_review(&self, review: NewReview) -> Result<Product, ProductApiError> {
        let product_id = review.product_id;
        let mut tx = self.pool.begin().await?;
        if products::fetch_product(product_id, &mut tx).await?.is_none() {
            return Err(ProductApiError::ProductNotFound(product_id));
        }
        if products::review_exists(product_id, review.reviewer_id, &mut tx).await? {
            return Err(ProductApiError::AlreadyReviewed);
        }
        products::insert_review(review, &mut tx).await?;
        let product = products::recompute_average_rating(product_id, &mut tx)
            .await?
            .ok_or(ProductApiError::ProductNotFound(product_id))?;
        tx.commit().await?;
        debug!("🗃️ Product #{product_id} rating recomputed to {:.2}", product.average_rating);
        Ok(product)
    }

    async fn fetch_reviews(&self, product_id: i64) -> Result<Vec<ProductReview>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let reviews = products::fetch_reviews(product_id, &mut conn).await?;
        Ok(reviews)
    }
}

impl ProfileManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, ProfileApiError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, ProfileApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn update_user_location(&self, user_id: i64, location: GeoPoint) -> Result<User, ProfileApiError> {
        let mut tx = self.pool.begin().await?;
        let user = users::update_location(user_id, location, &mut tx).await?;
        tx.commit().await?;
        user.ok_or(ProfileApiError::UserNotFound(user_id))
    }
}

impl ShopAnalytics for SqliteDatabase {
    async fn monthly_revenue(
        &self,
        artisan_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<RevenueBucket>, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let buckets = analytics::monthly_revenue(artisan_id, since, &mut conn).await?;
        Ok(buckets)
    }

    async fn top_products(&self, artisan_id: i64, limit: i64) -> Result<Vec<ProductSales>, AnalyticsApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = analytics::top_products(artisan_id, limit, &mut conn).await?;
        Ok(products)
    }
}
