use chrono::{DateTime, TimeZone, Utc};
use cm_common::{GeoPoint, Money};
use craft_market_engine::{
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
        Role,
        User,
    },
    traits::{
        ChatApiError,
        ConversationEntry,
        MessageManagement,
        OrderApiError,
        OrderManagement,
        ProductApiError,
        ProductCatalog,
        ProfileApiError,
        ProfileManagement,
    },
};
use mockall::mock;

mock! {
    pub OrderBackend {}

    impl OrderManagement for OrderBackend {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderApiError>;
        async fn fetch_orders_for_artisan(&self, artisan_id: i64) -> Result<Vec<Order>, OrderApiError>;
        async fn approve_order(&self, order_id: i64, version: i64, location: GeoPoint) -> Result<Order, OrderApiError>;
        async fn update_order_status(&self, order_id: i64, version: i64, status: OrderStatusType) -> Result<Order, OrderApiError>;
        async fn deliver_order(&self, order_id: i64, version: i64, artisan_id: i64, revenue: Money) -> Result<Order, OrderApiError>;
        async fn cancel_order(&self, order_id: i64, version: i64, message: &str) -> Result<Order, OrderApiError>;
    }

    impl ProductCatalog for OrderBackend {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError>;
        async fn add_review(&self, review: NewReview) -> Result<Product, ProductApiError>;
        async fn fetch_reviews(&self, product_id: i64) -> Result<Vec<ProductReview>, ProductApiError>;
    }

    impl ProfileManagement for OrderBackend {
        async fn insert_user(&self, user: NewUser) -> Result<User, ProfileApiError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, ProfileApiError>;
        async fn update_user_location(&self, user_id: i64, location: GeoPoint) -> Result<User, ProfileApiError>;
    }
}

mock! {
    pub ChatBackend {}

    impl MessageManagement for ChatBackend {
        async fn get_or_create_conversation(&self, buyer_id: i64, artisan_id: i64) -> Result<Conversation, ChatApiError>;
        async fn fetch_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>, ChatApiError>;
        async fn fetch_conversations_for_user(&self, user_id: i64) -> Result<Vec<ConversationEntry>, ChatApiError>;
        async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatApiError>;
        async fn fetch_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ChatApiError>;
        async fn fetch_latest_message(&self, conversation_id: i64) -> Result<Option<Message>, ChatApiError>;
        async fn mark_read(&self, conversation_id: i64, user_id: i64, message_id: i64) -> Result<(), ChatApiError>;
    }

    impl ProfileManagement for ChatBackend {
        async fn insert_user(&self, user: NewUser) -> Result<User, ProfileApiError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, ProfileApiError>;
        async fn update_user_location(&self, user_id: i64, location: GeoPoint) -> Result<User, ProfileApiError>;
    }
}

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
}

pub fn order_fixture(id: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        product_id: 11,
        buyer_id: 42,
        quantity: 3,
        status,
        delivery_date: test_time() + chrono::Duration::days(7),
        artisan_lat: None,
        artisan_lng: None,
        cancellation_message: None,
        version: 0,
        created_at: test_time(),
        updated_at: test_time(),
    }
}

pub fn product_fixture(id: i64, artisan_id: i64) -> Product {
    Product {
        id,
        artisan_id,
        name: "Sourdough loaf".to_string(),
        price_per_kg: Money::from(2_500),
        unit: "kg".to_string(),
        average_rating: 0.0,
        created_at: test_time(),
        updated_at: test_time(),
    }
}

pub fn user_fixture(id: i64, role: Role) -> User {
    User {
        id,
        name: format!("user-{id}"),
        role,
        latitude: Some(10.0),
        longitude: Some(20.0),
        revenue: Money::default(),
        created_at: test_time(),
        updated_at: test_time(),
    }
}

pub fn conversation_fixture(id: i64, buyer_id: i64, artisan_id: i64) -> Conversation {
    Conversation {
        id,
        buyer_id,
        artisan_id,
        last_message_id: None,
        created_at: test_time(),
        updated_at: test_time(),
    }
}

pub fn message_fixture(id: i64, conversation_id: i64, sender_id: i64, sender_role: Role) -> Message {
    Message {
        id,
        conversation_id,
        sender_id,
        sender_role,
        content: "Hi".to_string(),
        created_at: test_time(),
    }
}
