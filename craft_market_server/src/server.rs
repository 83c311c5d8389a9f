use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use craft_market_engine::{AnalyticsApi, ChatApi, OrderFlowApi, ProductApi, ProfileApi, SqliteDatabase};
use log::info;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AddReviewRoute,
        ApproveOrderRoute,
        ArtisanAnalyticsRoute,
        ArtisanOrdersRoute,
        CancelOrderRoute,
        ConversationDetailsRoute,
        ConversationMessagesRoute,
        ConversationsRoute,
        CreateOrderRoute,
        DeliverOrderRoute,
        MarkReadRoute,
        MyOrdersRoute,
        OrderSummaryRoute,
        RejectOrderRoute,
        SendMessageRoute,
        StartConversationRoute,
        TrackOrderRoute,
        UnreadCountRoute,
        UpdateLocationRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🚀️ Database schema is up to date");
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let chat_api = ChatApi::new(db.clone());
        let analytics_api = AnalyticsApi::new(db.clone());
        let product_api = ProductApi::new(db.clone());
        let profile_api = ProfileApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cms::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(chat_api))
            .app_data(web::Data::new(analytics_api))
            .app_data(web::Data::new(product_api))
            .app_data(web::Data::new(profile_api));
        // Fixed paths must be registered before the parameterised conversation routes, or
        // "unread-count" would be captured as a {conversation_id} segment.
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(ArtisanOrdersRoute::<SqliteDatabase>::new())
            .service(ApproveOrderRoute::<SqliteDatabase>::new())
            .service(RejectOrderRoute::<SqliteDatabase>::new())
            .service(DeliverOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(TrackOrderRoute::<SqliteDatabase>::new())
            .service(OrderSummaryRoute::<SqliteDatabase>::new())
            .service(ConversationsRoute::<SqliteDatabase>::new())
            .service(UnreadCountRoute::<SqliteDatabase>::new())
            .service(ConversationDetailsRoute::<SqliteDatabase>::new())
            .service(ConversationMessagesRoute::<SqliteDatabase>::new())
            .service(StartConversationRoute::<SqliteDatabase>::new())
            .service(SendMessageRoute::<SqliteDatabase>::new())
            .service(MarkReadRoute::<SqliteDatabase>::new())
            .service(ArtisanAnalyticsRoute::<SqliteDatabase>::new())
            .service(AddReviewRoute::<SqliteDatabase>::new())
            .service(UpdateLocationRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
