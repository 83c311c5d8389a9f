//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module
//! neat and tidy 🙏
//!
//! Handlers are async and only suspend on engine (database) I/O, so worker threads are never
//! blocked. Authorization that depends on the data (ownership, participation, buyer identity)
//! lives in the engine; handlers only apply the coarse per-route role gates.
use actix_web::{get, web, HttpResponse, Responder};
use craft_market_engine::{
    db_types::{NewOrder, Role},
    traits::{
        MessageManagement,
        OrderManagement,
        ProductCatalog,
        ProfileManagement,
        ShopAnalytics,
    },
    AnalyticsApi,
    ChatApi,
    OrderFlowApi,
    ProductApi,
    ProfileApi,
};
use log::*;
use serde_json::json;

use crate::{
    auth::AuthenticatedUser,
    data_objects::{
        CancelOrderParams,
        JsonResponse,
        NewOrderParams,
        ReviewParams,
        SendMessageParams,
        UpdateLocationParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!`
// macro. Each invocation produces a `<Name>Route<A>` service factory where `A` is the backend
// type satisfying all the listed trait bounds.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>); }
        paste::paste! {
            impl<A> [<$name:camel Route>]<A> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
            where A: $($bounds +)+ 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<A>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement, ProductCatalog, ProfileManagement);
/// Creates a new direct order for the calling buyer.
pub async fn create_order<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<NewOrderParams>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    trace!("💻️ New order request from user #{}", user.id);
    let params = body.into_inner();
    let order = api.create_order(NewOrder::new(params.product_id, user.id, params.quantity)).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders/my-orders" impl OrderManagement, ProductCatalog, ProfileManagement);
/// The calling buyer's orders, most recent first.
pub async fn my_orders<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    let orders = api.orders_for_buyer(user.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(artisan_orders => Get "/orders/artisan-orders" impl OrderManagement, ProductCatalog, ProfileManagement);
/// Orders placed against the calling artisan's products.
pub async fn artisan_orders<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    user.require_role(Role::Artisan)?;
    let orders = api.orders_for_artisan(user.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(approve_order => Put "/orders/{order_id}/approve" impl OrderManagement, ProductCatalog, ProfileManagement);
pub async fn approve_order<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    user.require_role(Role::Artisan)?;
    let order = api.approve_order(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(reject_order => Put "/orders/{order_id}/reject" impl OrderManagement, ProductCatalog, ProfileManagement);
pub async fn reject_order<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    user.require_role(Role::Artisan)?;
    let order = api.reject_order(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(deliver_order => Put "/orders/{order_id}/deliver" impl OrderManagement, ProductCatalog, ProfileManagement);
pub async fn deliver_order<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    user.require_role(Role::Artisan)?;
    let order = api.deliver_order(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Patch "/orders/{order_id}/cancel" impl OrderManagement, ProductCatalog, ProfileManagement);
/// Buyer cancellation. The body is optional; a missing message falls back to the engine default.
pub async fn cancel_order<B>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
    body: Option<web::Json<CancelOrderParams>>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    user.require_role(Role::Buyer)?;
    let message = body.map(|b| b.into_inner().cancellation_message).unwrap_or_default();
    let order = api.cancel_order(path.into_inner(), user.id, message).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(track_order => Get "/orders/{order_id}/track" impl OrderManagement, ProductCatalog, ProfileManagement);
pub async fn track_order<B>(
    _user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    let tracking = api.track_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tracking))
}

route!(order_summary => Get "/orders/{order_id}/summary" impl OrderManagement, ProductCatalog, ProfileManagement);
pub async fn order_summary<B>(
    _user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement + ProductCatalog + ProfileManagement
{
    let summary = api.order_summary(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Chat  ----------------------------------------------------
route!(start_conversation => Post "/conversations/{other_user_id}" impl MessageManagement, ProfileManagement);
/// Fetches (or lazily creates) the thread between the caller and the given counterpart.
pub async fn start_conversation<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let conversation = api.get_or_create_conversation(user.id, user.role, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "conversation_id": conversation.id })))
}

route!(conversations => Get "/conversations" impl MessageManagement, ProfileManagement);
pub async fn conversations<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let conversations = api.conversations_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(conversations))
}

route!(unread_count => Get "/conversations/unread-count" impl MessageManagement, ProfileManagement);
pub async fn unread_count<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let count = api.unread_conversation_count(user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "unread_count": count })))
}

route!(conversation_details => Get "/conversations/{conversation_id}" impl MessageManagement, ProfileManagement);
pub async fn conversation_details<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let details = api.conversation_details(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(details))
}

route!(conversation_messages => Get "/conversations/{conversation_id}/messages" impl MessageManagement, ProfileManagement);
pub async fn conversation_messages<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let messages = api.messages_for_conversation(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

route!(send_message => Post "/messages" impl MessageManagement, ProfileManagement);
pub async fn send_message<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
    body: web::Json<SendMessageParams>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    let params = body.into_inner();
    let message = api.send_message(params.conversation_id, user.id, &params.content).await?;
    Ok(HttpResponse::Created().json(message))
}

route!(mark_read => Patch "/conversations/{conversation_id}/read" impl MessageManagement, ProfileManagement);
pub async fn mark_read<B>(
    user: AuthenticatedUser,
    api: web::Data<ChatApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where B: MessageManagement + ProfileManagement
{
    api.mark_conversation_read(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Conversation marked as read.")))
}

//----------------------------------------------   Analytics  ----------------------------------------------------
route!(artisan_analytics => Get "/artisans/analytics" impl ShopAnalytics);
/// The artisan dashboard: monthly revenue buckets plus best sellers.
pub async fn artisan_analytics<B>(
    user: AuthenticatedUser,
    api: web::Data<AnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: ShopAnalytics
{
    user.require_role(Role::Artisan)?;
    let summary = api.dashboard(user.id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(add_review => Post "/products/{product_id}/review" impl ProductCatalog);
pub async fn add_review<B>(
    user: AuthenticatedUser,
    api: web::Data<ProductApi<B>>,
    path: web::Path<i64>,
    body: web::Json<ReviewParams>,
) -> Result<HttpResponse, ServerError>
where B: ProductCatalog
{
    let params = body.into_inner();
    api.add_review(path.into_inner(), user.id, params.rating, &params.comment).await?;
    Ok(HttpResponse::Created().json(JsonResponse::success("Review added")))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(update_location => Patch "/profile/location" impl ProfileManagement);
/// Stores the caller's profile coordinates — the precondition for approving orders.
pub async fn update_location<B>(
    user: AuthenticatedUser,
    api: web::Data<ProfileApi<B>>,
    body: web::Json<UpdateLocationParams>,
) -> Result<HttpResponse, ServerError>
where B: ProfileManagement
{
    let profile = api.update_location(user.id, body.into_inner().location).await?;
    Ok(HttpResponse::Ok().json(profile))
}
