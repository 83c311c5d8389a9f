use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use craft_market_engine::traits::{
    AnalyticsApiError,
    ChatApiError,
    OrderApiError,
    ProductApiError,
    ProfileApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Identity headers missing or malformed. {0}")]
    UnidentifiedCaller(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    OrderError(#[from] OrderApiError),
    #[error("{0}")]
    ChatError(#[from] ChatApiError),
    #[error("{0}")]
    ProductError(#[from] ProductApiError),
    #[error("{0}")]
    ProfileError(#[from] ProfileApiError),
    #[error("{0}")]
    AnalyticsError(#[from] AnalyticsApiError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::UnidentifiedCaller(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OrderError(e) => order_status(e),
            Self::ChatError(e) => chat_status(e),
            Self::ProductError(e) => product_status(e),
            Self::ProfileError(e) => profile_status(e),
            Self::AnalyticsError(AnalyticsApiError::DatabaseError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

fn order_status(e: &OrderApiError) -> StatusCode {
    match e {
        OrderApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        OrderApiError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrderApiError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        OrderApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
        OrderApiError::InvalidQuantity => StatusCode::BAD_REQUEST,
        OrderApiError::ArtisanLocationNotSet => StatusCode::BAD_REQUEST,
        OrderApiError::NotProductOwner => StatusCode::FORBIDDEN,
        OrderApiError::NotOrderBuyer => StatusCode::FORBIDDEN,
        OrderApiError::InvalidTransition { .. } => StatusCode::CONFLICT,
        OrderApiError::ConcurrentModification => StatusCode::CONFLICT,
        OrderApiError::ProductError(e) => product_status(e),
        OrderApiError::ProfileError(e) => profile_status(e),
    }
}

fn chat_status(e: &ChatApiError) -> StatusCode {
    match e {
        ChatApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ChatApiError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
        ChatApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
        ChatApiError::NotAParticipant(_) => StatusCode::FORBIDDEN,
        ChatApiError::EmptyMessage => StatusCode::BAD_REQUEST,
        ChatApiError::InvalidParticipants(_) => StatusCode::BAD_REQUEST,
        ChatApiError::ProfileError(e) => profile_status(e),
    }
}

fn product_status(e: &ProductApiError) -> StatusCode {
    match e {
        ProductApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ProductApiError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        ProductApiError::AlreadyReviewed => StatusCode::BAD_REQUEST,
        ProductApiError::InvalidRating => StatusCode::BAD_REQUEST,
        ProductApiError::EmptyComment => StatusCode::BAD_REQUEST,
    }
}

fn profile_status(e: &ProfileApiError) -> StatusCode {
    match e {
        ProfileApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ProfileApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
    }
}
