use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use craft_market_engine::db_types::Role;

use crate::auth::{USER_ID_HEADER, USER_ROLE_HEADER};

/// Stamps the identity headers the upstream gateway would have set.
pub fn as_user(req: TestRequest, id: i64, role: Role) -> TestRequest {
    req.insert_header((USER_ID_HEADER, id.to_string())).insert_header((USER_ROLE_HEADER, role.to_string()))
}

/// Runs the request against a fresh app configured by `configure` and returns the response
/// status and body. Handler errors come back as their mapped error responses.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
