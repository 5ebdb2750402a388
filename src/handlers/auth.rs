use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde_json::json;

use crate::auth::{login_user, LoginError};
use crate::db::RemoteBackend;
use crate::models::LoginRequest;

pub async fn login(
    backend: web::Data<RemoteBackend>,
    credentials: web::Json<LoginRequest>,
) -> Result<HttpResponse, Error> {
    let LoginRequest {
        role,
        email,
        password,
    } = credentials.into_inner();
    match login_user(backend.get_ref(), role, &email, &password).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Upstream faults are server errors; everything else is a rejection of the
/// login attempt itself.
fn error_response(err: &LoginError) -> HttpResponse {
    let status = match err {
        LoginError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    HttpResponse::build(status).json(json!({ "error": err.to_string() }))
}
