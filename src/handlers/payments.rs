use actix_web::{web, Error, HttpResponse};
use serde_json::json;

use crate::db::{BackendError, RemoteBackend};
use crate::models::RecordPaymentRequest;

pub async fn get_route_fee(
    backend: web::Data<RemoteBackend>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let route_id = path.into_inner();
    match backend.current_fee(&route_id).await {
        Ok(fee) => Ok(HttpResponse::Ok().json(fee)),
        Err(BackendError::RowCount(0)) => Ok(HttpResponse::NotFound()
            .json(json!({ "error": "No fee schedule for this route" }))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_student_payments(
    backend: web::Data<RemoteBackend>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let student_id = path.into_inner();
    match backend.payments_for_student(&student_id).await {
        Ok(payments) => Ok(HttpResponse::Ok().json(payments)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn record_payment(
    backend: web::Data<RemoteBackend>,
    req: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse, Error> {
    match backend.record_payment(&req).await {
        Ok(payment) => Ok(HttpResponse::Created().json(payment)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_payment_invoice(
    backend: web::Data<RemoteBackend>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let payment_id = path.into_inner();
    match backend.invoice_for_payment(&payment_id).await {
        Ok(invoice) => Ok(HttpResponse::Ok().json(invoice)),
        Err(BackendError::RowCount(0)) => Ok(HttpResponse::NotFound()
            .json(json!({ "error": "No invoice for this payment" }))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}
