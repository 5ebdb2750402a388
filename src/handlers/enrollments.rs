use actix_web::{web, Error, HttpResponse};
use serde_json::json;

use crate::db::RemoteBackend;
use crate::models::{CreateEnrollmentRequest, CreateRouteRequest};

pub async fn get_student_enrollments(
    backend: web::Data<RemoteBackend>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let student_id = path.into_inner();
    match backend.enrollments_for_student(&student_id).await {
        Ok(enrollments) => Ok(HttpResponse::Ok().json(enrollments)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn create_enrollment(
    backend: web::Data<RemoteBackend>,
    req: web::Json<CreateEnrollmentRequest>,
) -> Result<HttpResponse, Error> {
    match backend.create_enrollment(&req).await {
        Ok(enrollment) => Ok(HttpResponse::Created().json(enrollment)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_student_route_requests(
    backend: web::Data<RemoteBackend>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let student_id = path.into_inner();
    match backend.route_requests_for_student(&student_id).await {
        Ok(requests) => Ok(HttpResponse::Ok().json(requests)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn create_route_request(
    backend: web::Data<RemoteBackend>,
    req: web::Json<CreateRouteRequest>,
) -> Result<HttpResponse, Error> {
    match backend.create_route_request(&req).await {
        Ok(request) => Ok(HttpResponse::Created().json(request)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}
