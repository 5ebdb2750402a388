use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use bus_pass::config::AppConfig;
use bus_pass::db::RemoteBackend;
use bus_pass::handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let backend = web::Data::new(RemoteBackend::new(
        &config.backend_url,
        &config.backend_api_key,
    ));

    info!("Starting bus-pass on {}", config.bind_addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(backend.clone())
            .route("/api/auth/login", web::post().to(handlers::auth::login))
            .route(
                "/api/enrollments/{student_id}",
                web::get().to(handlers::enrollments::get_student_enrollments),
            )
            .route(
                "/api/enrollments",
                web::post().to(handlers::enrollments::create_enrollment),
            )
            .route(
                "/api/route-requests/{student_id}",
                web::get().to(handlers::enrollments::get_student_route_requests),
            )
            .route(
                "/api/route-requests",
                web::post().to(handlers::enrollments::create_route_request),
            )
            .route(
                "/api/fees/{route_id}",
                web::get().to(handlers::payments::get_route_fee),
            )
            .route(
                "/api/payments/{student_id}",
                web::get().to(handlers::payments::get_student_payments),
            )
            .route(
                "/api/payments",
                web::post().to(handlers::payments::record_payment),
            )
            .route(
                "/api/payments/{payment_id}/invoice",
                web::get().to(handlers::payments::get_payment_invoice),
            )
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
