use actix_web::HttpResponse;
use serde_json::json;

/// GET /
pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Welcome to the Task API" }))
}

/// GET /health_check
///
/// Liveness probe: 200 with an empty body, no store round-trip.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
