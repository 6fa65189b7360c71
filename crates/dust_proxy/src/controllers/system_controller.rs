use actix_web::{http::Method, web, HttpRequest, HttpResponse, Responder};

use crate::dto::StatusResponse;
use crate::error::AppError;

async fn status() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        status: "ok",
        message: "Dust Figma Proxy is running",
    })
}

/// Preflight requests succeed on every path; anything else unmatched is a 404.
pub async fn fallback(req: HttpRequest) -> Result<HttpResponse, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(HttpResponse::Ok().finish());
    }
    log::debug!("No route for {} {}", req.method(), req.path());
    Err(AppError::NotFound)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(status))
            .default_service(web::to(fallback)),
    )
    .default_service(web::to(fallback));
}
