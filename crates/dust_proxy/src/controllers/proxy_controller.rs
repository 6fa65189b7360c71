use actix_web::{http::Method, web, HttpResponse};
use tokio_util::sync::CancellationToken;

use crate::dto::ProxyRequest;
use crate::error::AppError;
use crate::server::AppState;
use crate::services::normalizer;
use crate::services::resolver::build_resolver;

/// `POST /api/proxy`: create a conversation and answer with the assistant's reply.
async fn proxy(
    state: web::Data<AppState>,
    body: web::Json<ProxyRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let kind = body.mode.unwrap_or(state.config.default_resolver);
    let request = body.into_resolution_request()?;

    let client = state.dust_client.clone().ok_or_else(|| {
        log::error!("Dust credentials are not configured, rejecting request");
        AppError::MissingCredentials
    })?;

    log::info!(
        "Prompt received ({} chars) for assistant {}, resolving by {}",
        request.prompt.chars().count(),
        request.assistant_id,
        kind
    );

    let resolver = build_resolver(kind, client, &state.config);

    // Dropping the handler future (client went away) cancels upstream work.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let outcome = resolver
        .resolve(&request, &cancel)
        .await
        .map_err(anyhow::Error::from)?;

    normalizer::into_response(outcome)
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/proxy")
            .route(web::post().to(proxy))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    );
}
