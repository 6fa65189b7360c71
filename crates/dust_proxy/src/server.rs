use std::sync::Arc;

use actix_web::{middleware::DefaultHeaders, web, App, HttpServer};
use dust_client::{mask_secret, DustClient, DustClientTrait, DustConfig};
use log::{error, info, warn};

use crate::config::ProxyConfig;
use crate::controllers::{proxy_controller, system_controller};
use crate::error::AppError;
use crate::middleware::TracingMiddleware;

const DEFAULT_WORKER_COUNT: usize = 4;

/// Shared, read-only state handed to every request.
pub struct AppState {
    /// `None` when credentials were missing at startup.
    pub dust_client: Option<Arc<dyn DustClientTrait>>,
    pub config: ProxyConfig,
}

impl AppState {
    pub fn new(dust_client: Option<Arc<dyn DustClientTrait>>, config: ProxyConfig) -> Self {
        Self {
            dust_client,
            config,
        }
    }

    /// Build the real Dust client from loaded credentials, if any.
    pub fn from_dust_config(
        dust_config: Option<DustConfig>,
        config: ProxyConfig,
    ) -> anyhow::Result<Self> {
        let dust_client = match dust_config {
            Some(dust_config) => {
                info!(
                    "Dust workspace {} via {} (key {})",
                    dust_config.workspace_id,
                    dust_config.api_base,
                    mask_secret(&dust_config.api_key)
                );
                let client: Arc<dyn DustClientTrait> = Arc::new(DustClient::new(dust_config)?);
                Some(client)
            }
            None => {
                warn!("Dust credentials missing, proxy requests will fail until configured");
                None
            }
        };
        Ok(Self::new(dust_client, config))
    }
}

/// Permissive CORS headers stamped on every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            warn!("Rejecting request body: {}", err);
            AppError::InvalidBody(err.to_string()).into()
        })
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    proxy_controller::config(cfg);
    system_controller::config(cfg);
}

pub async fn run(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors_headers())
            .wrap(TracingMiddleware)
            .configure(app_config)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind((host, port))
    .map_err(|e| {
        error!("Failed to bind {}:{}: {}", host, port, e);
        e
    })?
    .run();

    info!("Dust proxy listening on http://{host}:{port}");

    server.await.map_err(|e| {
        error!("Web server error: {}", e);
        e
    })
}
