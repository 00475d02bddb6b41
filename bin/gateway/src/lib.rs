pub mod background_tasks;
mod consts;
mod handler;
mod http_utils;
mod logger;
mod pipeline;
mod reporting;
mod shared_state;

use std::sync::Arc;

use crate::{
    background_tasks::BackgroundTasksManager,
    consts::GATEWAY_VERSION,
    http_utils::probes::health_check_handler,
    logger::configure_logging,
    pipeline::gateway_request_handler,
    reporting::{init_collector_agent, CollectorSink},
};

pub use crate::{
    handler::{BooksHandler, GatewayHandler},
    pipeline::{classify::Fault, context::RequestContext},
    shared_state::GatewaySharedState,
};

use faultline_config::{load_config, GatewayConfig};
use ntex::{
    util::Bytes,
    web::{self, HttpRequest},
};
use tracing::info;

async fn graphql_endpoint_handler(
    request: HttpRequest,
    body_bytes: Bytes,
    app_state: web::types::State<Arc<GatewaySharedState>>,
) -> impl web::Responder {
    gateway_request_handler(&request, body_bytes, app_state.get_ref()).await
}

pub async fn gateway_entrypoint(
    handler: Arc<dyn GatewayHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("GATEWAY_CONFIG_FILE_PATH").ok();
    let gateway_config = load_config(config_path)?;
    configure_logging(&gateway_config.log);
    info!("faultline-gateway@{} starting...", GATEWAY_VERSION);
    let addr = gateway_config.http.address();
    let mut bg_tasks_manager = BackgroundTasksManager::new();
    let shared_state = configure_app_from_config(gateway_config, handler, &mut bg_tasks_manager)?;

    let maybe_error = web::HttpServer::new(move || {
        let shared_state = shared_state.clone();
        async move {
            web::App::new()
                .state(shared_state.clone())
                .configure(|service_config| {
                    configure_ntex_app(service_config, &shared_state.config);
                })
        }
    })
    .bind(addr)?
    .run()
    .await
    .map_err(|err| err.into());

    info!("server stopped, clearing background tasks");
    bg_tasks_manager.shutdown();

    maybe_error
}

pub fn configure_app_from_config(
    gateway_config: GatewayConfig,
    handler: Arc<dyn GatewayHandler>,
    bg_tasks_manager: &mut BackgroundTasksManager,
) -> Result<Arc<GatewaySharedState>, Box<dyn std::error::Error>> {
    let reporting_enabled = gateway_config.reporting.enabled;
    let shared_state = Arc::new(GatewaySharedState::new(Arc::new(gateway_config), handler));

    if reporting_enabled {
        let agent = init_collector_agent(bg_tasks_manager, &shared_state.config.reporting)?;
        shared_state
            .reporting
            .install(Box::new(CollectorSink::new(agent)));
        info!("error reporting enabled");
    } else {
        info!("error reporting disabled, failures stay in local logs");
    }

    Ok(shared_state)
}

pub fn configure_ntex_app(
    service_config: &mut web::ServiceConfig,
    gateway_config: &GatewayConfig,
) {
    service_config
        .route(
            &gateway_config.http.graphql_endpoint,
            web::to(graphql_endpoint_handler),
        )
        .route("/health", web::to(health_check_handler));
}
