//! Server construction and route wiring.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, guard, web};
use tracing::{info, warn};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::WordListFilter;
use crate::domain::ports::{FeedbackRepository, InMemoryFeedbackRepository};
use crate::inbound::http::api_key::{ApiKey, RequireApiKey};
use crate::inbound::http::feedback::{list_feedback, search_feedback, submit_feedback};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::rate_limit::RateLimit;
use crate::inbound::http::service_info::service_info;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::persistence::{DbPool, DieselFeedbackRepository, PoolConfig, run_migrations};

/// Parameter object bundling everything one worker's app needs.
#[derive(Clone)]
pub struct AppDependencies {
    /// Port bundle the handlers read from.
    pub http_state: web::Data<HttpState>,
    /// Shared probe state.
    pub health_state: web::Data<HealthState>,
    /// Secret guarding the read endpoints.
    pub api_key: ApiKey,
    /// Shared submission rate limiter.
    pub rate_limit: RateLimit,
}

/// Assemble the application: routes, per-resource middleware, tracing.
///
/// The submission resource is rate limited; the two read resources require
/// the API key. Kept separate from [`run`] so tests can drive the exact
/// production wiring in-process.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        health_state,
        api_key,
        rate_limit,
    } = deps;

    let api = web::scope("/api")
        .service(
            web::resource("/feedback")
                .guard(guard::Post())
                .wrap(rate_limit)
                .route(web::post().to(submit_feedback)),
        )
        .service(
            web::resource("/feedback")
                .guard(guard::Get())
                .wrap(RequireApiKey::new(api_key.clone()))
                .route(web::get().to(list_feedback)),
        )
        .service(
            web::resource("/feedback/search")
                .wrap(RequireApiKey::new(api_key))
                .route(web::get().to(search_feedback)),
        );

    let mut app = App::new()
        .app_data(http_state)
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(service_info)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app
}

/// Select the repository implementation from configuration.
///
/// A configured `DATABASE_URL` gets migrations plus the Diesel adapter;
/// otherwise the in-memory store backs the service, which suits local runs
/// and tests.
async fn build_repository(config: &AppConfig) -> std::io::Result<Arc<dyn FeedbackRepository>> {
    match &config.database_url {
        Some(url) => {
            run_migrations(url).map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            info!("feedback repository: PostgreSQL");
            Ok(Arc::new(DieselFeedbackRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set; feedback repository: in-memory");
            Ok(Arc::new(InMemoryFeedbackRepository::new()))
        }
    }
}

/// Start the HTTP server and serve until shutdown.
///
/// # Errors
///
/// Returns an [`std::io::Error`] when the repository cannot be prepared or
/// the listen address cannot be bound.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let repository = build_repository(&config).await?;
    let http_state = web::Data::new(HttpState::new(
        repository,
        Arc::new(WordListFilter::new()),
    ));
    let health_state = web::Data::new(HealthState::new());
    let rate_limit = RateLimit::new(config.rate_limit);

    info!(
        bind_addr = %config.bind_addr,
        api_key_fingerprint = %config.api_key.fingerprint(),
        "starting feedback API"
    );

    let deps = AppDependencies {
        http_state,
        health_state: health_state.clone(),
        api_key: config.api_key,
        rate_limit,
    };
    let server = HttpServer::new(move || build_app(deps.clone())).bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
