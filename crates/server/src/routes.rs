use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use configs::AppConfig;
use service::resource::ResourceService;
use service::store::{InventoryAggregates, RecordStore};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::handlers;
use crate::middleware::{cors_layer, rate_limit, with_security_headers, RateLimiter};
use crate::state::AppState;

/// `GET|POST /` and `PUT|DELETE /:id` for one resource.
pub fn resource_routes<S: RecordStore>(svc: ResourceService<S>) -> Router {
    Router::new()
        .route("/", get(handlers::list::<S>).post(handlers::create::<S>))
        .route("/:id", axum::routing::put(handlers::update::<S>).delete(handlers::delete::<S>))
        .with_state(svc)
}

pub fn stats_routes<A>(store: Arc<A>) -> Router
where
    A: InventoryAggregates + 'static,
{
    Router::new().route("/api/stats", get(handlers::stats::<A>)).with_state(store)
}

/// All `/api` routes, without the outer layers.
pub fn api_routes(state: &AppState) -> Router {
    Router::new()
        .nest("/api/users", resource_routes(state.users.clone()))
        .nest("/api/products", resource_routes(state.products.clone()))
        .merge(stats_routes(Arc::clone(state.products.store())))
}

/// Build the full application router: API, health check, optional static
/// assets, plus CORS, security headers, rate limiting and request tracing.
pub fn build_router(state: &AppState, config: &AppConfig, serve_static: bool) -> Router {
    let limiter = RateLimiter::from_config(&config.security.rate_limit);
    let api = api_routes(state).layer(middleware::from_fn_with_state(limiter, rate_limit));

    let mut app = Router::new().route("/health", get(handlers::health)).merge(api);

    if serve_static {
        if let Some(dir) = &config.server.static_dir {
            app = app.fallback_service(ServeDir::new(dir));
        }
    }

    with_security_headers(app)
        .layer(cors_layer(&config.security.cors_origins))
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx are already logged at error level by ApiError
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::WARN),
                )
        )
}
