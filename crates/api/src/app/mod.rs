//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection (in-memory or Postgres) and resource services
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use carehub_auth::{Authenticator, Hs256JwtValidator};

use crate::config::AppConfig;
use crate::middleware::{self, TENANT_HEADER};

pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router> {
    let services = services::build_services(config.database.as_ref()).await?;
    router(Arc::new(services), &config.jwt_secret, &config.cors_origins)
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>, jwt_secret: &str, cors_origins: &[String]) -> Result<Router> {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret));
    let authenticator = Arc::new(Authenticator::new(jwt, Arc::clone(&services.revocations)));
    let auth_state = middleware::AuthState { authenticator };

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)?),
        ))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {o}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(TENANT_HEADER),
        ]))
}
