//! The gateway's HTTP server: application state, routing, startup.

pub mod handlers;
pub mod response;

use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{any, get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::keys::KeyStore;
use crate::auth::session::{HttpSessionProvider, SessionProvider, SessionResolver};
use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::error::{Context, GatewayError, Result};
use crate::proxy::transport::BackendTransport;
use crate::proxy::{ProxyGateway, select_transport};

/// Everything a request handler needs, built once at startup and shared
/// read-only across requests.
pub struct AppContext {
    /// Validated configuration.
    pub config: AppConfig,
    /// Signing key material.
    pub key_store: Arc<KeyStore>,
    /// Bearer token issuer.
    pub issuer: TokenIssuer,
    /// Session resolver over the external authentication provider.
    pub resolver: SessionResolver,
    /// Request forwarder.
    pub gateway: ProxyGateway,
}

impl AppContext {
    /// Wire the context from validated configuration, using the HTTP
    /// session provider and probing for an in-process backend binding.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let provider: Arc<dyn SessionProvider> =
            Arc::new(HttpSessionProvider::from_config(&config.session)?);
        let origin = config.backend_origin()?;
        let transport = select_transport(&origin, None)?;
        Self::new(config, provider, transport)
    }

    /// Wire the context from explicit collaborators. Tests and embedding
    /// applications inject their own session provider and transport.
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn SessionProvider>,
        transport: Arc<dyn BackendTransport>,
    ) -> Result<Self> {
        let key_store = Arc::new(
            KeyStore::from_config(&config.token).context("loading signing key material")?,
        );
        let issuer = TokenIssuer::new(
            key_store.clone(),
            config.token.issuer.clone(),
            config.token.expires_in_secs,
        );
        let resolver = SessionResolver::new(provider);
        let gateway = ProxyGateway::new(transport, config.backend.forward_edge_headers);

        Ok(Self {
            config,
            key_store,
            issuer,
            resolver,
            gateway,
        })
    }
}

/// Shared application state handed to handlers.
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    #[must_use]
    pub const fn context_arc(&self) -> &Arc<AppContext> {
        &self.context
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// Build the full router: gateway endpoints plus one wildcard proxy
/// route (any method) per configured prefix.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/token", get(handlers::issue_token))
        .route("/api/auth/jwks", get(handlers::public_key_set));

    for prefix in &state.config.backend.prefixes {
        router = router
            .route(prefix, any(handlers::proxy_backend))
            .route(&format!("{prefix}/{{*path}}"), any(handlers::proxy_backend));
    }

    let mut router = router.layer(TraceLayer::new_for_http());
    if state.config.server.enable_cors {
        router = router.layer(build_cors(&state.config.server.cors_origins));
    }

    router.with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(origins).allow_credentials(true)
}

/// Build the context and serve until the process is stopped.
pub async fn run(config: AppConfig) -> Result<()> {
    let context = AppContext::from_config(config)?;
    let state = AppState::new(Arc::new(context));

    let addr = format!(
        "{}:{}",
        state.config.server.bind_address, state.config.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::config_with_source(format!("failed to bind {addr}"), e))?;

    tracing::info!(
        %addr,
        transport = state.gateway.transport_name(),
        backend = %state.config.backend.origin,
        "session gateway listening"
    );

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| GatewayError::internal_with_source("server terminated abnormally", e))?;

    Ok(())
}
