//! Session resolution against the external authentication provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::COOKIE;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::config::SessionConfig;
use crate::error::{GatewayError, Result};

/// The authenticated user, as reported by the authentication provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Provider-scoped user id.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// A validated session. Either fully valid or absent; never partial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Opaque session identifier.
    pub id: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// The session's user.
    pub user: User,
}

impl Session {
    /// Whether the session has passed its expiry instant.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Capability interface over the external authentication provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Validate the inbound `Cookie` header against the session store.
    ///
    /// `Ok(None)` means "definitively unauthenticated"; errors are
    /// reserved for provider failures (network, malformed response).
    async fn validate_session(&self, cookie_header: Option<&str>) -> Result<Option<Session>>;
}

/// Wire shape of the provider's session endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionEnvelope {
    session: SessionBody,
    user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    id: String,
    expires_at: DateTime<Utc>,
}

/// Session provider backed by the authentication provider's HTTP API.
pub struct HttpSessionProvider {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSessionProvider {
    /// Build a provider from configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let origin = Url::parse(&config.provider_origin)?;
        let endpoint = origin.join(&config.session_path)?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn validate_session(&self, cookie_header: Option<&str>) -> Result<Option<Session>> {
        // No cookie, no lookup.
        let Some(cookie) = cookie_header else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(|e| GatewayError::transport_with_source("session lookup failed", e))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        // The provider answers `null` for anonymous requests.
        let envelope: Option<SessionEnvelope> = response
            .json()
            .await
            .map_err(|e| GatewayError::transport_with_source("malformed session response", e))?;

        Ok(envelope.map(|envelope| Session {
            id: envelope.session.id,
            expires_at: envelope.session.expires_at,
            user: envelope.user,
        }))
    }
}

/// Bridges an inbound request's cookie header to a validated session.
///
/// Never errors for "no session": absence, expiry, and provider outages
/// all resolve to `None` so page rendering can fall back to an
/// unauthenticated view instead of failing the request. No caching and
/// no retry; the provider result is propagated verbatim.
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn SessionProvider>,
}

impl SessionResolver {
    /// Wrap a session provider.
    #[must_use]
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the cookie header to a session, failing closed to `None`.
    pub async fn resolve(&self, cookie_header: Option<&str>) -> Option<Session> {
        match self.provider.validate_session(cookie_header).await {
            Ok(Some(session)) if session.is_expired() => None,
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "session provider unavailable, treating request as unauthenticated"
                );
                None
            }
        }
    }
}
