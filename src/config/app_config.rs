//! Application configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GatewayError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend the gateway proxies to.
    pub backend: BackendConfig,
    /// External authentication provider used for session validation.
    pub session: SessionConfig,
    /// Bearer token issuance configuration.
    pub token: TokenConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_address: String,
    /// Listen port.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
    /// Allowed CORS origins (`*` for any).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: false,
            cors_origins: vec![],
        }
    }
}

/// Backend origin and proxied route prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend origin URL, e.g. `http://127.0.0.1:4001`.
    pub origin: String,
    /// Route prefixes forwarded to the backend (any method).
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    /// Inject `X-Forwarded-Host` / `X-Forwarded-Proto` so the backend
    /// sees the public-facing origin instead of the forwarding one.
    #[serde(default = "default_true")]
    pub forward_edge_headers: bool,
}

fn default_prefixes() -> Vec<String> {
    vec!["/api/auth".to_string(), "/api/v1".to_string()]
}

const fn default_true() -> bool {
    true
}

/// External authentication provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Origin of the authentication provider.
    pub provider_origin: String,
    /// Path of the session validation endpoint on the provider.
    #[serde(default = "default_session_path")]
    pub session_path: String,
}

fn default_session_path() -> String {
    "/api/auth/get-session".to_string()
}

/// Bearer token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// `iss` claim value.
    pub issuer: String,
    /// `aud` claim value for the downstream token-verifying backend.
    pub audience: String,
    /// Token lifetime in seconds. Fixed; callers cannot override it.
    #[serde(default = "default_expires_in")]
    pub expires_in_secs: i64,
    /// Active signing key.
    pub key: SigningKeyConfig,
    /// Public keys of rotated-out signing keys, retained until no
    /// unexpired token could still reference them.
    #[serde(default)]
    pub retired_keys: Vec<RetiredKeyConfig>,
}

const fn default_expires_in() -> i64 {
    3600
}

/// The active asymmetric signing key. Either inline PEM or a file path
/// must be supplied for both the private and the public component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningKeyConfig {
    /// Key identifier, embedded in token headers.
    pub kid: String,
    /// Signing algorithm name.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Inline private key PEM.
    pub private_key_pem: Option<String>,
    /// Path to the private key PEM file.
    pub private_key_file: Option<PathBuf>,
    /// Inline public key PEM.
    pub public_key_pem: Option<String>,
    /// Path to the public key PEM file.
    pub public_key_file: Option<PathBuf>,
}

fn default_algorithm() -> String {
    "RS256".to_string()
}

/// A rotated-out key whose public component is still published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetiredKeyConfig {
    /// Key identifier.
    pub kid: String,
    /// Signing algorithm name.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Inline public key PEM.
    pub public_key_pem: Option<String>,
    /// Path to the public key PEM file.
    pub public_key_file: Option<PathBuf>,
}

/// Resolve PEM material that may be inline or a file path.
pub(crate) fn resolve_pem(
    what: &str,
    inline: Option<&str>,
    file: Option<&PathBuf>,
) -> Result<String> {
    match (inline, file) {
        (Some(pem), _) => Ok(pem.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            GatewayError::config_with_source(
                format!("failed to read {what} from {}", path.display()),
                e,
            )
        }),
        (None, None) => Err(GatewayError::config(format!("{what} is not configured"))),
    }
}

impl AppConfig {
    /// Validate the configuration. Called once at startup; failure is fatal.
    pub fn validate(&self) -> Result<()> {
        crate::ensure_config!(self.server.port != 0, "server port must not be 0");

        let origin = Url::parse(&self.backend.origin)
            .map_err(|e| GatewayError::config_with_source("invalid backend origin", e))?;
        crate::ensure_config!(
            matches!(origin.scheme(), "http" | "https"),
            "backend origin must be http or https: {}",
            self.backend.origin
        );

        crate::ensure_config!(!self.backend.prefixes.is_empty(), "no proxy prefixes configured");
        for prefix in &self.backend.prefixes {
            crate::ensure_config!(
                prefix.starts_with('/') && !prefix.ends_with('/') && prefix.len() > 1,
                "proxy prefix must start with '/' and not end with '/': {prefix}"
            );
        }

        Url::parse(&self.session.provider_origin)
            .map_err(|e| GatewayError::config_with_source("invalid session provider origin", e))?;

        crate::ensure_config!(!self.token.issuer.is_empty(), "token issuer must not be empty");
        crate::ensure_config!(!self.token.audience.is_empty(), "token audience must not be empty");
        crate::ensure_config!(
            self.token.expires_in_secs > 0,
            "token expiry must be positive"
        );
        crate::ensure_config!(!self.token.key.kid.is_empty(), "signing key kid must not be empty");
        crate::ensure_config!(
            self.token.key.private_key_pem.is_some() || self.token.key.private_key_file.is_some(),
            "signing key is not configured (private_key_pem or private_key_file required)"
        );
        crate::ensure_config!(
            self.token.key.public_key_pem.is_some() || self.token.key.public_key_file.is_some(),
            "signing public key is not configured"
        );
        for retired in &self.token.retired_keys {
            crate::ensure_config!(!retired.kid.is_empty(), "retired key kid must not be empty");
            crate::ensure_config!(
                retired.public_key_pem.is_some() || retired.public_key_file.is_some(),
                "retired key {} has no public key material",
                retired.kid
            );
        }

        Ok(())
    }

    /// Parsed backend origin. Only valid after `validate()`.
    pub fn backend_origin(&self) -> Result<Url> {
        Ok(Url::parse(&self.backend.origin)?)
    }
}
