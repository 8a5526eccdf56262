//! Configuration loading and validation.

mod app_config;

pub use app_config::{
    AppConfig, BackendConfig, RetiredKeyConfig, ServerConfig, SessionConfig, SigningKeyConfig,
    TokenConfig,
};
pub(crate) use app_config::resolve_pem;

use std::env;
use std::path::Path;

use crate::error::{GatewayError, Result};

/// Load and validate the configuration file for the current environment.
///
/// The file is `config/gateway.{RUST_ENV}.toml`, defaulting to `dev`.
pub fn load_config() -> Result<AppConfig> {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    let config_file = format!("config/gateway.{env}.toml");

    if !Path::new(&config_file).exists() {
        return Err(GatewayError::config(format!(
            "configuration file not found: {config_file}"
        )));
    }

    let config_content = std::fs::read_to_string(&config_file).map_err(|e| {
        GatewayError::config_with_source(
            format!("failed to read configuration file: {config_file}"),
            e,
        )
    })?;

    parse_config(&config_content)
}

/// Parse and validate a TOML configuration document.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [backend]
        origin = "http://127.0.0.1:4001"

        [session]
        provider_origin = "http://127.0.0.1:4001"

        [token]
        issuer = "http://localhost:3000"
        audience = "docstore"

        [token.key]
        kid = "key-1"
        private_key_file = "keys/private.pem"
        public_key_file = "keys/public.pem"
    "#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.prefixes, vec!["/api/auth", "/api/v1"]);
        assert_eq!(config.session.session_path, "/api/auth/get-session");
        assert_eq!(config.token.expires_in_secs, 3600);
        assert_eq!(config.token.key.algorithm, "RS256");
        assert!(config.token.retired_keys.is_empty());
    }

    #[test]
    fn missing_signing_key_is_fatal() {
        let without_key = MINIMAL.replace("private_key_file = \"keys/private.pem\"\n", "");
        let err = parse_config(&without_key).unwrap_err();
        assert!(matches!(err, GatewayError::Config { .. }));
        assert!(err.to_string().contains("signing key"));
    }

    #[test]
    fn missing_backend_origin_is_fatal() {
        let broken = MINIMAL.replace("origin = \"http://127.0.0.1:4001\"\n\n        [session]", "origin = \"not a url\"\n\n        [session]");
        let err = parse_config(&broken).unwrap_err();
        assert!(matches!(err, GatewayError::Config { .. }));
        assert!(err.to_string().contains("backend origin"));
    }

    #[test]
    fn rejects_bad_prefix() {
        let mut config = parse_config(MINIMAL).unwrap();
        config.backend.prefixes = vec!["api/v1".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("prefix"));
    }
}
