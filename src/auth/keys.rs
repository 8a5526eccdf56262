//! Key material store.
//!
//! Holds the active asymmetric signing key and publishes the public
//! components verifiers need to resolve a `kid`, including keys that
//! were rotated out but could still have signed an unexpired token.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::config::resolve_pem;
use crate::error::{GatewayError, Result};

/// The active signing key pair.
#[derive(Debug)]
pub struct KeyPair {
    /// Key identifier, embedded in token headers.
    pub kid: String,
    /// Signing algorithm.
    pub algorithm: Algorithm,
    /// Private component, ready for signing.
    pub encoding_key: EncodingKey,
    /// Public component PEM, published in the key set.
    pub public_key_pem: String,
}

/// One entry of the published key set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyEntry {
    /// Key identifier.
    pub kid: String,
    /// Signing algorithm name.
    pub alg: String,
    /// Key usage, always `sig`.
    #[serde(rename = "use")]
    pub usage: String,
    /// Public key PEM.
    pub public_key_pem: String,
}

/// The JWKS-like public key document, keyed by `kid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeySet {
    /// All public keys a verifier may need.
    pub keys: Vec<PublicKeyEntry>,
}

impl PublicKeySet {
    /// Resolve a `kid` to its public key entry.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&PublicKeyEntry> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// Immutable store of signing key material.
///
/// Constructed once at startup from configuration and shared read-only;
/// rotation is a configuration change plus a restart.
#[derive(Debug)]
pub struct KeyStore {
    active: KeyPair,
    retired: Vec<PublicKeyEntry>,
}

impl KeyStore {
    /// Build the store from configuration.
    ///
    /// Fails with a configuration error when key material is missing,
    /// unparseable, or when the configured public key does not match the
    /// private key (detected by a sign/verify canary).
    pub fn from_config(config: &TokenConfig) -> Result<Self> {
        let key = &config.key;
        let algorithm = parse_algorithm(&key.algorithm)?;

        let private_pem = resolve_pem(
            "signing key",
            key.private_key_pem.as_deref(),
            key.private_key_file.as_ref(),
        )?;
        let public_pem = resolve_pem(
            "signing public key",
            key.public_key_pem.as_deref(),
            key.public_key_file.as_ref(),
        )?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| GatewayError::config_with_source("invalid signing key PEM", e))?;

        let active = KeyPair {
            kid: key.kid.clone(),
            algorithm,
            encoding_key,
            public_key_pem: public_pem,
        };
        verify_canary(&active)?;

        let mut retired = Vec::with_capacity(config.retired_keys.len());
        for entry in &config.retired_keys {
            let algorithm = parse_algorithm(&entry.algorithm)?;
            let pem = resolve_pem(
                &format!("retired key {}", entry.kid),
                entry.public_key_pem.as_deref(),
                entry.public_key_file.as_ref(),
            )?;
            DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                GatewayError::config_with_source(
                    format!("invalid public key PEM for retired key {}", entry.kid),
                    e,
                )
            })?;
            retired.push(PublicKeyEntry {
                kid: entry.kid.clone(),
                alg: algorithm_name(algorithm).to_string(),
                usage: "sig".to_string(),
                public_key_pem: pem,
            });
        }

        Ok(Self { active, retired })
    }

    /// The currently active key pair.
    #[must_use]
    pub fn active_key_pair(&self) -> &KeyPair {
        &self.active
    }

    /// All public keys whose private counterpart could have signed a
    /// still-unexpired token: the active key plus retired keys.
    #[must_use]
    pub fn public_key_set(&self) -> PublicKeySet {
        let mut keys = Vec::with_capacity(1 + self.retired.len());
        keys.push(PublicKeyEntry {
            kid: self.active.kid.clone(),
            alg: algorithm_name(self.active.algorithm).to_string(),
            usage: "sig".to_string(),
            public_key_pem: self.active.public_key_pem.clone(),
        });
        keys.extend(self.retired.iter().cloned());
        PublicKeySet { keys }
    }
}

/// Parse a configured algorithm name. Only the RSA family is supported.
fn parse_algorithm(name: &str) -> Result<Algorithm> {
    match name {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(GatewayError::config(format!(
            "unsupported signing algorithm: {other}"
        ))),
    }
}

/// Canonical name of an algorithm for the published key set.
const fn algorithm_name(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        _ => "RS256",
    }
}

#[derive(Serialize, Deserialize)]
struct CanaryClaims {
    sub: String,
    exp: i64,
}

/// Sign and verify a throwaway token so a mismatched public/private pair
/// fails at startup instead of at first verification downstream.
fn verify_canary(pair: &KeyPair) -> Result<()> {
    let claims = CanaryClaims {
        sub: "canary".to_string(),
        exp: chrono::Utc::now().timestamp() + 60,
    };
    let mut header = Header::new(pair.algorithm);
    header.kid = Some(pair.kid.clone());
    let token = encode(&header, &claims, &pair.encoding_key)
        .map_err(|e| GatewayError::config_with_source("signing key is unusable", e))?;

    let decoding_key = DecodingKey::from_rsa_pem(pair.public_key_pem.as_bytes())
        .map_err(|e| GatewayError::config_with_source("invalid signing public key PEM", e))?;
    let mut validation = Validation::new(pair.algorithm);
    validation.validate_aud = false;
    decode::<CanaryClaims>(&token, &decoding_key, &validation).map_err(|e| {
        GatewayError::config_with_source(
            "signing public key does not match the private key",
            e,
        )
    })?;
    Ok(())
}
