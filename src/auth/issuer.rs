//! Bearer token issuance.
//!
//! Converts a validated session into a signed, short-lived token for a
//! named downstream audience.

use chrono::Utc;
use jsonwebtoken::{Header, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::keys::KeyStore;
use crate::auth::session::Session;
use crate::error::Result;

/// The full claim set of an issued token.
///
/// The user-derived claims are whitelisted to email and display name;
/// nothing else from the session or the request may be embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BearerClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
}

/// Issues bearer tokens signed with the active key pair.
pub struct TokenIssuer {
    key_store: Arc<KeyStore>,
    issuer: String,
    expires_in_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer. The expiry is fixed here; callers cannot
    /// request longer-lived tokens.
    #[must_use]
    pub fn new(key_store: Arc<KeyStore>, issuer: impl Into<String>, expires_in_secs: i64) -> Self {
        Self {
            key_store,
            issuer: issuer.into(),
            expires_in_secs,
        }
    }

    /// Issue a token for `audience` from a validated session.
    ///
    /// The caller is responsible for session expiry (the resolver never
    /// hands out expired sessions); a missing session is rejected with an
    /// unauthorized error. Issuance is pure: calling twice produces two
    /// independently valid tokens.
    pub fn issue(&self, session: Option<&Session>, audience: &str) -> Result<String> {
        let session = session.ok_or_else(|| crate::auth_error!("no valid session"))?;

        let now = Utc::now().timestamp();
        let claims = BearerClaims {
            sub: session.user.id.clone(),
            iss: self.issuer.clone(),
            aud: audience.to_string(),
            iat: now,
            exp: now + self.expires_in_secs,
            email: session.user.email.clone(),
            name: session.user.name.clone(),
        };

        let key = self.key_store.active_key_pair();
        let mut header = Header::new(key.algorithm);
        header.kid = Some(key.kid.clone());

        Ok(encode(&header, &claims, &key.encoding_key)?)
    }
}
