//! Authentication bridge: key material, session resolution, token issuance.

pub mod issuer;
pub mod keys;
pub mod session;

pub use issuer::{BearerClaims, TokenIssuer};
pub use keys::{KeyPair, KeyStore, PublicKeyEntry, PublicKeySet};
pub use session::{Session, SessionProvider, SessionResolver, User};
