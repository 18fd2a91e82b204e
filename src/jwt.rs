//! JWT token generation and validation.
//!
//! Two signing domains, each with its own secret and lifetime:
//! - Access tokens: short-lived, trusted without a user lookup
//! - Refresh tokens: long-lived, only used to mint new access tokens
//!
//! Verification distinguishes an expired-but-genuine token from a forged or
//! corrupted one, so callers can attempt renewal only on expiry.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::server_config::AuthSettings;

/// Signing domain of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenDomain {
    Access,
    Refresh,
}

/// JWT claims shared by both domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Signing domain
    #[serde(rename = "typ")]
    pub domain: TokenDomain,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A signed token as produced by [`TokenCodec::issue`].
#[derive(Clone)]
pub struct SignedToken {
    token: String,
    issued_at: u64,
    expires_at: u64,
}

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Seconds the token stays valid after issuance.
    pub fn lifetime(&self) -> u64 {
        self.expires_at - self.issued_at
    }
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedToken")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Access and refresh token issued together at signup or login.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Signature and domain check out, but the expiry has passed.
    #[error("token expired")]
    Expired,
    /// Bad signature, wrong domain or malformed token.
    #[error("invalid token")]
    Invalid,
}

/// Errors that can occur while issuing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("token expiry overflows the clock")]
    ExpiryOverflow,
}

struct DomainKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl DomainKeys {
    fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        }
    }
}

/// Issues and verifies tokens for both signing domains.
pub struct TokenCodec {
    access: DomainKeys,
    refresh: DomainKeys,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(settings: &AuthSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: DomainKeys::new(settings.access_secret(), settings.access_lifetime()),
            refresh: DomainKeys::new(settings.refresh_secret(), settings.refresh_lifetime()),
            clock,
        }
    }

    fn keys(&self, domain: TokenDomain) -> &DomainKeys {
        match domain {
            TokenDomain::Access => &self.access,
            TokenDomain::Refresh => &self.refresh,
        }
    }

    pub fn lifetime(&self, domain: TokenDomain) -> Duration {
        self.keys(domain).lifetime
    }

    /// Sign a token for `subject` in `domain`, valid from now for the domain's lifetime.
    pub fn issue(&self, domain: TokenDomain, subject: &str) -> Result<SignedToken, TokenError> {
        let keys = self.keys(domain);
        let now = self.clock.now();
        let exp = now
            .checked_add(keys.lifetime.as_secs())
            .ok_or(TokenError::ExpiryOverflow)?;

        let claims = Claims {
            sub: subject.to_string(),
            domain,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding_key)?;

        Ok(SignedToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Issue a fresh access and refresh token for `subject`.
    pub fn issue_pair(&self, subject: &str) -> Result<CredentialPair, TokenError> {
        Ok(CredentialPair {
            access: self.issue(TokenDomain::Access, subject)?,
            refresh: self.issue(TokenDomain::Refresh, subject)?,
        })
    }

    /// Verify `token` under `domain` and return its subject.
    ///
    /// Integrity and domain are checked before expiry, so only a genuine token
    /// can come back as [`VerifyError::Expired`]. A token is expired from the
    /// second its `exp` is reached; there is no leeway.
    pub fn verify(&self, domain: TokenDomain, token: &str) -> Result<String, VerifyError> {
        let keys = self.keys(domain);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is compared against the injected clock below.
        validation.validate_exp = false;

        let token_data = jsonwebtoken::decode::<Claims>(token, &keys.decoding_key, &validation)
            .map_err(|_| VerifyError::Invalid)?;
        let claims = token_data.claims;

        if claims.domain != domain {
            return Err(VerifyError::Invalid);
        }

        if self.clock.now() >= claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(claims.sub)
    }
}
