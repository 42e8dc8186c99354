//! Tenant-isolation gateway.
//!
//! Every request is classified by path, its bearer token (if any) is decoded
//! into a principal, and the access rules in [`policy`] produce exactly one
//! [`Decision`]. The axum wiring lives in [`crate::middleware::gateway`].

pub mod identity;
pub mod policy;
pub mod routes;
pub mod token;

use axum::http::HeaderMap;

use crate::auth::{TokenDecoder, VerificationMode};
use crate::config::SecurityConfig;
use crate::error::{ConfigError, TokenError};

pub use identity::{TrustedIdentity, COMPANY_ID_HEADER, IDENTITY_HEADERS, USER_ID_HEADER, USER_ROLE_HEADER};
pub use policy::{Credential, Decision, Rejection};
pub use routes::{PathKind, RouteClass};

/// Stateless authorization decision function. Immutable once built; share it
/// behind an `Arc`.
pub struct Gateway {
    decoder: TokenDecoder,
    cookie_name: String,
}

impl Gateway {
    pub fn new(decoder: TokenDecoder, cookie_name: impl Into<String>) -> Self {
        Self {
            decoder,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, ConfigError> {
        let mode = VerificationMode::from_config(security);
        if matches!(mode, VerificationMode::PayloadOnly) {
            tracing::warn!("token signature and expiry verification is DISABLED (SECURITY_JWT_VERIFY=false)");
        }

        let decoder = TokenDecoder::new(mode).map_err(|e| match e {
            TokenError::EmptySecret => ConfigError::MissingSecret,
            other => ConfigError::InvalidValue {
                name: "JWT_SECRET",
                reason: other.to_string(),
            },
        })?;

        Ok(Self::new(decoder, security.token_cookie.clone()))
    }

    pub fn decoder(&self) -> &TokenDecoder {
        &self.decoder
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Work out what the caller presented. Decode failures are logged at
    /// debug with their reason; the caller only ever sees "Invalid token".
    pub fn authenticate(&self, headers: &HeaderMap) -> Credential {
        let Some(token) = token::extract_token(headers, &self.cookie_name) else {
            return Credential::Absent;
        };

        match self.decoder.decode(token.value) {
            Ok(principal) => Credential::Valid(principal),
            Err(e) => {
                tracing::debug!(source = ?token.source, reason = %e, "rejecting undecodable token");
                Credential::Invalid
            }
        }
    }

    /// Decide the fate of a request for `path` carrying `headers`.
    pub fn evaluate(&self, path: &str, headers: &HeaderMap) -> Decision {
        let class = routes::classify(path);

        // Same outcome as the first policy rule, taken before extraction so
        // public paths never touch the token. Keep it ahead of authenticate().
        if class == RouteClass::Public {
            return Decision::PassThrough;
        }

        policy::evaluate(class, PathKind::of(path), self.authenticate(headers))
    }
}
