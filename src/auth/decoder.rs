use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{Principal, Role, TokenClaims};
use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::error::TokenError;

/// base64url that accepts payload segments with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How much of a token the decoder checks before trusting its payload.
#[derive(Clone)]
pub enum VerificationMode {
    /// HS256 signature and `exp` are both checked; `exp` is required.
    Verified { secret: String, leeway_secs: u64 },
    /// Payload extraction only. Tokens signed with any key, or already
    /// expired, decode as long as the payload is well formed.
    PayloadOnly,
}

impl std::fmt::Debug for VerificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationMode::Verified { leeway_secs, .. } => f
                .debug_struct("Verified")
                .field("secret", &"<redacted>")
                .field("leeway_secs", leeway_secs)
                .finish(),
            VerificationMode::PayloadOnly => f.write_str("PayloadOnly"),
        }
    }
}

impl VerificationMode {
    pub fn from_config(security: &SecurityConfig) -> Self {
        if security.verify_tokens {
            VerificationMode::Verified {
                secret: security.jwt_secret.clone(),
                leeway_secs: security.leeway_secs,
            }
        } else {
            VerificationMode::PayloadOnly
        }
    }
}

enum Strategy {
    Verified { key: DecodingKey, validation: Validation },
    PayloadOnly,
}

/// Turns a raw bearer token into a [`Principal`].
pub struct TokenDecoder {
    strategy: Strategy,
}

impl TokenDecoder {
    pub fn new(mode: VerificationMode) -> Result<Self, TokenError> {
        let strategy = match mode {
            VerificationMode::Verified { secret, leeway_secs } => {
                if secret.is_empty() {
                    return Err(TokenError::EmptySecret);
                }

                let mut validation = Validation::new(Algorithm::HS256);
                validation.leeway = leeway_secs;
                validation.validate_exp = true;
                validation.set_required_spec_claims(&["exp"]);

                Strategy::Verified {
                    key: DecodingKey::from_secret(secret.as_bytes()),
                    validation,
                }
            }
            VerificationMode::PayloadOnly => Strategy::PayloadOnly,
        };

        Ok(Self { strategy })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(VerificationMode::from_config(security))
    }

    pub fn verifies_signatures(&self) -> bool {
        matches!(self.strategy, Strategy::Verified { .. })
    }

    /// Decode a token. Any structural, encoding, claim, signature or expiry
    /// problem is an error; a partial principal is never returned.
    pub fn decode(&self, token: &str) -> Result<Principal, TokenError> {
        let payload = payload_segment(token)?;

        let claims = match &self.strategy {
            Strategy::Verified { key, validation } => decode::<TokenClaims>(token, key, validation)?.claims,
            Strategy::PayloadOnly => {
                let bytes = PAYLOAD_ENGINE
                    .decode(payload)
                    .map_err(|_| TokenError::InvalidBase64)?;
                serde_json::from_slice::<TokenClaims>(&bytes)?
            }
        };

        Ok(Principal::new(claims.id, claims.role, claims.company_id))
    }
}

fn payload_segment(token: &str) -> Result<&str, TokenError> {
    let mut segments = token.split('.');
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => Ok(payload),
        _ => Err(TokenError::Malformed),
    }
}

/// Mints HS256 identity tokens with the same secret the decoder verifies.
pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        if lifetime <= Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.jwt_secret, lifetime_from_hours(security.jwt_expiry_hours)?)
    }

    pub fn mint(&self, id: i64, role: Role, company_id: Option<i64>) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.lifetime)
            .ok_or(TokenError::InvalidLifetime)?;

        self.sign(&TokenClaims {
            id,
            role,
            company_id,
            iat: Some(now.timestamp()),
            exp: Some(expires.timestamp()),
        })
    }

    /// Sign caller-built claims as-is, including any `exp` they carry.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.key)?)
    }
}

fn lifetime_from_hours(hours: u64) -> Result<Duration, TokenError> {
    if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
        return Err(TokenError::InvalidLifetime);
    }
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or(TokenError::InvalidLifetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn verified() -> TokenDecoder {
        TokenDecoder::new(VerificationMode::Verified {
            secret: SECRET.to_string(),
            leeway_secs: 0,
        })
        .unwrap()
    }

    fn payload_only() -> TokenDecoder {
        TokenDecoder::new(VerificationMode::PayloadOnly).unwrap()
    }

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, Duration::hours(1)).unwrap()
    }

    fn unsigned(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            PAYLOAD_ENGINE.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            PAYLOAD_ENGINE.encode(payload)
        )
    }

    fn expired_token(secret: &str) -> String {
        issuer(secret)
            .sign(&TokenClaims {
                id: 5,
                role: Role::Member,
                company_id: Some(3),
                iat: Some(1_000),
                exp: Some(2_000),
            })
            .unwrap()
    }

    #[test]
    fn test_verified_decodes_token_from_matching_issuer() {
        let token = issuer(SECRET).mint(11, Role::CompanyAdmin, Some(1)).unwrap();
        let principal = verified().decode(&token).unwrap();
        assert_eq!(principal.id(), 11);
        assert_eq!(principal.role(), &Role::CompanyAdmin);
        assert_eq!(principal.tenant_id(), Some(1));
    }

    #[test]
    fn test_verified_rejects_wrong_key() {
        let token = issuer("some-other-secret").mint(11, Role::Member, Some(1)).unwrap();
        assert!(matches!(verified().decode(&token), Err(TokenError::Signature)));
    }

    #[test]
    fn test_verified_rejects_expired_token() {
        assert!(matches!(verified().decode(&expired_token(SECRET)), Err(TokenError::Expired)));
    }

    #[test]
    fn test_verified_requires_exp_claim() {
        let token = issuer(SECRET)
            .sign(&TokenClaims { id: 1, role: Role::Member, company_id: Some(1), iat: None, exp: None })
            .unwrap();
        assert!(verified().decode(&token).is_err());
    }

    #[test]
    fn test_payload_only_accepts_wrong_key_and_expired_tokens() {
        let wrong_key = issuer("some-other-secret").mint(11, Role::Member, Some(1)).unwrap();
        assert_eq!(payload_only().decode(&wrong_key).unwrap().tenant_id(), Some(1));

        let expired = expired_token("whatever");
        assert_eq!(payload_only().decode(&expired).unwrap().id(), 5);
    }

    #[test]
    fn test_payload_only_reads_unsigned_payload() {
        let token = unsigned(r#"{"id":3,"role":"MEMBER","company_id":null}"#);
        let principal = payload_only().decode(&token).unwrap();
        assert_eq!(principal.id(), 3);
        assert_eq!(principal.tenant_id(), None);
    }

    #[test]
    fn test_payload_only_accepts_padded_base64() {
        let header = PAYLOAD_ENGINE.encode("{}");
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"id":12,"role":"MEMBER"}"#);
        assert!(payload.ends_with('='));
        let token = format!("{}.{}.sig", header, payload);
        assert!(payload_only().decode(&token).is_ok());
    }

    #[test]
    fn test_structural_failures_in_both_modes() {
        for decoder in [verified(), payload_only()] {
            assert!(matches!(decoder.decode("not-a-token"), Err(TokenError::Malformed)));
            assert!(matches!(decoder.decode("a.b"), Err(TokenError::Malformed)));
            assert!(matches!(decoder.decode("a.b.c.d"), Err(TokenError::Malformed)));
            assert!(matches!(decoder.decode("a..c"), Err(TokenError::Malformed)));
            assert!(decoder.decode("not.a.jwt").is_err());
            assert!(decoder.decode("x.!!!!.y").is_err());
            assert!(decoder.decode(&unsigned("not json")).is_err());
        }
    }

    #[test]
    fn test_payload_only_failure_kinds() {
        let decoder = payload_only();
        assert!(matches!(decoder.decode("x.!!!!.y"), Err(TokenError::InvalidBase64)));
        assert!(matches!(decoder.decode(&unsigned("not json")), Err(TokenError::InvalidJson(_))));
        assert!(matches!(
            decoder.decode(&unsigned(r#"{"role":"MEMBER"}"#)),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_empty_secret_is_refused() {
        let result = TokenDecoder::new(VerificationMode::Verified { secret: String::new(), leeway_secs: 0 });
        assert!(matches!(result, Err(TokenError::EmptySecret)));
        assert!(matches!(TokenIssuer::new("", Duration::hours(1)), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn test_out_of_range_lifetimes_are_refused() {
        let mut security = crate::config::AppConfig::development().security;

        for hours in [0, MAX_JWT_EXPIRY_HOURS + 1, 10_000_000_000_000, u64::MAX] {
            security.jwt_expiry_hours = hours;
            assert!(
                matches!(TokenIssuer::from_config(&security), Err(TokenError::InvalidLifetime)),
                "lifetime of {} hours was accepted",
                hours
            );
        }

        assert!(matches!(TokenIssuer::new(SECRET, Duration::hours(-1)), Err(TokenError::InvalidLifetime)));
        assert!(matches!(TokenIssuer::new(SECRET, Duration::zero()), Err(TokenError::InvalidLifetime)));
    }

    #[test]
    fn test_longest_lifetime_mints_a_token_that_expires_after_issue() {
        let mut security = crate::config::AppConfig::development().security;
        security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;

        let token = TokenIssuer::from_config(&security)
            .unwrap()
            .mint(4, Role::Member, Some(2))
            .unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let claims: TokenClaims = serde_json::from_slice(&PAYLOAD_ENGINE.decode(payload).unwrap()).unwrap();
        let (iat, exp) = (claims.iat.unwrap(), claims.exp.unwrap());
        assert_eq!(exp - iat, MAX_JWT_EXPIRY_HOURS as i64 * 3600);
    }

    #[test]
    fn test_mint_refuses_expiry_past_the_end_of_time() {
        let issuer = TokenIssuer::new(SECRET, Duration::MAX).unwrap();
        assert!(matches!(issuer.mint(1, Role::Member, Some(1)), Err(TokenError::InvalidLifetime)));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let mode = VerificationMode::Verified { secret: SECRET.to_string(), leeway_secs: 5 };
        assert!(!format!("{:?}", mode).contains(SECRET));
    }
}
