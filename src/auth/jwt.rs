/// JWT Token Generation and Validation

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::auth::claims::Claims;
use crate::auth::keys::SigningKey;
use crate::error::{AppError, AuthError};

/// Mints signed, time-limited access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl TokenIssuer {
    pub fn new(key: &SigningKey) -> Self {
        Self {
            encoding_key: key.encoding_key(),
            algorithm: key.algorithm(),
        }
    }

    /// Mint a token for `subject` valid for `ttl` from now
    ///
    /// # Errors
    /// Returns `AppError::Internal` if `ttl` overflows the expiry or encoding fails
    pub fn mint(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        self.mint_at(subject, claims, ttl, Utc::now())
    }

    pub fn mint_at(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(subject, claims, ttl, now).ok_or_else(|| {
            AppError::Internal(format!("Token lifetime {} overflows the expiry timestamp", ttl))
        })?;

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Checks signature then expiry, in that order
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(key: &SigningKey, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(key.algorithm());
        // Expiry is enforced below, after the signature has been checked,
        // with an exact `now >= exp` comparison.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            decoding_key: key.decoding_key(),
            validation,
            leeway_seconds,
        }
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    /// * `MalformedToken` - token structure, encoding or algorithm is wrong
    /// * `BadSignature` - signature does not match header and claims
    /// * `Expired` - current time is at or past `exp` (plus leeway)
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT rejected");
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        if data.claims.is_expired_at(now.timestamp(), self.leeway_seconds) {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn key() -> SigningKey {
        SigningKey::new(SECRET, "HS256").unwrap()
    }

    fn role_claims(role: &str) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("role".to_string(), json!(role));
        claims
    }

    /// Header and signature of `signed`, claims of `claims_from`.
    fn splice(signed: &str, claims_from: &str) -> String {
        let signed: Vec<&str> = signed.split('.').collect();
        let other: Vec<&str> = claims_from.split('.').collect();
        format!("{}.{}.{}", signed[0], other[1], signed[2])
    }

    #[test]
    fn test_generate_and_validate_token() {
        let key = key();
        let issuer = TokenIssuer::new(&key);
        let verifier = TokenVerifier::new(&key, 0);

        let token = issuer
            .mint("alice", role_claims("admin"), Duration::minutes(30))
            .expect("Failed to generate token");
        let claims = verifier.validate(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role(), Some("admin"));
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_token_is_three_dot_separated_parts() {
        let token = TokenIssuer::new(&key())
            .mint("alice", Map::new(), Duration::minutes(1))
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_repeated_mints_differ() {
        let issuer = TokenIssuer::new(&key());
        let a = issuer.mint("alice", Map::new(), Duration::minutes(1)).unwrap();
        let b = issuer.mint("alice", Map::new(), Duration::minutes(1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unrepresentable_ttl_is_an_error() {
        let issuer = TokenIssuer::new(&key());

        let result = issuer.mint("alice", Map::new(), Duration::MAX);

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_expired_at_ttl_boundary() {
        let key = key();
        let issuer = TokenIssuer::new(&key);
        let verifier = TokenVerifier::new(&key, 0);
        let issued = Utc::now();
        let ttl = Duration::minutes(20);

        let token = issuer.mint_at("alice", Map::new(), ttl, issued).unwrap();

        assert!(verifier.validate_at(&token, issued + ttl - Duration::seconds(1)).is_ok());
        assert_eq!(
            verifier.validate_at(&token, issued + ttl),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_expired_when_minted_in_the_past() {
        let key = key();
        let issuer = TokenIssuer::new(&key);
        let verifier = TokenVerifier::new(&key, 0);

        let token = issuer
            .mint_at("alice", Map::new(), Duration::minutes(30), Utc::now() - Duration::hours(1))
            .unwrap();

        assert_eq!(verifier.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_leeway_extends_expiry() {
        let key = key();
        let issuer = TokenIssuer::new(&key);
        let verifier = TokenVerifier::new(&key, 5);
        let issued = Utc::now();
        let ttl = Duration::seconds(60);

        let token = issuer.mint_at("alice", Map::new(), ttl, issued).unwrap();

        assert!(verifier.validate_at(&token, issued + ttl).is_ok());
        assert_eq!(
            verifier.validate_at(&token, issued + ttl + Duration::seconds(5)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_altered_claims_fail_signature() {
        let issuer = TokenIssuer::new(&key());
        let verifier = TokenVerifier::new(&key(), 0);

        let alice = issuer.mint("alice", role_claims("user"), Duration::minutes(5)).unwrap();
        let mallory = issuer.mint("mallory", role_claims("admin"), Duration::minutes(5)).unwrap();

        let tampered = splice(&alice, &mallory);
        assert_eq!(verifier.validate(&tampered), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_tampered_signature() {
        let issuer = TokenIssuer::new(&key());
        let verifier = TokenVerifier::new(&key(), 0);

        let token = issuer.mint("alice", Map::new(), Duration::minutes(5)).unwrap();
        let other = issuer.mint("alice", Map::new(), Duration::minutes(5)).unwrap();

        let other_signature = other.rsplit('.').next().unwrap();
        let (message, _) = token.rsplit_once('.').unwrap();
        let swapped = format!("{}.{}", message, other_signature);
        assert_eq!(verifier.validate(&swapped), Err(AuthError::BadSignature));

        assert!(verifier.validate(&format!("{}X", token)).is_err());
    }

    #[test]
    fn test_wrong_key() {
        let other = SigningKey::new("another-secret-key-at-least-32-chars!", "HS256").unwrap();
        let token = TokenIssuer::new(&other)
            .mint("alice", Map::new(), Duration::minutes(5))
            .unwrap();

        assert_eq!(
            TokenVerifier::new(&key(), 0).validate(&token),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let other = SigningKey::new("another-secret-key-at-least-32-chars!", "HS256").unwrap();
        let token = TokenIssuer::new(&other)
            .mint_at("alice", Map::new(), Duration::minutes(5), Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(
            TokenVerifier::new(&key(), 0).validate(&token),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let verifier = TokenVerifier::new(&key(), 0);

        for token in ["", "not-a-token", "invalid.token.here", "a.b"] {
            assert_eq!(
                verifier.validate(token),
                Err(AuthError::MalformedToken),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_algorithm_mismatch_is_malformed() {
        let hs512 = SigningKey::new(SECRET, "HS512").unwrap();
        let token = TokenIssuer::new(&hs512)
            .mint("alice", Map::new(), Duration::minutes(5))
            .unwrap();

        assert_eq!(
            TokenVerifier::new(&key(), 0).validate(&token),
            Err(AuthError::MalformedToken)
        );
    }
}
