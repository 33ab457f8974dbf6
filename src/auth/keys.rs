use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::ConfigError;

/// Process-wide HMAC secret and the algorithm it signs with.
///
/// Built once at startup and handed to both `TokenIssuer` and `TokenVerifier`;
/// tokens only verify under the key that minted them.
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl SigningKey {
    /// # Errors
    /// * `MissingRequired` - secret is empty or whitespace
    /// * `InvalidValue` - algorithm is not one of HS256, HS384, HS512
    pub fn new(secret: &str, algorithm: &str) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }

        let algorithm = Algorithm::from_str(algorithm)
            .ok()
            .filter(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "jwt.algorithm must be HS256, HS384 or HS512, got {}",
                    algorithm
                ))
            })?;

        if secret.len() < 32 {
            tracing::warn!(
                length = secret.len(),
                "JWT secret is shorter than 32 bytes; use a longer random secret"
            );
        }

        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            algorithm,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"[redacted]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
