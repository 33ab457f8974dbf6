/// Password Hashing and Verification
///
/// bcrypt with a per-call random salt. The output is a modular-crypt string
/// (`$2b$<cost>$<salt><digest>`) so verification needs nothing but the hash.

use bcrypt::{hash, verify};

use crate::error::{AppError, AuthError, ConfigError};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost factor
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the cost is outside 4..=31
    pub fn new(cost: u32) -> Result<Self, ConfigError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ConfigError::InvalidValue(format!(
                "hashing.cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh salt
    ///
    /// CPU-bound by design; callers on an async runtime should run it on a
    /// blocking worker.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    ///
    /// A wrong password is `Ok(false)`.
    ///
    /// # Errors
    /// Returns `AuthError::MalformedHash` if `hash` is not a bcrypt string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash).map_err(|e| {
            tracing::debug!(error = %e, "Password hash could not be parsed");
            AuthError::MalformedHash
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).expect("valid cost")
    }

    #[test]
    fn test_hash_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw123").expect("Failed to hash password");

        assert_ne!(hash, "pw123");
        // algorithm, cost and salt travel with the digest
        assert!(hash.starts_with("$2b$04$"));
    }

    #[test]
    fn test_verify_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw123").expect("Failed to hash password");

        assert!(hasher.verify("pw123", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw123").expect("Failed to hash password");

        assert!(!hasher.verify("other", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = fast_hasher();
        let first = hasher.hash("pw123").unwrap();
        let second = hasher.hash("pw123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("pw123", &first).unwrap());
        assert!(hasher.verify("pw123", &second).unwrap());
    }

    #[test]
    fn test_empty_password_is_accepted() {
        let hasher = fast_hasher();
        let hash = hasher.hash("").unwrap();

        assert!(hasher.verify("", &hash).unwrap());
        assert!(!hasher.verify("x", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let hasher = fast_hasher();

        assert_eq!(
            hasher.verify("pw123", "not-a-bcrypt-hash"),
            Err(AuthError::MalformedHash)
        );
        assert_eq!(hasher.verify("pw123", ""), Err(AuthError::MalformedHash));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(PasswordHasher::new(3).is_err());
        assert!(PasswordHasher::new(32).is_err());
        assert_eq!(PasswordHasher::new(10).unwrap().cost(), 10);
    }
}
