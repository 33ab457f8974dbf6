/// JWT Claims structure
///
/// Registered claims (`sub`, `iat`, `exp`, `jti`) plus any custom claims the
/// caller supplies, flattened into the same JSON object.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Claim names owned by the issuer; callers cannot override them.
const RESERVED: [&str; 4] = ["sub", "iat", "exp", "jti"];

pub const ROLE_CLAIM: &str = "role";
pub const USER_ID_CLAIM: &str = "id";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token identifier
    pub jti: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build the claim set `extra ∪ {sub, iat, exp, jti}` for a token issued at `now`
    ///
    /// Returns `None` when `now + ttl` falls outside the representable time range.
    pub fn new(
        subject: &str,
        mut extra: Map<String, Value>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let expires_at = now.checked_add_signed(ttl)?;

        for name in RESERVED {
            extra.remove(name);
        }

        Some(Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            extra,
        })
    }

    pub fn role(&self) -> Option<&str> {
        self.extra.get(ROLE_CLAIM).and_then(Value::as_str)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.extra.get(USER_ID_CLAIM).and_then(Value::as_i64)
    }

    /// Expired once `now` reaches `exp + leeway`
    pub fn is_expired_at(&self, now: i64, leeway_seconds: u64) -> bool {
        let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
        now >= self.exp.saturating_add(leeway)
    }
}
