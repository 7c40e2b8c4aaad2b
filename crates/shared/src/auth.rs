//! Access-token claims.
//!
//! Tokens are minted by the identity service; this side only reads the
//! subject and role out of them.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Registered claims plus the caller's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub sub: UserId,
    /// One of `employee`, `hr`, `payroll`, `admin`. Checked by the caller.
    pub role: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Claims issued now for `user_id`, expiring after `ttl`.
    ///
    /// A negative `ttl` yields claims that are already expired.
    #[must_use]
    pub fn issued(user_id: UserId, role: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// The subject as a typed id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.sub
    }
}
