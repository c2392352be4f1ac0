//! services/api/src/web/token.rs
//!
//! Stateless bearer-token issuance and verification. Tokens embed the user id
//! and role and are signed with an HMAC secret from configuration; expiry is
//! enforced on verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use grocerymart_core::domain::Role;

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// The signed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: Uuid,
    pub role: Role,
    /// Expiry as a UTC timestamp.
    pub exp: i64,
}

/// Pre-built signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs a token for `user_id` with the standard TTL.
pub fn issue_token(
    keys: &TokenKeys,
    user_id: Uuid,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_token_with_ttl(keys, user_id, role, Duration::days(TOKEN_TTL_DAYS))
}

fn issue_token_with_ttl(
    keys: &TokenKeys,
    user_id: Uuid,
    role: Role,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

/// Verifies a token's signature and expiry, yielding its claims.
pub fn verify_token(
    keys: &TokenKeys,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default()).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_token_round_trips_its_claims() {
        let keys = TokenKeys::from_secret("test-secret");
        let user_id = Uuid::new_v4();

        let token = issue_token(&keys, user_id, Role::Admin).unwrap();
        let claims = verify_token(&keys, &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn a_tampered_token_is_rejected() {
        let keys = TokenKeys::from_secret("test-secret");
        let token = issue_token(&keys, Uuid::new_v4(), Role::User).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_token(&keys, &tampered).is_err());
    }

    #[test]
    fn a_token_signed_with_another_secret_is_rejected() {
        let keys = TokenKeys::from_secret("test-secret");
        let other = TokenKeys::from_secret("other-secret");

        let token = issue_token(&other, Uuid::new_v4(), Role::User).unwrap();
        assert!(verify_token(&keys, &token).is_err());
    }

    #[test]
    fn an_expired_token_is_rejected() {
        let keys = TokenKeys::from_secret("test-secret");
        let token =
            issue_token_with_ttl(&keys, Uuid::new_v4(), Role::User, Duration::days(-1)).unwrap();

        assert!(verify_token(&keys, &token).is_err());
    }

    #[test]
    fn garbage_input_is_rejected() {
        let keys = TokenKeys::from_secret("test-secret");
        assert!(verify_token(&keys, "not-a-token").is_err());
    }
}
