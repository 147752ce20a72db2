use crate::domain::account::{Account, Role};
use crate::domain::{DomainError, Principal};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by every issued token. Verification is a pure function of
/// the token string and the signing key: the store is never re-read, so the
/// embedded role and name can go stale relative to the store. Today no
/// endpoint mutates either field, so staleness cannot occur; a future
/// role-change feature would need token revocation or re-verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: i64,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a signed token asserting the account's identity and role.
    pub fn issue(&self, account: &Account) -> Result<String, DomainError> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .expect("valid timestamp")
            .timestamp();

        let claims = Claims {
            account_id: account.id,
            email: account.email.clone(),
            role: account.role,
            name: account.name.clone(),
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {}", e);
            DomainError::InternalError(format!("Failed to generate token: {}", e))
        })
    }

    /// Check signature and expiry, returning the embedded principal.
    pub fn verify(&self, token: &str) -> Result<Principal, DomainError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                let claims = token_data.claims;
                tracing::debug!("Token verified for account_id: {}", claims.account_id);
                Ok(Principal {
                    id: claims.account_id,
                    email: claims.email,
                    role: claims.role,
                    name: claims.name,
                })
            }
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token verification failed: expired");
                    Err(DomainError::ExpiredToken)
                }
                _ => {
                    tracing::debug!("Token verification failed: {}", e);
                    Err(DomainError::InvalidToken)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, role: Role) -> Account {
        Account {
            id,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn service() -> JwtService {
        JwtService::new("test-secret-that-is-long-enough-0123", 7)
    }

    #[test]
    fn issued_token_verifies_and_carries_identity() {
        let jwt = service();
        let token = jwt.issue(&account(42, Role::Admin)).unwrap();

        let principal = jwt.verify(&token).unwrap();
        assert_eq!(principal.id, 42);
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.name, "Alice");
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let jwt = service();
        let claims = Claims {
            account_id: 1,
            email: "alice@example.com".to_string(),
            role: Role::User,
            name: "Alice".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding_key).unwrap();

        match jwt.verify(&token) {
            Err(DomainError::ExpiredToken) => {}
            other => panic!("expected ExpiredToken, got {:?}", other),
        }
    }

    #[test]
    fn tampered_token_is_rejected_as_invalid() {
        let jwt = service();
        let token = jwt.issue(&account(1, Role::User)).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        match jwt.verify(&tampered) {
            Err(DomainError::InvalidToken) => {}
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let jwt = service();
        let other = JwtService::new("another-secret-that-is-long-enough-1", 7);
        let token = other.issue(&account(1, Role::User)).unwrap();

        match jwt.verify(&token) {
            Err(DomainError::InvalidToken) => {}
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }
}
