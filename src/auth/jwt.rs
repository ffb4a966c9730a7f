//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
///
/// The signing secret is process-wide configuration, injected here once at
/// startup rather than read from a global.
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 12, // 12-hour session tokens
        }
    }

    /// Generate a JWT token for a user
    pub fn issue(&self, user: &User) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiration_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.expiration_hours * 3600) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            role: user.role,
            exp: expiration,
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}h",
            user.name, user.id, self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a JWT token and extract claims.
    ///
    /// Rejects bad signatures, malformed tokens, and expired tokens. No
    /// revocation list is consulted; a valid unexpired signature is always
    /// accepted.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for user {}", decoded.claims.name);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;

    fn create_test_user() -> User {
        User {
            id: 7,
            name: "testuser".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Standard,
        }
    }

    #[test]
    fn test_jwt_issue_and_verify() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let (token, expires_in) = handler.issue(&user).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 12 * 3600); // 12 hours in seconds

        let claims = handler.verify(&token).unwrap();
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.role, user.role);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        let result = handler.verify("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());
        let user = create_test_user();

        let (token, _) = handler1.issue(&user).unwrap();

        let result = handler2.verify(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Hand-roll a token whose exp is already in the past.
        let secret = "test-secret-key-12345";
        let claims = Claims {
            sub: "7".to_string(),
            name: "testuser".to_string(),
            role: UserRole::Standard,
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let handler = JwtHandler::new(secret.to_string());
        assert!(handler.verify(&token).is_err());
    }

    #[test]
    fn test_token_contains_all_claims() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = User {
            id: 1,
            name: "admin".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Admin,
        };

        let (token, _) = handler.issue(&user).unwrap();
        let claims = handler.verify(&token).unwrap();

        assert_eq!(claims.name, "admin");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }
}
