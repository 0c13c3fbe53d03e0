use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;
use crate::AppError;

/// Session lifetime in seconds (24 hours). Tokens are stateless; sign-out
/// is the client discarding the token.
const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Mint an HS256 session token for a verified identity.
pub fn issue_session_token(
    clerk_user_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();

    let claims = SessionClaims {
        sub: clerk_user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Validate a session token and return its claims.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid session token: {}", e)))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate_token() {
        let secret = "test_secret_key_for_testing_purposes";

        let token = issue_session_token("user_123", "a@b.com", secret).unwrap();
        let claims = validate_session_token(&token, secret).unwrap();

        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_session_token("not_a_jwt", "secret").is_err());
    }

    #[test]
    fn test_token_with_wrong_secret_rejected() {
        let token = issue_session_token("user_123", "a@b.com", "secret_one").unwrap();
        assert!(validate_session_token(&token, "secret_two").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

        let secret = "test_secret_key";
        let now = chrono::Utc::now().timestamp();
        let claims = super::SessionClaims {
            sub: "user_123".to_string(),
            email: "a@b.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_session_token(&token, secret).is_err());
    }
}
