//! HS256 JWT implementation of the `TokenIssuer` port. The expiry is embedded
//! in the token's `exp` claim and checked at verification time; a purpose tag
//! keeps a reset token from ever confirming an email address.

use chrono::Utc;
use domains::{DomainError, Result, TokenIssuer, TokenPurpose};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    purpose: String,
    exp: i64,
}

pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtTokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

fn purpose_key(purpose: TokenPurpose) -> &'static str {
    match purpose {
        TokenPurpose::ConfirmEmail => "confirm_email",
        TokenPurpose::ResetPassword => "reset_password",
        TokenPurpose::Session => "session",
    }
}

impl TokenIssuer for JwtTokens {
    fn issue(&self, account_id: i64, purpose: TokenPurpose, expires_in_secs: i64) -> Result<String> {
        let claims = Claims {
            sub: account_id,
            purpose: purpose_key(purpose).to_string(),
            exp: Utc::now().timestamp() + expires_in_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|error| DomainError::Storage(format!("token encoding failed: {error}")))
    }

    fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<i64> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| DomainError::InvalidToken)?;
        if data.claims.purpose != purpose_key(purpose) {
            return Err(DomainError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> JwtTokens {
        JwtTokens::new(b"test-secret")
    }

    #[test]
    fn round_trip_returns_the_account_id() {
        let tokens = tokens();
        let token = tokens.issue(42, TokenPurpose::ConfirmEmail, 600).unwrap();
        assert_eq!(tokens.verify(&token, TokenPurpose::ConfirmEmail).unwrap(), 42);
    }

    #[test]
    fn purpose_mismatch_is_rejected() {
        let tokens = tokens();
        let token = tokens.issue(42, TokenPurpose::ResetPassword, 600).unwrap();
        let result = tokens.verify(&token, TokenPurpose::ConfirmEmail);
        assert!(matches!(result, Err(DomainError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = tokens();
        // Past the default validation leeway.
        let token = tokens.issue(42, TokenPurpose::Session, -120).unwrap();
        let result = tokens.verify(&token, TokenPurpose::Session);
        assert!(matches!(result, Err(DomainError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = tokens();
        let result = tokens.verify("not.a.token", TokenPurpose::Session);
        assert!(matches!(result, Err(DomainError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = tokens().issue(42, TokenPurpose::Session, 600).unwrap();
        let other = JwtTokens::new(b"another-secret");
        assert!(other.verify(&token, TokenPurpose::Session).is_err());
    }
}
