//! Bearer token issuance and verification (HS256 JWT).

use super::AuthError;
use crate::types::{Role, UserRow, UserType};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User id.
    pub id: String,
    pub role: Role,
    pub user_type: UserType,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX),
        })
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &UserRow) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        self.issue_at(user, now, now.saturating_add(self.ttl_secs))
    }

    pub(crate) fn issue_at(&self, user: &UserRow, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            id: user.id.clone(),
            role: user.role,
            user_type: user.user_type,
            email: user.email.clone(),
            iat,
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| AuthError::Token(error.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|error| match error.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Token(error.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> UserRow {
        UserRow {
            id: "u1".into(),
            email: "p@example.com".into(),
            password_hash: String::new(),
            role: Role::Provider,
            user_type: UserType::Company,
            mobile_phone: None,
            first_name: None,
            last_name: None,
            company_name: Some("Acme".into()),
            business_tax_number: Some("123".into()),
            representative_first_name: Some("Pat".into()),
            representative_last_name: Some("Ng".into()),
            street_address: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = TokenService::new("s3cret", 1).unwrap();
        let token = tokens.issue(&row()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.role, Role::Provider);
        assert_eq!(claims.user_type, UserType::Company);
        assert_eq!(claims.email, "p@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenService::new("one", 1).unwrap().issue(&row()).unwrap();
        let err = TokenService::new("two", 1).unwrap().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::Token(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("s3cret", 1).unwrap();
        let now = chrono::Utc::now().timestamp();
        let token = tokens.issue_at(&row(), now - 7200, now - 3600).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenService::new("", 1), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new("s3cret", 1).unwrap();
        assert!(tokens.verify("not.a.jwt").is_err());
    }
}
