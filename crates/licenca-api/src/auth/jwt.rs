//! Bearer token verification
//!
//! Identity resolution sits behind [`IdentityProvider`] so the broker and the
//! auth middleware never depend on a particular token format. The shipped
//! provider verifies HS256 JWTs signed with the identity provider's secret.

use crate::auth::models::{Claims, Identity};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use licenca_core::AppError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token into the caller identity.
    ///
    /// Any failure is `AppError::Unauthenticated`.
    async fn resolve(&self, token: &str) -> Result<Identity, AppError>;
}

pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    tracing::debug!("JWT validation failed: token expired");
                }
                _ => tracing::debug!("JWT validation failed: {}", e),
            }
            AppError::Unauthenticated(UNAUTHORIZED_MESSAGE.to_string())
        })?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn mint(secret: &str, exp_offset: i64, aud: Option<&str>) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id,
            email: Some("dono@example.com".into()),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            aud: aud.map(String::from),
            role: Some("authenticated".into()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (user_id, token)
    }

    #[tokio::test]
    async fn test_valid_token_resolves() {
        let provider = JwtIdentityProvider::new(SECRET, None);
        let (user_id, token) = mint(SECRET, 3600, Some("authenticated"));
        let identity = provider.resolve(&token).await.unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email.as_deref(), Some("dono@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthenticated() {
        let provider = JwtIdentityProvider::new(SECRET, None);
        let (_, token) = mint(SECRET, -3600, None);
        match provider.resolve(&token).await {
            Err(AppError::Unauthenticated(msg)) => assert_eq!(msg, UNAUTHORIZED_MESSAGE),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthenticated() {
        let provider = JwtIdentityProvider::new(SECRET, None);
        let (_, token) = mint("another-secret-another-secret-xx", 3600, None);
        assert!(matches!(
            provider.resolve(&token).await,
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_audience_is_checked_when_configured() {
        let provider = JwtIdentityProvider::new(SECRET, Some("authenticated"));
        let (_, good) = mint(SECRET, 3600, Some("authenticated"));
        let (_, bad) = mint(SECRET, 3600, Some("service_role"));
        assert!(provider.resolve(&good).await.is_ok());
        assert!(provider.resolve(&bad).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let provider = JwtIdentityProvider::new(SECRET, None);
        assert!(provider.resolve("not-a-jwt").await.is_err());
    }
}
