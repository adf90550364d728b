use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use licenca_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            user_id: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
        }
    }
}

/// Raw bearer token of the request, if any.
///
/// Handlers that must decide authentication themselves (the upload broker)
/// take this instead of [`Identity`] and pass it on explicitly.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(
            crate::auth::middleware::bearer_token(&parts.headers).map(str::to_string),
        ))
    }
}

// Populated by auth_middleware on protected routes
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthenticated("Unauthorized".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_drops_empty_email() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: Some(String::new()),
            exp: 0,
            aud: None,
            role: None,
        };
        assert_eq!(Identity::from(claims).email, None);
    }
}
