use crate::auth::jwt::IdentityProvider;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use licenca_core::AppError;
use std::sync::Arc;

pub const MISSING_AUTH_HEADER: &str = "Missing authorization header";

#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<dyn IdentityProvider>,
}

/// Token carried by the `Authorization` header.
///
/// The `Bearer ` prefix is optional; a present but blank header counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller and store the [`Identity`](crate::auth::models::Identity) in request extensions
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return HttpAppError(AppError::Unauthenticated(MISSING_AUTH_HEADER.to_string()))
            .into_response();
    };

    match auth.identity.resolve(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_raw_token_is_accepted() {
        assert_eq!(bearer_token(&headers("abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_missing_or_blank_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
    }
}
