//! Auth middleware for JWT verification.
//!
//! Token issuance belongs to the external auth service; handlers here only
//! need a verified user id out of the Authorization header.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use jsonwebtoken::{DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use leettrack_domain::{Claims, DomainError, UserId};

use crate::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn decode_claims(headers: &HeaderMap, jwt_secret: &str) -> Result<Claims, StatusCode> {
    let token = bearer_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|token_data| token_data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        StatusCode::UNAUTHORIZED
    })
}

/// Extracts and verifies user id from Authorization header.
pub fn auth_middleware(headers: &HeaderMap, jwt_secret: &str) -> Result<UserId, StatusCode> {
    let claims = decode_claims(headers, jwt_secret)?;

    let user_id = claims
        .sub
        .as_ref()
        .parse::<Uuid>()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    Ok(UserId(user_id))
}

/// Axum extractor that validates JWT and provides authenticated user id.
#[derive(Debug)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = auth_middleware(&parts.headers, state.config.jwt_secret.expose_secret())
            .map_err(|_| DomainError::Unauthorized("Invalid or missing token".to_string()))?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequestParts;
    use axum::http::{Request, StatusCode, header};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::test_support::build_default_state;
    use leettrack_domain::{Claims, JwtSubject};

    fn make_jwt(secret: &str, sub: &str) -> String {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_secs();

        encode(
            &Header::default(),
            &Claims {
                sub: JwtSubject(sub.to_string()),
                exp: now + 3600,
                iat: now,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token should encode")
    }

    #[test]
    fn auth_middleware_rejects_missing_authorization_header() {
        let headers = HeaderMap::new();
        let result = auth_middleware(&headers, "secret");
        assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn auth_middleware_rejects_invalid_bearer_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Token abc".parse().expect("valid header"),
        );
        let result = auth_middleware(&headers, "secret");
        assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn auth_middleware_accepts_valid_token_and_returns_user_id() {
        let user_id = uuid::Uuid::new_v4();
        let token = make_jwt("test-secret", &user_id.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().expect("valid header"),
        );

        let result = auth_middleware(&headers, "test-secret").expect("token should validate");
        assert_eq!(result.0, user_id);
    }

    #[test]
    fn auth_middleware_rejects_non_uuid_subject() {
        let token = make_jwt("test-secret", "not-a-uuid");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().expect("valid header"),
        );

        let result = auth_middleware(&headers, "test-secret");
        assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn auth_middleware_rejects_invalid_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer not-a-jwt".parse().expect("valid header"),
        );
        let result = auth_middleware(&headers, "secret");
        assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn auth_user_extractor_returns_unauthorized_error_for_missing_token() {
        let state = build_default_state();
        let (mut parts, _) = Request::builder()
            .uri("/v1/sync/status")
            .body(Body::empty())
            .expect("request should build")
            .into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("extractor should fail");

        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
