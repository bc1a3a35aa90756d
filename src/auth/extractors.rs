use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{
    cookie::{read_cookie, REFRESH_COOKIE},
    jwt::{JwtKeys, TokenKind},
};
use crate::{error::AppError, users::repo_types::Role};

/// Verified token subject. Handlers taking this never run for
/// unauthenticated requests.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        // A Bearer header wins; otherwise the refresh cookie is tried.
        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);
        let (token, kind) = match bearer {
            Some(token) => (token, TokenKind::Access),
            None => {
                let token =
                    read_cookie(&parts.headers, REFRESH_COOKIE).ok_or(AppError::Unauthorized)?;
                (token, TokenKind::Refresh)
            }
        };

        let claims = keys.verify_kind(token, kind).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Token of an `Authorization` value whose scheme is `Bearer`, any case.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(char::is_whitespace)?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
