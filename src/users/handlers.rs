use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::{read_cookie, refresh_cookie, REFRESH_COOKIE},
        extractors::AuthUser,
        jwt::{JwtKeys, TokenKind},
    },
    error::AppError,
    extract::ValidJson,
    state::AppState,
    users::{
        dto::{AuthenticateRequest, ProfileResponse, RegisterRequest, TokenResponse},
        repo_types::Role,
        services::{
            AuthenticateUseCase, GetUserProfileUseCase, RegisterInput, RegisterUseCase, UserError,
        },
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/sessions", post(authenticate))
        .route("/token/refresh", patch(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(profile))
}

/// Errors a handler did not expect go to the global handler as 500s.
fn unexpected(err: UserError) -> AppError {
    match err {
        UserError::Internal(e) => AppError::Internal(e),
        other => AppError::Internal(anyhow::anyhow!(other)),
    }
}

/// Signs an access token for the body and a refresh token for the cookie.
fn issue_tokens(
    keys: &JwtKeys,
    user_id: Uuid,
    role: Role,
) -> Result<impl IntoResponse, AppError> {
    let token = keys.sign_access(user_id, role)?;
    let refresh = keys.sign_refresh(user_id, role)?;
    let cookie = refresh_cookie(&refresh, keys.refresh_ttl)?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse { token }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<StatusCode, AppError> {
    let input = RegisterInput {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        password: payload.password,
    };

    match RegisterUseCase::new(state.users.clone()).execute(input).await {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(e @ UserError::DuplicateEmail) => Err(AppError::Conflict(e.to_string())),
        Err(e) => Err(unexpected(e)),
    }
}

#[instrument(skip(state, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<AuthenticateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = match AuthenticateUseCase::new(state.users.clone())
        .execute(payload.email.trim(), &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e @ UserError::InvalidCredentials) => return Err(AppError::BadRequest(e.to_string())),
        Err(e) => return Err(unexpected(e)),
    };

    let keys = JwtKeys::from_ref(&state);
    issue_tokens(&keys, user.id, user.role)
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = read_cookie(&headers, REFRESH_COOKIE).ok_or(AppError::Unauthorized)?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_kind(token, TokenKind::Refresh).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized
    })?;

    issue_tokens(&keys, claims.sub, claims.role)
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    debug!(user_id = %user.id, role = ?user.role, "profile requested");
    match GetUserProfileUseCase::new(state.users.clone())
        .execute(user.id)
        .await
    {
        Ok(found) => Ok(Json(ProfileResponse::from(found))),
        Err(e @ UserError::NotFound) => Err(AppError::NotFound(e.to_string())),
        Err(e) => Err(unexpected(e)),
    }
}
