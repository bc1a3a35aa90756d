use std::collections::BTreeMap;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// Field name to the list of problems found with it.
pub type Issues = BTreeMap<String, Vec<String>>;

/// Errors a handler can return; each maps to one status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error")]
    Validation(Issues),
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut issues = Issues::new();
        issues.insert(field.to_string(), vec![message.into()]);
        Self::Validation(issues)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Attached to 500 responses so the reporting layer can log the cause.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(issues) => (
                status,
                Json(json!({ "message": "Validation error", "issues": issues })),
            )
                .into_response(),
            Self::Internal(err) => {
                let mut res =
                    (status, Json(json!({ "message": "Internal server error" }))).into_response();
                res.extensions_mut()
                    .insert(InternalErrorDetail(format!("{err:#}")));
                res
            }
            other => (status, Json(json!({ "message": other.to_string() }))).into_response(),
        }
    }
}

/// Logs the cause of internal errors, except in production.
pub async fn report_internal_errors(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let res = next.run(req).await;
    if !state.config.env.is_production() {
        if let Some(InternalErrorDetail(detail)) = res.extensions().get::<InternalErrorDetail>() {
            error!(%method, %uri, error = %detail, "unhandled error");
        }
    }
    res
}
