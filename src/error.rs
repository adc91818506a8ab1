use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can surface to a client. The `IntoResponse` impl
/// below is the only place internal failures are translated to HTTP, so the
/// wire shape (`{error, code}`) stays uniform across routes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No auth token, access denied!")]
    NoAuthToken,
    #[error("Token verification failed, authorization denied.")]
    InvalidToken,
    #[error("User with this email already exists!")]
    DuplicateEmail,
    #[error("User with this email does not exist!")]
    UnknownEmail,
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("{0}")]
    Validation(&'static str),
    #[error("You do not have access to this task")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoAuthToken | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::DuplicateEmail
            | ApiError::UnknownEmail
            | ApiError::IncorrectPassword
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NoAuthToken => "NO_AUTH_TOKEN",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::UnknownEmail | ApiError::IncorrectPassword => "INVALID_CREDENTIALS",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            // Detail stays in the server log; the client gets the fixed body.
            error!(error = %e, "internal error");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}

/// True when an insert failed on a unique index, e.g. two concurrent signups
/// racing past the existence check.
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|se| se.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn auth_errors_map_to_401_with_distinct_messages() {
        let (status, body) = body_json(ApiError::NoAuthToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No auth token, access denied!");
        assert_eq!(body["code"], "NO_AUTH_TOKEN");

        let (status, body) = body_json(ApiError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"],
            "Token verification failed, authorization denied."
        );
    }

    #[tokio::test]
    async fn credential_errors_share_a_code_but_keep_messages() {
        let (status, body) = body_json(ApiError::UnknownEmail).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User with this email does not exist!");
        assert_eq!(body["code"], "INVALID_CREDENTIALS");

        let (_, body) = body_json(ApiError::IncorrectPassword).await;
        assert_eq!(body["error"], "Incorrect password.");
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn internal_errors_never_leak_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("pg: connection refused at 10.0.0.3"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "INTERNAL");
    }

    #[tokio::test]
    async fn validation_carries_its_message() {
        let (status, body) = body_json(ApiError::Validation("Task ID is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Task ID is required");
        assert_eq!(body["code"], "VALIDATION");
    }
}
