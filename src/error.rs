use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API failure taxonomy. Every variant serializes as `{"message": ...}`;
/// infrastructure details are logged but never sent to the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn no_such_user() -> Self {
        ApiError::NotFound("No user found with this id")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_message(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), 1024)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        value["message"].as_str().expect("message field").to_string()
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_fixed_message() {
        let res = ApiError::no_such_user().into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_message(res).await, "No user found with this id");
    }

    #[tokio::test]
    async fn login_failures_map_to_400_with_fixed_messages() {
        let res = ApiError::Authentication("No user with that email address").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(res).await, "No user with that email address");

        let res = ApiError::Authentication("Incorrect password!").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(res).await, "Incorrect password!");
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_its_message() {
        let res = ApiError::Validation("Email already in use".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_message(res).await, "Email already in use");
    }

    #[tokio::test]
    async fn internal_hides_the_underlying_error() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_message(res).await, "Internal server error");
    }
}
