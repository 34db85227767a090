use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use funnel_core::error::FunnelError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit statuses
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain without
/// touching the `FunnelError` enum.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        match self.0.downcast_ref::<FunnelError>() {
            Some(e) => match e {
                FunnelError::NotInitialized
                | FunnelError::Validation { .. }
                | FunnelError::InvalidStage(_)
                | FunnelError::InvalidStep(_)
                | FunnelError::InvalidTone(_) => StatusCode::BAD_REQUEST,
                FunnelError::PersonaNotFound(_)
                | FunnelError::AssetNotFound(_)
                | FunnelError::SuggestionNotFound(_) => StatusCode::NOT_FOUND,
                FunnelError::QuotaExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
                FunnelError::Storage(_)
                | FunnelError::Io(_)
                | FunnelError::Yaml(_)
                | FunnelError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: FunnelError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(status_of(FunnelError::PersonaNotFound("p".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(FunnelError::AssetNotFound("a".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status_of(FunnelError::validation("name", "must not be empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(FunnelError::InvalidStage("x".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn quota_maps_to_507() {
        let err = FunnelError::QuotaExceeded {
            key: "personas".into(),
            needed: 10,
            quota: 5,
        };
        assert_eq!(status_of(err), StatusCode::INSUFFICIENT_STORAGE);
    }

    #[test]
    fn io_error_maps_to_500() {
        assert_eq!(
            status_of(FunnelError::Io(std::io::Error::other("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_funnel_error_maps_to_500() {
        let response = AppError(anyhow::anyhow!("something unexpected")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sentinels_keep_their_status() {
        assert_eq!(AppError::bad_request("nope").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("gone").into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(FunnelError::AssetNotFound("a1".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
