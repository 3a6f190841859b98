//! Error types for ipo-desk.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::llm::SummarizeError;
use crate::model::IpoKind;
use crate::render::RenderError;

/// Desk service errors.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Invalid IPO type. Must be \"current\" or \"upcoming\"")]
    InvalidKind(String),

    #[error("Invalid IPO index: {0}")]
    InvalidIndex(String),

    #[error("IPO index out of range for {kind} IPOs")]
    IndexOutOfRange { kind: IpoKind },

    #[error("Could not retrieve IPO details page")]
    DetailUnavailable,

    #[error("Could not parse IPO data from the page")]
    DetailUnparsable,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Summarizer(#[from] SummarizeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DeskResult<T> = std::result::Result<T, DeskError>;

impl DeskError {
    pub fn status(&self) -> StatusCode {
        match self {
            DeskError::InvalidKind(_)
            | DeskError::InvalidIndex(_)
            | DeskError::IndexOutOfRange { .. } => StatusCode::BAD_REQUEST,
            DeskError::Summarizer(_) => StatusCode::BAD_GATEWAY,
            DeskError::DetailUnavailable
            | DeskError::DetailUnparsable
            | DeskError::Render(_)
            | DeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeskError::IndexOutOfRange {
            kind: IpoKind::Upcoming,
        };
        assert_eq!(err.to_string(), "IPO index out of range for upcoming IPOs");

        let err = DeskError::InvalidKind("bogus".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid IPO type. Must be \"current\" or \"upcoming\""
        );
    }

    #[test]
    fn test_error_into_response() {
        let response = DeskError::InvalidIndex("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = DeskError::DetailUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            DeskError::Summarizer(SummarizeError::Api("quota exceeded".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = DeskError::DetailUnparsable.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Could not parse IPO data from the page");
    }
}
