//! HTTP error mapping for handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use foundry_client::FoundryError;
use serde_json::json;
use thiserror::Error;

use crate::domains::pipeline::{PipelineError, UnsupportedSchema};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnsupportedSchema(String),

    /// The batch-processing platform rejected or failed a call
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);

        if let Some(e) = err.downcast_ref::<PipelineError>() {
            return match e {
                PipelineError::UnsupportedSchema(_) => Self::UnsupportedSchema(message),
                _ => Self::BadRequest(message),
            };
        }
        if err.downcast_ref::<UnsupportedSchema>().is_some() {
            return Self::UnsupportedSchema(message);
        }
        if let Some(e) = err.downcast_ref::<FoundryError>() {
            return match e {
                FoundryError::InvalidRid(_) => Self::BadRequest(message),
                FoundryError::Config(_) => {
                    tracing::error!(error = %message, "Platform client misconfigured");
                    Self::Internal(message)
                }
                _ => Self::Upstream(message),
            };
        }
        if let Some(sqlx::Error::RowNotFound) = err.downcast_ref::<sqlx::Error>() {
            return Self::NotFound(message);
        }

        tracing::error!(error = %message, "Request failed");
        Self::Internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::UnsupportedSchema(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unsupported_schema", msg)
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::pipeline::DatasetKey;

    #[test]
    fn maps_domain_errors_to_status() {
        let err: ApiError = anyhow::Error::from(PipelineError::MissingMediaItemRid).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let schema = UnsupportedSchema {
            dataset: DatasetKey::Events,
            columns: vec!["title".into()],
        };
        let err: ApiError = anyhow::Error::from(PipelineError::from(schema)).into();
        assert!(matches!(err, ApiError::UnsupportedSchema(_)));

        let err: ApiError = anyhow::Error::from(FoundryError::Api {
            status: 403,
            message: "forbidden".into(),
        })
        .context("Failed to upload notes.txt")
        .into();
        match err {
            ApiError::Upstream(msg) => assert!(msg.contains("403") && msg.contains("notes.txt")),
            other => panic!("expected upstream error, got {:?}", other),
        }

        let err: ApiError =
            anyhow::Error::from(FoundryError::InvalidRid("ri.mio.main.media-set.x".into())).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = anyhow::Error::from(FoundryError::Config("empty hostname".into())).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = anyhow::Error::from(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = anyhow::anyhow!("boom").into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
