use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{success: true, message?, <key>: <value>...}`
#[derive(Debug)]
pub struct ApiResponse {
    status_code: StatusCode,
    body: Map<String, Value>,
    failed: Option<String>,
}

impl ApiResponse {
    /// 200 OK
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// 201 Created
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    pub fn with_status(status_code: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self {
            status_code,
            body,
            failed: None,
        }
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        self.with("message", message.into())
    }

    /// Add a top-level key. Serialization failures surface as a 500 when
    /// the response is rendered.
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.body.insert(key.to_string(), value);
            }
            Err(e) => {
                self.failed = Some(format!("{}: {}", key, e));
            }
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let Some(reason) = self.failed {
            tracing::error!("Failed to serialize response data: {}", reason);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to serialize response data"
                })),
            )
                .into_response();
        }

        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
