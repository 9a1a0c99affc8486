use std::fmt;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Serialize, Deserialize};
use serde_json::Error as SerdeError;

#[derive(Serialize, Deserialize)]
pub struct BwError {
    pub status_code: u32,
    #[serde(skip_serializing)]
    pub error_type: ErrorType,
    pub message: String,
}

#[derive(Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum ErrorType {
    InputError,
    UpstreamError,
    ExtractionError,
    FetchError,
    InternalError,
}

impl BwError {
    pub fn new(status_code: u32, error_type: ErrorType, message: String) -> BwError {
        tracing::warn!(status_code, message = %message, "request failed");
        BwError { status_code, error_type, message }
    }

    pub fn input(message: impl Into<String>) -> BwError {
        BwError::new(400, ErrorType::InputError, message.into())
    }

    pub fn extraction(message: impl Into<String>) -> BwError {
        BwError::new(500, ErrorType::ExtractionError, message.into())
    }
}

impl fmt::Display for BwError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl fmt::Debug for BwError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl IntoResponse for BwError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code as u16)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<SerdeError> for BwError {
    fn from(error: SerdeError) -> BwError {
        BwError::new(400, ErrorType::InputError, format!("serde error : {}", error))
    }
}

impl From<reqwest::Error> for BwError {
    fn from(error: reqwest::Error) -> BwError {
        BwError::new(500, ErrorType::UpstreamError, format!("http error : {}", error))
    }
}

impl From<std::io::Error> for BwError {
    fn from(error: std::io::Error) -> BwError {
        BwError::new(500, ErrorType::InternalError, format!("io error : {}", error))
    }
}
