use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropApiError {
    #[error("Missing field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': expected {expected}")]
    InvalidField { field: String, expected: String },

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Failed to fetch weather data")]
    WeatherUnavailable,

    #[error("Unsupported crop: '{crop}'")]
    UnsupportedCrop { crop: String },

    #[error("Invalid prediction input: {message}")]
    InvalidPredictionInput { message: String },

    #[error("Prediction failed: {message}")]
    PredictionError { message: String },

    #[error("Weather API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl CropApiError {
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid_field(field: &str, expected: &str) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::InvalidBody
            | Self::UnsupportedCrop { .. }
            | Self::InvalidPredictionInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 回傳給客戶端的訊息，內部錯誤不外洩細節
    pub fn public_message(&self) -> String {
        match self {
            Self::PredictionError { .. } => "Prediction failed".to_string(),
            Self::ApiError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for CropApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CropApiError>;
