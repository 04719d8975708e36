// ABOUTME: Error types for the impact-slides application
// ABOUTME: Provides structured error handling for generation, rendering and export

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to reach remote service: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Quota exceeded (429): {0}")]
    QuotaExceeded(String),

    #[error("AI service error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("Failed to decode image: {0}")]
    ImageDecodeError(String),

    #[error("Rendering error: {0}")]
    RenderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Preview server error: {0}")]
    ServeError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl SlideError {
    /// Whether the failure looks like a rate limit rather than an outage.
    pub fn is_quota(&self) -> bool {
        match self {
            SlideError::QuotaExceeded(_) => true,
            SlideError::ApiError { status, .. } if *status == 429 => true,
            other => {
                let message = other.to_string().to_lowercase();
                message.contains("429") || message.contains("quota")
            }
        }
    }
}

// Implement conversion from anyhow::Error to our SlideError
impl From<anyhow::Error> for SlideError {
    fn from(err: anyhow::Error) -> Self {
        SlideError::UnknownError(err.to_string())
    }
}

impl From<serde_json::Error> for SlideError {
    fn from(err: serde_json::Error) -> Self {
        SlideError::ResponseFormat(err.to_string())
    }
}

impl From<image::ImageError> for SlideError {
    fn from(err: image::ImageError) -> Self {
        SlideError::ImageDecodeError(err.to_string())
    }
}

impl From<base64::DecodeError> for SlideError {
    fn from(err: base64::DecodeError) -> Self {
        SlideError::ImageDecodeError(format!("invalid base64 payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SlideError>;
