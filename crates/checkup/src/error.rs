use crate::auth::AuthError;
use crate::categories::{AdapterError, ProviderError};
use crate::config::{AppEnvironment, ConfigError};
use crate::engagement::EngagementError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Startup and CLI failures. Request handlers report through [`ApiError`].
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Engagement(EngagementError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Engagement(err) => write!(f, "engagement error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Engagement(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EngagementError> for AppError {
    fn from(value: EngagementError) -> Self {
        Self::Engagement(value)
    }
}

/// HTTP-facing failure rendered as `{"error": .., "status": ..}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    environment: AppEnvironment,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            environment: AppEnvironment::default(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Production responses never leak server-side detail.
    pub fn for_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.environment.is_production() && self.status.is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.message
        };

        let body = Json(json!({ "error": message, "status": self.status.as_u16() }));
        (self.status, body).into_response()
    }
}

impl From<EngagementError> for ApiError {
    fn from(value: EngagementError) -> Self {
        let status = match value {
            EngagementError::NotConfirmable(_) => StatusCode::BAD_REQUEST,
            EngagementError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, value.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(value: ProviderError) -> Self {
        let status = match value {
            ProviderError::NotFound(_) => StatusCode::NOT_FOUND,
            ProviderError::Invalid(_) => StatusCode::BAD_REQUEST,
            ProviderError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, value.to_string())
    }
}

impl From<AdapterError> for ApiError {
    fn from(value: AdapterError) -> Self {
        match value {
            AdapterError::Provider(err) => err.into(),
            AdapterError::Engagement(err) => err.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        let status = match value {
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Missing
            | AuthError::Blank
            | AuthError::Rejected
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        };
        Self::new(status, value.to_string())
    }
}
