use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// No tax rule is in force for the requested date
    #[error("Tax config not found: {0}")]
    ConfigNotFound(String),

    /// A payroll computation produced a negative net pay
    #[error("Negative net pay: {0}")]
    NegativeNetPay(String),

    /// A payout exceeds the account's spendable balance
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Webhook signature did not match the payload
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Attempted reuse of a provider reference
    #[error("Duplicate provider reference: {0}")]
    DuplicateProviderRef(String),

    /// A state transition the per-record guard refuses
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    /// Provider notification with no matching transaction
    #[error("Orphan notification: {0}")]
    OrphanNotification(String),

    /// Payment provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NegativeNetPay(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientFunds(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            AppError::DuplicateProviderRef(_) => StatusCode::CONFLICT,
            AppError::IllegalTransition(_) => StatusCode::CONFLICT,
            AppError::OrphanNotification(_) => StatusCode::NOT_FOUND,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        AppError::Provider(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
