use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("No initData provided")]
    MissingInitData,

    #[error("No user data")]
    MissingUserData,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")] NotFound(String),

    #[error("Ad limit reached")]
    LimitReached,

    #[error("{0}")] AlreadyClaimed(String),

    #[error("Insufficient balance")]
    InsufficientFunds,

    #[error("Minimum withdrawal is {}", .minimum.normalize())]
    BelowMinimumWithdrawal {
        minimum: Decimal,
    },

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Body for expected business outcomes that did not apply.
#[derive(serde::Serialize)]
pub struct RejectionResponse {
    pub success: bool,
    pub message: String,
}

impl AppError {
    /// Business-rule rejections are expected outcomes, reported as `success: false`
    /// rather than as HTTP errors.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::LimitReached |
                AppError::AlreadyClaimed(_) |
                AppError::InsufficientFunds |
                AppError::BelowMinimumWithdrawal { .. }
        )
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            // Storage and configuration detail stays in the logs
            AppError::Database(_) => ("DATABASE_ERROR", "Internal server error".to_string(), None),
            AppError::Config(_) => ("CONFIG_ERROR", "Server configuration error".to_string(), None),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::MissingInitData =>
                ("MISSING_INIT_DATA", self.to_string(), Some("initData".to_string())),
            AppError::MissingUserData => ("MISSING_USER_DATA", self.to_string(), None),
            AppError::InvalidSignature => ("INVALID_SIGNATURE", self.to_string(), None),
            AppError::Unauthorized => ("UNAUTHORIZED", self.to_string(), None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            AppError::LimitReached => ("LIMIT_REACHED", self.to_string(), None),
            AppError::AlreadyClaimed(msg) => ("ALREADY_CLAIMED", msg.clone(), None),
            AppError::InsufficientFunds =>
                ("INSUFFICIENT_FUNDS", self.to_string(), Some("amount".to_string())),
            AppError::BelowMinimumWithdrawal { .. } =>
                ("BELOW_MINIMUM", self.to_string(), Some("amount".to_string())),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            | AppError::InvalidInput(_)
            | AppError::MissingInitData
            | AppError::MissingUserData => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature | AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ if self.is_rejection() => StatusCode::OK,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if self.is_rejection() {
            tracing::debug!("Rejected: {}", self);
            let body = RejectionResponse {
                success: false,
                message: self.to_string(),
            };
            return (status, axum::Json(body)).into_response();
        }

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimum_withdrawal_message_is_normalized() {
        let err = AppError::BelowMinimumWithdrawal { minimum: dec!(5.00) };
        assert_eq!(err.to_string(), "Minimum withdrawal is 5");

        let err = AppError::BelowMinimumWithdrawal { minimum: dec!(2.50) };
        assert_eq!(err.to_string(), "Minimum withdrawal is 2.5");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingInitData.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidSignature.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("User not found".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::LimitReached.status_code(), StatusCode::OK);
        assert_eq!(AppError::InsufficientFunds.status_code(), StatusCode::OK);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let response = AppError::Internal("connection refused at 10.0.0.3".into()).to_error_response();
        assert_eq!(response.error.message, "Internal server error");
    }
}
