//! # App Error Type
//!
//! Unified error type for cashier commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cashier                            │
//! │                                                                         │
//! │  Command Function  ──►  Result<T, AppError>                             │
//! │                                                                         │
//! │  Operator input?   ─── CoreError::InvalidArgument ──────┐              │
//! │  Bill already closed? ─ CoreError::BillClosed ──────────┤              │
//! │  Odd server answer? ── CoreError::InvalidSettlement... ─┼──► AppError  │
//! │  Network / API?    ─── GatewayError ────────────────────┤   {code,     │
//! │  Paid, not re-read? ── SessionError::StaleSnapshot ─────┤    message}  │
//! │  Bad cashier.toml? ─── ConfigError ─────────────────────┘              │
//! │                                                                         │
//! │  Internal details are logged with `tracing`; the operator sees the     │
//! │  short message.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use mesa_core::{CoreError, ValidationError};
use serde::Serialize;

use crate::gateway::GatewayError;
use crate::state::{ConfigError, SessionError};

/// Error returned from cashier commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "BILL_CLOSED",
///   "message": "Bill for table 4 is closed"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Operator input failed validation
    ValidationError,

    /// The cuenta was already closed
    BillClosed,

    /// The cuentas service answered something we can't use
    InvalidResponse,

    /// The cuentas service could not be reached or refused the request
    GatewayError,

    /// A payment went through but the bill must be reloaded before the next
    RefreshRequired,

    /// cashier.toml or MESA_* variables are wrong
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Process exit status for the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::BillClosed => 4,
            ErrorCode::GatewayError | ErrorCode::InvalidResponse => 5,
            ErrorCode::RefreshRequired => 6,
            ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument(e) => AppError::validation(e.to_string()),
            CoreError::BillClosed { .. } => AppError::new(ErrorCode::BillClosed, err.to_string()),
            CoreError::InvalidSettlementResponse { ref reason } => {
                tracing::error!(reason = %reason, "Unusable settlement response");
                AppError::new(
                    ErrorCode::InvalidResponse,
                    "El servidor respondió algo inesperado; recargue la cuenta",
                )
            }
            CoreError::PaidAmountDecreased { table_id, .. } => {
                tracing::error!(table_id, "{}", err);
                AppError::new(
                    ErrorCode::InvalidResponse,
                    "El total pagado de la cuenta disminuyó; recargue la cuenta",
                )
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(msg) => AppError::new(ErrorCode::GatewayError, msg),
            other => {
                tracing::error!("Gateway failure: {}", other);
                AppError::new(ErrorCode::GatewayError, other.to_string())
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Config error: {}", err);
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Core(e) => e.into(),
            SessionError::Gateway(e) => e.into(),
            SessionError::StaleSnapshot { .. } => AppError::new(
                ErrorCode::RefreshRequired,
                "La cuenta cambió; recargue la cuenta antes de otro pago",
            ),
            SessionError::RefreshAfterPayment { outcome, source } => {
                tracing::error!(error = %source, "Bill refresh after payment failed");
                AppError::new(
                    ErrorCode::RefreshRequired,
                    format!("{}. No se pudo recargar la cuenta", outcome.message()),
                )
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON encoding failed: {}", err);
        AppError::internal("Failed to encode output")
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
