//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mesa-core errors (this file)                                          │
//! │  ├── CoreError        - Settlement domain errors                       │
//! │  └── ValidationError  - Input validation failures (InvalidArgument)    │
//! │                                                                         │
//! │  mesa-cashier errors (app crate)                                       │
//! │  ├── GatewayError     - REST API failures (opaque)                     │
//! │  └── AppError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, table, amount)
//! 3. Errors are enum variants, never String
//! 4. Input errors are local and never retried

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Settlement logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected input: negative percentage, non-positive split count,
    /// malformed amount text.
    ///
    /// ## User Workflow
    /// ```text
    /// Split bill (personas: 0)
    ///      │
    ///      ▼
    /// split_evenly(total, 0)
    ///      │
    ///      ▼
    /// InvalidArgument(MustBePositive { field: "people" })
    ///      │
    ///      ▼
    /// Previous figures stay on screen unchanged
    /// ```
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The bill for this table has already been closed by the server.
    ///
    /// A closed cuenta is terminal; nothing can be paid against it.
    #[error("Bill for table {table_id} is closed")]
    BillClosed { table_id: i64 },

    /// The settlement service answered with something we cannot interpret.
    #[error("Invalid settlement response: {reason}")]
    InvalidSettlementResponse { reason: String },

    /// A fresh snapshot reports less paid than the previous one.
    ///
    /// `amount_paid_so_far` is monotonic while the bill is open, so this
    /// means the snapshot is stale or belongs to another cuenta.
    #[error("Paid amount for table {table_id} went from {previous} to {current}")]
    PaidAmountDecreased {
        table_id: i64,
        previous: String,
        current: String,
    },
}

impl CoreError {
    /// True for local input failures (the `InvalidArgument` class).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoreError::InvalidArgument(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input or an API record doesn't meet
/// requirements. Used for early validation before any figure is derived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., non-numeric text in an amount field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BillClosed { table_id: 7 };
        assert_eq!(err.to_string(), "Bill for table 7 is closed");

        let err = CoreError::PaidAmountDecreased {
            table_id: 3,
            previous: "$50.00".to_string(),
            current: "$20.00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Paid amount for table 3 went from $50.00 to $20.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBeNonNegative {
            field: "percent".to_string(),
        };
        assert_eq!(err.to_string(), "percent must not be negative");

        let err = ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "amount has invalid format: not a number");
    }

    #[test]
    fn test_validation_converts_to_invalid_argument() {
        let validation_err = ValidationError::MustBePositive {
            field: "people".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(core_err.is_invalid_argument());
        assert!(!CoreError::BillClosed { table_id: 1 }.is_invalid_argument());
    }
}
