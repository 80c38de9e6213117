//! # Validation Module
//!
//! Input validation and parsing for the settlement screen.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile UI (numeric keyboard)                                 │
//! │  └── Mostly digits, but free text still gets through                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Strict parsers  → InvalidArgument (rejects the operation)         │
//! │  └── Lenient parsers → zero (keeps the screen renderable)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Settlement service (server)                                  │
//! │  └── Authoritative validation of the payment                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mesa_core::validation::{parse_amount, parse_amount_lenient};
//! use mesa_core::Money;
//!
//! assert_eq!(parse_amount("107.50").unwrap(), Some(Money::from_cents(10750)));
//! assert_eq!(parse_amount("").unwrap(), None);
//! assert!(parse_amount("abc").is_err());
//!
//! assert_eq!(parse_amount_lenient("abc"), Money::zero());
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{Money, MAX_AMOUNT_CENTS};
use crate::types::Percentage;
use crate::MAX_SPLIT_PEOPLE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Parsers
// =============================================================================

/// Strips whitespace and an optional leading currency sign.
fn normalize_numeric(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('$').map(str::trim_start).unwrap_or(text)
}

fn parse_decimal(field: &str, text: &str) -> ValidationResult<Decimal> {
    Decimal::from_str(text).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a number", text),
    })
}

/// Parses an operator-entered amount strictly.
///
/// ## Rules
/// - Empty (or whitespace) → `None` ("pay the remaining")
/// - Optional `$` prefix
/// - Must be a non-negative number; rounded half-up to cents
///
/// ## Example
/// ```rust
/// use mesa_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("$ 15").unwrap().unwrap().cents(), 1500);
/// assert!(parse_amount("-3").is_err());
/// ```
pub fn parse_amount(text: &str) -> ValidationResult<Option<Money>> {
    let text = normalize_numeric(text);
    if text.is_empty() {
        return Ok(None);
    }

    let value = parse_decimal("amount", text)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: "amount".to_string(),
        });
    }

    Money::try_from_decimal(value).map(Some)
}

/// Reads the number at the start of an operator-typed field.
///
/// ## Rules
/// - Leading whitespace and `$` are skipped
/// - A comma is the decimal separator when the text has no `.` (`50,50`)
/// - Digits after the number are ignored (`50 pesos` → 50.00)
/// - No leading number (`doce`, `-5`, empty) → `None`
///
/// ## Errors
/// `OutOfRange` for a number above [`Money::max_amount`].
///
/// ## Example
/// ```rust
/// use mesa_core::validation::parse_amount_prefix;
///
/// assert_eq!(parse_amount_prefix("50,00").unwrap().unwrap().cents(), 5000);
/// assert_eq!(parse_amount_prefix("12.5 mxn").unwrap().unwrap().cents(), 1250);
/// assert_eq!(parse_amount_prefix("doce").unwrap(), None);
/// ```
pub fn parse_amount_prefix(text: &str) -> ValidationResult<Option<Money>> {
    let text = normalize_numeric(text);
    let separator = if text.contains('.') { '.' } else { ',' };

    let mut number = String::new();
    let mut seen_separator = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else if c == separator && !seen_separator {
            seen_separator = true;
            number.push('.');
        } else {
            break;
        }
    }

    let number = number.trim_end_matches('.');
    if !number.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let number = if number.starts_with('.') {
        format!("0{}", number)
    } else {
        number.to_string()
    };

    let value = parse_decimal("amount", &number)?;
    Money::try_from_decimal(value).map(Some)
}

/// Parses an amount best-effort: anything without a leading non-negative
/// number counts as zero.
///
/// Used for the discount and tip fields so the totals always render while the
/// operator is still typing.
pub fn parse_amount_lenient(text: &str) -> Money {
    parse_amount_prefix(text).ok().flatten().unwrap_or_default()
}

/// Parses a percentage such as `15`, `12.5` or `10%`.
pub fn parse_percentage(text: &str) -> ValidationResult<Percentage> {
    let text = text.trim();
    let text = text.strip_suffix('%').map(str::trim_end).unwrap_or(text);
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "percent".to_string(),
        });
    }

    Percentage::new(parse_decimal("percent", text)?)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the number of people a bill is split between.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_SPLIT_PEOPLE
pub fn validate_split_count(people: i64) -> ValidationResult<()> {
    if people <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "people".to_string(),
        });
    }

    if people > MAX_SPLIT_PEOPLE {
        return Err(ValidationError::OutOfRange {
            field: "people".to_string(),
            min: 1,
            max: MAX_SPLIT_PEOPLE,
        });
    }

    Ok(())
}

/// Validates a line item quantity (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates that an amount for `field` is not negative and not above
/// [`Money::max_amount`].
pub fn validate_non_negative_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    if amount > Money::max_amount() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
