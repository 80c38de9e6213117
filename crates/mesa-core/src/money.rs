//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The cuentas API speaks JSON numbers:                                   │
//! │    100.1 + 50.2 = 150.29999999999998  ❌ WRONG!                         │
//! │                                                                         │
//! │  Splitting a bill:                                                      │
//! │    $100.00 / 3 = $33.33 (×3 = $99.99)  → Lost $0.01!                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Floats are converted ONCE at the boundary (rust_decimal, half-up)    │
//! │    Everything after that is i64 cents                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mesa_core::money::Money;
//!
//! // Create from cents (preferred)
//! let plato = Money::from_cents(10000); // $100.00
//!
//! // Arithmetic operations
//! let total = plato + Money::from_cents(5000);  // $150.00
//! assert_eq!(total.to_string(), "$150.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

/// Decimal places of every amount shown to the operator or sent to the API.
pub const MONEY_DECIMALS: u32 = 2;

/// Largest amount accepted from the API or the operator: $1,000,000,000,000.00.
///
/// Any bill built from accepted amounts stays far from `i64` overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Intermediate results like `subtotal - discount` can dip
///   below zero before being clamped
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Ord**: Lets clamping read as `(a - b).max(Money::zero())`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.line_subtotal ──► product_subtotal ──┬──► discount (%)        │
/// │                                                └──► tip (%)             │
/// │                                                                         │
/// │  final_total = max(0, subtotal - discount) + tip                        │
/// │  remaining   = max(0, final_total - amount_paid_so_far)                 │
/// │                                                                         │
/// │  EVERY amount on the settlement screen flows through this type         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let propina = Money::from_cents(2250); // Represents $22.50
    /// assert_eq!(propina.cents(), 2250);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount to cents, rounding half-up to 2 places.
    ///
    /// This is the single entry point for values coming from JSON floats,
    /// operator text or percentage math. Magnitudes above
    /// [`MAX_AMOUNT_CENTS`] are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let m = Money::try_from_decimal(Decimal::new(22505, 3)).unwrap(); // 22.505
    /// assert_eq!(m.cents(), 2251);
    /// ```
    pub fn try_from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        let mut rounded =
            value.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_DECIMALS);
        i64::try_from(rounded.mantissa())
            .ok()
            .filter(|cents| cents.abs() <= MAX_AMOUNT_CENTS)
            .map(Money)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "amount".to_string(),
                min: -MAX_AMOUNT_CENTS,
                max: MAX_AMOUNT_CENTS,
            })
    }

    /// Largest accepted amount.
    #[inline]
    pub const fn max_amount() -> Self {
        Money(MAX_AMOUNT_CENTS)
    }

    /// Addition that reports `i64` overflow instead of saturating.
    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns the exact decimal value (`cents / 100`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_DECIMALS)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let over_discounted = Money::from_cents(5000) - Money::from_cents(8000);
    /// assert_eq!(over_discounted.floor_zero(), Money::zero());
    /// ```
    #[inline]
    pub fn floor_zero(self) -> Self {
        self.max(Money::zero())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the settlement screen does: `$157.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturates at the `i64` bounds; use [`Money::checked_add`] where overflow
/// must be reported.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
