//! # Split Bill
//!
//! Dividing a final total between the people at a table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $100.00 between 3                                                     │
//! │                                                                         │
//! │  split_evenly  → $33.33 each      (×3 = $99.99, one cent short)        │
//! │  split_shares  → [$33.34, $33.33, $33.33]  (sums to $100.00)           │
//! │                                                                         │
//! │  Leftover cents go one each to the first payers.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::validate_split_count;

/// `final_total / people`, rounded half-up to cents.
///
/// The shares may not add back up to `final_total`; see [`split_shares`].
///
/// ## Errors
/// `InvalidArgument` when `people ≤ 0`.
///
/// ## Example
/// ```rust
/// use mesa_core::split::split_evenly;
/// use mesa_core::Money;
///
/// assert_eq!(split_evenly(Money::from_cents(15750), 3).unwrap(), Money::from_cents(5250));
/// assert!(split_evenly(Money::from_cents(10000), 0).is_err());
/// ```
pub fn split_evenly(final_total: Money, people: i64) -> CoreResult<Money> {
    validate_split_count(people)?;

    let share = final_total.to_decimal() / Decimal::from(people);
    Ok(Money::try_from_decimal(share)?)
}

/// Splits `final_total` into `people` shares that sum to it exactly.
///
/// Every share is `final_total / people` truncated to the cent; the leftover
/// cents are handed out one each starting with the first payer, so no two
/// shares differ by more than one cent.
///
/// ## Errors
/// `InvalidArgument` when `people ≤ 0`.
pub fn split_shares(final_total: Money, people: i64) -> CoreResult<Vec<Money>> {
    validate_split_count(people)?;

    let cents = final_total.floor_zero().cents();
    let base = cents / people;
    let leftover = cents % people;

    Ok((0..people)
        .map(|i| Money::from_cents(if i < leftover { base + 1 } else { base }))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
