//! # Settlement Engine
//!
//! Pure computation over a [`BillState`] plus the operator's discount, tip and
//! payment amount. No network, no storage: every function is a deterministic
//! function of its arguments.
//!
//! ## Figures on the Settlement Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items ──► compute_product_subtotal ──► product_subtotal               │
//! │                                             │                           │
//! │                 apply_percentage(subtotal, 10%) ──► discount            │
//! │                 apply_percentage(subtotal, 15%) ──► tip                 │
//! │                                             │                           │
//! │  compute_final_total(subtotal, discount, tip) ──► final_total           │
//! │  compute_remaining(final_total, paid) ──────────► remaining             │
//! │                                             │                           │
//! │  resolve_payment_amount(entered, remaining) ──► amount                  │
//! │  classify_payment(amount, remaining) ─────────► FullClose | Partial     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Percentage Base
//! Discount and tip percentages are ALWAYS applied to the raw product
//! subtotal, never to a total that already carries a discount or tip.
//! Compounding them would overcharge the table.
//!
//! ## Example
//! ```rust
//! use mesa_core::settlement::*;
//! use mesa_core::{LineItem, Money};
//! use rust_decimal::Decimal;
//!
//! let items = vec![
//!     LineItem { product_name: "Arrachera".into(), quantity: 2, line_subtotal: Money::from_cents(10000) },
//!     LineItem { product_name: "Agua".into(), quantity: 1, line_subtotal: Money::from_cents(5000) },
//! ];
//! let subtotal = compute_product_subtotal(&items);
//! let discount = apply_percentage(subtotal, Decimal::from(10)).unwrap();
//! let tip = apply_percentage(subtotal, Decimal::from(15)).unwrap();
//!
//! assert_eq!(compute_final_total(subtotal, discount, tip), Money::from_cents(15750));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Adjustments, BillState, LineItem, PaymentMethod, Percentage};
use crate::wire::PaymentRequestDto;

/// Percentage buttons next to the discount field.
pub const DISCOUNT_PRESETS: [u32; 3] = [10, 20, 50];

/// Percentage buttons next to the tip field.
pub const TIP_PRESETS: [u32; 3] = [10, 15, 20];

// =============================================================================
// Core Operations
// =============================================================================

/// Sums the server-computed line subtotals. Empty bill → zero.
pub fn compute_product_subtotal(items: &[LineItem]) -> Money {
    items.iter().map(|item| item.line_subtotal).sum()
}

/// `round(base × percent / 100, 2)`, half-up.
///
/// Used identically for the discount and the tip buttons.
///
/// ## Errors
/// `InvalidArgument` when `percent < 0`.
pub fn apply_percentage(base: Money, percent: Decimal) -> CoreResult<Money> {
    let percent = Percentage::new(percent)?;
    Ok(percent.apply_to(base)?)
}

/// What each percentage button would set, for the given base.
///
/// ## Example
/// ```rust
/// use mesa_core::settlement::{preset_amounts, TIP_PRESETS};
/// use mesa_core::Money;
///
/// let tips = preset_amounts(Money::from_cents(15000), &TIP_PRESETS).unwrap();
/// assert_eq!(tips[1], (15, Money::from_cents(2250)));
/// ```
pub fn preset_amounts(base: Money, presets: &[u32]) -> CoreResult<Vec<(u32, Money)>> {
    presets
        .iter()
        .map(|&percent| -> CoreResult<(u32, Money)> {
            Ok((percent, Percentage::from_whole(percent).apply_to(base)?))
        })
        .collect()
}

/// `max(0, product_subtotal − discount) + tip`.
///
/// A discount larger than the subtotal is clamped rather than rejected: a
/// negative pre-tip total is not a state the screen models.
pub fn compute_final_total(product_subtotal: Money, discount: Money, tip: Money) -> Money {
    (product_subtotal - discount).floor_zero() + tip
}

/// `max(0, final_total − amount_paid_so_far)`.
pub fn compute_remaining(final_total: Money, amount_paid_so_far: Money) -> Money {
    (final_total - amount_paid_so_far).floor_zero()
}

/// An empty amount field means "pay the remaining". Anything entered is used
/// as-is, including overpayment; the server computes the change.
pub fn resolve_payment_amount(entered: Option<Money>, remaining: Money) -> Money {
    entered.unwrap_or(remaining)
}

/// Whether a payment would close the bill.
///
/// This only drives the confirmation prompt and the button label. The
/// settlement service decides for real and its answer wins.
pub fn classify_payment(amount: Money, remaining: Money) -> PaymentKind {
    if amount >= remaining {
        PaymentKind::FullClose
    } else {
        PaymentKind::Partial
    }
}

/// Seeds discount and tip when the settlement screen opens.
///
/// ## Rules
/// - A stored tip > 0 wins (it came from an earlier session)
/// - Otherwise the configured default tip percentage, if any, is applied to
///   the product subtotal
/// - A stored discount > 0 wins, otherwise no discount
pub fn initial_adjustments(bill: &BillState, default_tip: Percentage) -> CoreResult<Adjustments> {
    let tip = if bill.stored_tip.is_positive() {
        bill.stored_tip
    } else if !default_tip.is_zero() {
        default_tip.apply_to(bill.product_subtotal())?
    } else {
        Money::zero()
    };

    let discount = if bill.stored_discount.is_positive() {
        bill.stored_discount
    } else {
        Money::zero()
    };

    Ok(Adjustments { discount, tip })
}

// =============================================================================
// Payment Kind
// =============================================================================

/// Local classification of a payment, for operator copy only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    FullClose,
    Partial,
}

impl PaymentKind {
    /// Action named in the confirmation prompt.
    pub fn action_label(&self) -> &'static str {
        match self {
            PaymentKind::FullClose => "Cerrar Cuenta",
            PaymentKind::Partial => "Registrar Pago Parcial",
        }
    }

    /// Text of the submit button.
    pub fn button_label(&self) -> &'static str {
        match self {
            PaymentKind::FullClose => "CERRAR CUENTA",
            PaymentKind::Partial => "REGISTRAR PAGO",
        }
    }

    /// `¿Cerrar Cuenta de Mesa 4? Monto: $107.50`
    pub fn confirmation_prompt(&self, table_number: i64, amount: Money) -> String {
        format!(
            "¿{} de Mesa {}? Monto: {}",
            self.action_label(),
            table_number,
            amount
        )
    }
}

// =============================================================================
// Bill Summary
// =============================================================================

/// Every derived figure of one bill, computed in one pass.
///
/// Never stored: rebuilt from the latest snapshot every time it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillSummary {
    pub product_subtotal: Money,
    pub discount: Money,
    pub tip: Money,
    pub final_total: Money,
    pub amount_paid: Money,
    pub remaining: Money,
}

impl BillSummary {
    pub fn compute(bill: &BillState, adjustments: &Adjustments) -> Self {
        let product_subtotal = bill.product_subtotal();
        let final_total =
            compute_final_total(product_subtotal, adjustments.discount, adjustments.tip);

        BillSummary {
            product_subtotal,
            discount: adjustments.discount,
            tip: adjustments.tip,
            final_total,
            amount_paid: bill.amount_paid_so_far,
            remaining: compute_remaining(final_total, bill.amount_paid_so_far),
        }
    }

    /// True once nothing is left to pay.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }
}

// =============================================================================
// Settlement Outcome
// =============================================================================

/// What the settlement service decided. Authoritative, unlike [`PaymentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// The cuenta is closed; the bill is retired.
    Closed { change: Money },
    /// The payment was recorded and the cuenta stays open.
    Open { remaining: Money },
}

impl SettlementOutcome {
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, SettlementOutcome::Closed { .. })
    }

    /// Operator message after the server answered.
    pub fn message(&self) -> String {
        match self {
            SettlementOutcome::Closed { change } => format!("Cuenta cerrada. Cambio: {}", change),
            SettlementOutcome::Open { remaining } => {
                format!("Pago registrado. Restante: {}", remaining)
            }
        }
    }
}

// =============================================================================
// Payment Attempt
// =============================================================================

/// An in-flight payment request. Built once, submitted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentAttempt {
    /// Correlates the request with its response in the logs.
    #[ts(as = "String")]
    pub attempt_id: Uuid,
    pub table_id: i64,
    pub method: PaymentMethod,
    pub discount: Money,
    pub tip: Money,
    pub amount: Money,
    /// Local guess, for the prompt only.
    pub kind: PaymentKind,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PaymentAttempt {
    /// Resolves the amount against `summary.remaining` and classifies it.
    pub fn prepare(
        table_id: i64,
        summary: &BillSummary,
        method: PaymentMethod,
        entered_amount: Option<Money>,
    ) -> Self {
        let amount = resolve_payment_amount(entered_amount, summary.remaining);

        PaymentAttempt {
            attempt_id: Uuid::new_v4(),
            table_id,
            method,
            discount: summary.discount,
            tip: summary.tip,
            amount,
            kind: classify_payment(amount, summary.remaining),
            created_at: Utc::now(),
        }
    }

    /// Body of `POST /cuentas/cerrar/{table_id}`.
    pub fn to_request(&self) -> PaymentRequestDto {
        PaymentRequestDto {
            method: self.method,
            tip: self.tip.to_decimal(),
            discount: self.discount.to_decimal(),
            amount: self.amount.to_decimal(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, cents: i64) -> LineItem {
        LineItem {
            product_name: name.to_string(),
            quantity: 1,
            line_subtotal: Money::from_cents(cents),
        }
    }

    fn bill(items: Vec<LineItem>, paid_cents: i64) -> BillState {
        BillState {
            table_id: 4,
            items,
            stored_discount: Money::zero(),
            stored_tip: Money::zero(),
            amount_paid_so_far: Money::from_cents(paid_cents),
            reported_total: Money::zero(),
        }
    }

    #[test]
    fn test_product_subtotal() {
        assert_eq!(compute_product_subtotal(&[]), Money::zero());

        let items = vec![item("Tacos", 10000), item("Refresco", 5000), item("Flan", 1)];
        assert_eq!(compute_product_subtotal(&items), Money::from_cents(15001));
    }

    fn pct(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_apply_percentage() {
        let base = Money::from_cents(15000);
        assert_eq!(apply_percentage(base, pct(10)).unwrap(), Money::from_cents(1500));
        assert_eq!(apply_percentage(base, pct(15)).unwrap(), Money::from_cents(2250));
        assert_eq!(apply_percentage(base, pct(0)).unwrap(), Money::zero());
        assert_eq!(
            apply_percentage(base, Decimal::new(125, 1)).unwrap(),
            Money::from_cents(1875)
        );

        // 33.33 × 15% = 4.9995 → 5.00
        let odd = Money::from_cents(3333);
        assert_eq!(apply_percentage(odd, pct(15)).unwrap(), Money::from_cents(500));

        // 10.05 × 50% = 5.025 → 5.03 (half-up)
        let half = Money::from_cents(1005);
        assert_eq!(apply_percentage(half, pct(50)).unwrap(), Money::from_cents(503));
    }

    #[test]
    fn test_apply_percentage_rejects_negative() {
        let err = apply_percentage(Money::from_cents(10000), pct(-5)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_preset_amounts() {
        let base = Money::from_cents(15000);
        assert_eq!(
            preset_amounts(base, &DISCOUNT_PRESETS).unwrap(),
            vec![
                (10, Money::from_cents(1500)),
                (20, Money::from_cents(3000)),
                (50, Money::from_cents(7500)),
            ]
        );
        assert!(preset_amounts(base, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_final_total_scenario() {
        let items = vec![item("Plato fuerte", 10000), item("Postre", 5000)];
        let subtotal = compute_product_subtotal(&items);
        let discount = apply_percentage(subtotal, pct(10)).unwrap();
        let tip = apply_percentage(subtotal, pct(15)).unwrap();

        assert_eq!(discount, Money::from_cents(1500));
        assert_eq!(tip, Money::from_cents(2250));
        assert_eq!(compute_final_total(subtotal, discount, tip), Money::from_cents(15750));
    }

    #[test]
    fn test_discount_is_clamped() {
        let subtotal = Money::from_cents(5000);
        assert_eq!(
            compute_final_total(subtotal, Money::from_cents(8000), Money::zero()),
            Money::zero()
        );
        assert_eq!(
            compute_final_total(subtotal, Money::from_cents(8000), Money::from_cents(700)),
            Money::from_cents(700)
        );
    }

    #[test]
    fn test_final_total_is_idempotent() {
        let args = (Money::from_cents(15000), Money::from_cents(1500), Money::from_cents(2250));
        let first = compute_final_total(args.0, args.1, args.2);
        let second = compute_final_total(args.0, args.1, args.2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(
            compute_remaining(Money::from_cents(15750), Money::from_cents(5000)),
            Money::from_cents(10750)
        );
        assert_eq!(
            compute_remaining(Money::from_cents(15750), Money::from_cents(20000)),
            Money::zero()
        );
        assert_eq!(compute_remaining(Money::zero(), Money::zero()), Money::zero());
    }

    #[test]
    fn test_resolve_payment_amount() {
        let remaining = Money::from_cents(10750);
        assert_eq!(resolve_payment_amount(None, remaining), remaining);
        assert_eq!(
            resolve_payment_amount(Some(Money::from_cents(2000)), remaining),
            Money::from_cents(2000)
        );
        // Overpayment passes through untouched
        assert_eq!(
            resolve_payment_amount(Some(Money::from_cents(20000)), remaining),
            Money::from_cents(20000)
        );
    }

    #[test]
    fn test_classify_payment() {
        let remaining = Money::from_cents(10750);
        assert_eq!(classify_payment(remaining, remaining), PaymentKind::FullClose);
        assert_eq!(classify_payment(Money::from_cents(20000), remaining), PaymentKind::FullClose);
        assert_eq!(classify_payment(Money::from_cents(10749), remaining), PaymentKind::Partial);
        assert_eq!(classify_payment(Money::zero(), Money::zero()), PaymentKind::FullClose);
    }

    #[test]
    fn test_payment_kind_copy() {
        assert_eq!(PaymentKind::FullClose.button_label(), "CERRAR CUENTA");
        assert_eq!(PaymentKind::Partial.button_label(), "REGISTRAR PAGO");
        assert_eq!(
            PaymentKind::FullClose.confirmation_prompt(4, Money::from_cents(10750)),
            "¿Cerrar Cuenta de Mesa 4? Monto: $107.50"
        );
    }

    #[test]
    fn test_outcome_messages() {
        let closed = SettlementOutcome::Closed { change: Money::from_cents(250) };
        assert!(closed.is_closed());
        assert_eq!(closed.message(), "Cuenta cerrada. Cambio: $2.50");

        let open = SettlementOutcome::Open { remaining: Money::from_cents(5750) };
        assert!(!open.is_closed());
        assert_eq!(open.message(), "Pago registrado. Restante: $57.50");
    }

    #[test]
    fn test_summary() {
        let state = bill(vec![item("A", 10000), item("B", 5000)], 5000);
        let adjustments = Adjustments::new(Money::from_cents(1500), Money::from_cents(2250));
        let summary = BillSummary::compute(&state, &adjustments);

        assert_eq!(summary.product_subtotal, Money::from_cents(15000));
        assert_eq!(summary.final_total, Money::from_cents(15750));
        assert_eq!(summary.amount_paid, Money::from_cents(5000));
        assert_eq!(summary.remaining, Money::from_cents(10750));
        assert!(!summary.is_settled());
    }

    #[test]
    fn test_initial_adjustments_prefers_stored_values() {
        let mut state = bill(vec![item("A", 10000)], 0);
        state.stored_tip = Money::from_cents(1234);
        state.stored_discount = Money::from_cents(500);

        let adjustments = initial_adjustments(&state, Percentage::from_whole(20)).unwrap();
        assert_eq!(adjustments.tip, Money::from_cents(1234));
        assert_eq!(adjustments.discount, Money::from_cents(500));
    }

    #[test]
    fn test_initial_adjustments_uses_default_tip() {
        let state = bill(vec![item("A", 10000), item("B", 5000)], 0);

        let with_default = initial_adjustments(&state, Percentage::from_whole(10)).unwrap();
        assert_eq!(with_default.tip, Money::from_cents(1500));
        assert_eq!(with_default.discount, Money::zero());

        let without = initial_adjustments(&state, Percentage::zero()).unwrap();
        assert_eq!(without, Adjustments::default());
    }

    #[test]
    fn test_prepare_attempt() {
        let state = bill(vec![item("A", 10000), item("B", 5000)], 5000);
        let summary = BillSummary::compute(
            &state,
            &Adjustments::new(Money::from_cents(1500), Money::from_cents(2250)),
        );

        let full = PaymentAttempt::prepare(4, &summary, PaymentMethod::Card, None);
        assert_eq!(full.amount, Money::from_cents(10750));
        assert_eq!(full.kind, PaymentKind::FullClose);

        let partial = PaymentAttempt::prepare(
            4,
            &summary,
            PaymentMethod::Cash,
            Some(Money::from_cents(5000)),
        );
        assert_eq!(partial.kind, PaymentKind::Partial);
        assert_ne!(full.attempt_id, partial.attempt_id);

        let request = partial.to_request();
        assert_eq!(request.amount, Decimal::new(5000, 2));
        assert_eq!(request.discount, Decimal::new(1500, 2));
        assert_eq!(request.tip, Decimal::new(2250, 2));
    }
}
