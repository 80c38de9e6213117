//! # Settlement Session
//!
//! One operator settling one table's cuenta.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settlement Session Flow                              │
//! │                                                                         │
//! │  open(table) ──► fetch_bill ──► BillState snapshot ──► seed tip/disc   │
//! │                                        │                                │
//! │         ┌──────────────────────────────┘                                │
//! │         ▼                                                               │
//! │  apply_*_percentage / set_*_text / set_method   (local inputs only)    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  summary() / preview()   ◄── always recomputed from the snapshot       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  submit() ──► PaymentAttempt ──► submit_payment (once)                  │
//! │                                        │                                │
//! │                    ┌───────────────────┴───────────────┐                │
//! │                    ▼                                   ▼                │
//! │             estado: cerrada                     estado: abierta         │
//! │             snapshot retired                    re-fetch snapshot,      │
//! │             (terminal)                          re-seed, recompute      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Figures are never patched with a local delta after a payment: the server's
//! answer and the re-fetched snapshot are the only sources.
//!
//! Once the server has accepted a payment the snapshot is stale and the amount
//! field is spent. No further attempt is prepared until a `refresh` succeeds,
//! so a failed re-fetch can never resend the same payment.

use chrono::Utc;
use mesa_core::receipt::{render_ticket, TicketHeader};
use mesa_core::settlement::{
    apply_percentage, classify_payment, initial_adjustments, resolve_payment_amount,
};
use mesa_core::split::{split_evenly, split_shares};
use mesa_core::validation::{
    parse_amount_lenient, parse_amount_prefix, validate_non_negative_amount,
};
use mesa_core::{
    Adjustments, BillState, BillSummary, CoreError, Money, PaymentAttempt, PaymentKind,
    PaymentMethod, Percentage, SettlementOutcome, Table, ValidationError,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::{BillGateway, GatewayError};

/// Failure of a session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A payment was accepted since the last successful fetch.
    #[error("Bill for table {table_id} must be refreshed before another payment")]
    StaleSnapshot { table_id: i64 },

    /// The server recorded the payment, then the re-fetch failed. `outcome`
    /// is the server's answer and stands.
    #[error("{} but the bill could not be refreshed: {}", .outcome.message(), .source)]
    RefreshAfterPayment {
        outcome: SettlementOutcome,
        source: Box<SessionError>,
    },
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Core(CoreError::InvalidArgument(err))
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What the pay button would do right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentPreview {
    pub amount: Money,
    pub kind: PaymentKind,
    pub button_label: &'static str,
    pub confirmation_prompt: String,
}

/// Latest snapshot of one table's bill plus the operator's pending inputs.
#[derive(Debug, Clone)]
pub struct SettlementSession {
    table: Table,
    /// `None` once the server closed the cuenta.
    bill: Option<BillState>,
    adjustments: Adjustments,
    amount_text: String,
    method: PaymentMethod,
    default_tip: Percentage,
    /// Set when the server accepted a payment the snapshot doesn't reflect.
    stale: bool,
}

fn fetch_snapshot(gateway: &dyn BillGateway, table_id: i64) -> SessionResult<BillState> {
    let detail = gateway.fetch_bill(table_id)?;
    Ok(detail.into_bill_state(table_id)?)
}

impl SettlementSession {
    /// Fetches the table's bill and seeds discount and tip.
    ///
    /// A tip or discount stored by an earlier session wins over
    /// `default_tip`. The amount field starts empty.
    pub fn open(
        table: Table,
        gateway: &dyn BillGateway,
        default_tip: Percentage,
    ) -> SessionResult<Self> {
        let bill = fetch_snapshot(gateway, table.id)?;
        let adjustments = initial_adjustments(&bill, default_tip)?;

        info!(
            table_id = table.id,
            table_number = table.number,
            items = bill.items.len(),
            amount_paid = %bill.amount_paid_so_far,
            "Settlement session opened"
        );

        Ok(SettlementSession {
            table,
            bill: Some(bill),
            adjustments,
            amount_text: String::new(),
            method: PaymentMethod::default(),
            default_tip,
            stale: false,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// True once the server has closed the cuenta.
    pub fn is_closed(&self) -> bool {
        self.bill.is_none()
    }

    /// The current snapshot.
    ///
    /// ## Errors
    /// `BillClosed` after the cuenta was closed.
    pub fn bill(&self) -> SessionResult<&BillState> {
        self.bill.as_ref().ok_or(SessionError::Core(CoreError::BillClosed {
            table_id: self.table.id,
        }))
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    /// True while a payment accepted by the server is not yet reflected in
    /// the snapshot.
    pub fn needs_refresh(&self) -> bool {
        self.stale
    }

    // =========================================================================
    // Operator Inputs
    // =========================================================================

    /// Sets the discount to `percent` of the product subtotal.
    ///
    /// On error the previous discount is kept.
    pub fn apply_discount_percentage(&mut self, percent: Decimal) -> SessionResult<Money> {
        let discount = apply_percentage(self.bill()?.product_subtotal(), percent)?;
        self.adjustments.discount = discount;
        debug!(table_id = self.table.id, %percent, %discount, "Discount percentage applied");
        Ok(discount)
    }

    /// Sets the tip to `percent` of the product subtotal (never of the
    /// discounted total).
    pub fn apply_tip_percentage(&mut self, percent: Decimal) -> SessionResult<Money> {
        let tip = apply_percentage(self.bill()?.product_subtotal(), percent)?;
        self.adjustments.tip = tip;
        debug!(table_id = self.table.id, %percent, %tip, "Tip percentage applied");
        Ok(tip)
    }

    pub fn set_discount(&mut self, discount: Money) -> SessionResult<()> {
        self.bill()?;
        validate_non_negative_amount("discount", discount)?;
        self.adjustments.discount = discount;
        Ok(())
    }

    pub fn set_tip(&mut self, tip: Money) -> SessionResult<()> {
        self.bill()?;
        validate_non_negative_amount("tip", tip)?;
        self.adjustments.tip = tip;
        Ok(())
    }

    /// Discount typed by hand. Unparseable text counts as zero.
    pub fn set_discount_text(&mut self, text: &str) -> SessionResult<()> {
        self.set_discount(parse_amount_lenient(text))
    }

    /// Tip typed by hand. Unparseable text counts as zero.
    pub fn set_tip_text(&mut self, text: &str) -> SessionResult<()> {
        self.set_tip(parse_amount_lenient(text))
    }

    /// Amount to charge. Only the leading number counts (`50,00` is 50.00);
    /// empty, zero or text without a number means "the remaining".
    ///
    /// ## Errors
    /// `InvalidArgument` for an amount over the ceiling; the previous text is
    /// kept.
    pub fn set_amount_text(&mut self, text: &str) -> SessionResult<()> {
        self.bill()?;
        parse_amount_prefix(text)?;
        self.amount_text = text.to_string();
        Ok(())
    }

    pub fn set_method(&mut self, method: PaymentMethod) -> SessionResult<()> {
        self.bill()?;
        self.method = method;
        Ok(())
    }

    fn entered_amount(&self) -> Option<Money> {
        parse_amount_prefix(&self.amount_text)
            .ok()
            .flatten()
            .filter(|amount| amount.is_positive())
    }

    // =========================================================================
    // Derived Figures
    // =========================================================================

    /// Every figure of the current snapshot with the pending adjustments.
    pub fn summary(&self) -> SessionResult<BillSummary> {
        Ok(BillSummary::compute(self.bill()?, &self.adjustments))
    }

    /// Amount and classification the next `submit` would use.
    pub fn preview(&self) -> SessionResult<PaymentPreview> {
        let summary = self.summary()?;
        let amount = resolve_payment_amount(self.entered_amount(), summary.remaining);
        let kind = classify_payment(amount, summary.remaining);

        Ok(PaymentPreview {
            amount,
            kind,
            button_label: kind.button_label(),
            confirmation_prompt: kind.confirmation_prompt(self.table.number, amount),
        })
    }

    /// The attempt `submit` would send, without sending it.
    ///
    /// ## Errors
    /// `StaleSnapshot` until the bill is refreshed after an accepted payment.
    pub fn prepare_attempt(&self) -> SessionResult<PaymentAttempt> {
        self.bill()?;
        if self.stale {
            return Err(SessionError::StaleSnapshot {
                table_id: self.table.id,
            });
        }

        Ok(PaymentAttempt::prepare(
            self.table.id,
            &self.summary()?,
            self.method,
            self.entered_amount(),
        ))
    }

    /// Per-person share of the final total.
    pub fn split(&self, people: i64) -> SessionResult<Money> {
        Ok(split_evenly(self.summary()?.final_total, people)?)
    }

    /// Shares of the final total that add back up to it exactly.
    pub fn split_shares(&self, people: i64) -> SessionResult<Vec<Money>> {
        Ok(split_shares(self.summary()?.final_total, people)?)
    }

    /// Puts the per-person share into the amount field.
    pub fn use_split_share(&mut self, people: i64) -> SessionResult<Money> {
        let share = self.split(people)?;
        self.amount_text = share.to_decimal().to_string();
        Ok(share)
    }

    /// Receipt ticket for the current snapshot and adjustments, amounts
    /// printed with `format_money`.
    pub fn ticket(
        &self,
        restaurant_name: &str,
        width: usize,
        format_money: &dyn Fn(Money) -> String,
    ) -> SessionResult<String> {
        let bill = self.bill()?;
        let header = TicketHeader {
            restaurant_name: restaurant_name.to_string(),
            table_number: self.table.number,
            printed_at: Some(Utc::now()),
        };
        Ok(render_ticket(
            &header,
            bill,
            &BillSummary::compute(bill, &self.adjustments),
            width,
            format_money,
        ))
    }

    // =========================================================================
    // Server Round Trips
    // =========================================================================

    /// Replaces the snapshot with a fresh one and re-seeds the inputs.
    ///
    /// ## Errors
    /// `PaidAmountDecreased` if the fresh snapshot reports less paid than the
    /// current one; the current snapshot is kept.
    pub fn refresh(&mut self, gateway: &dyn BillGateway) -> SessionResult<&BillState> {
        let previous_paid = self.bill()?.amount_paid_so_far;
        let fresh = fetch_snapshot(gateway, self.table.id)?;

        if fresh.amount_paid_so_far < previous_paid {
            return Err(CoreError::PaidAmountDecreased {
                table_id: self.table.id,
                previous: previous_paid.to_string(),
                current: fresh.amount_paid_so_far.to_string(),
            }
            .into());
        }

        self.adjustments = initial_adjustments(&fresh, self.default_tip)?;
        self.amount_text.clear();
        self.stale = false;
        debug!(
            table_id = self.table.id,
            amount_paid = %fresh.amount_paid_so_far,
            "Bill snapshot refreshed"
        );

        let bill: &BillState = self.bill.insert(fresh);
        Ok(bill)
    }

    /// Sends one payment built from the current snapshot and inputs.
    ///
    /// The server's `estado` decides the outcome, whatever the local
    /// classification said. A closed cuenta retires the session. An open one
    /// is re-fetched and every figure is derived again from the new snapshot.
    ///
    /// ## Errors
    /// - Gateway failure on the POST: nothing changes, the payment may be
    ///   retried
    /// - Any failure after the POST succeeded (unreadable answer, failed
    ///   re-fetch): the amount field is cleared and the session stays stale
    ///   until [`refresh`](Self::refresh) succeeds. A failed re-fetch returns
    ///   `RefreshAfterPayment` carrying the server's outcome.
    pub fn submit(&mut self, gateway: &dyn BillGateway) -> SessionResult<SettlementOutcome> {
        let attempt = self.prepare_attempt()?;

        info!(
            attempt_id = %attempt.attempt_id,
            table_id = attempt.table_id,
            amount = %attempt.amount,
            method = %attempt.method,
            kind = ?attempt.kind,
            "Submitting payment"
        );

        let response = gateway.submit_payment(self.table.id, &attempt.to_request())?;

        // The server has the payment; the snapshot and the typed amount are spent.
        self.amount_text.clear();
        self.stale = true;

        let outcome = response.outcome()?;

        match outcome {
            SettlementOutcome::Closed { change } => {
                info!(
                    attempt_id = %attempt.attempt_id,
                    table_id = self.table.id,
                    %change,
                    "Cuenta closed"
                );
                self.bill = None;
                self.stale = false;
            }
            SettlementOutcome::Open { remaining } => {
                info!(
                    attempt_id = %attempt.attempt_id,
                    table_id = self.table.id,
                    %remaining,
                    "Partial payment recorded"
                );
                if let Err(source) = self.refresh(gateway) {
                    warn!(
                        attempt_id = %attempt.attempt_id,
                        table_id = self.table.id,
                        error = %source,
                        "Bill refresh after payment failed"
                    );
                    return Err(SessionError::RefreshAfterPayment {
                        outcome,
                        source: Box::new(source),
                    });
                }

                let derived = self.summary()?.remaining;
                if derived != remaining {
                    warn!(
                        table_id = self.table.id,
                        server_remaining = %remaining,
                        derived_remaining = %derived,
                        "Server remaining differs from re-fetched bill"
                    );
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_core::types::TableStatus;
    use mesa_core::wire::{BillDetailDto, PaymentRequestDto, PaymentResponseDto};

    struct StaticGateway(&'static str);

    impl BillGateway for StaticGateway {
        fn list_tables(&self) -> crate::gateway::GatewayResult<Vec<Table>> {
            Ok(Vec::new())
        }

        fn fetch_bill(&self, _table_id: i64) -> crate::gateway::GatewayResult<BillDetailDto> {
            Ok(serde_json::from_str(self.0)?)
        }

        fn submit_payment(
            &self,
            _table_id: i64,
            _request: &PaymentRequestDto,
        ) -> crate::gateway::GatewayResult<PaymentResponseDto> {
            Err(GatewayError::Unavailable("static".into()))
        }
    }

    const BILL: &str = r#"{
        "items": [
            {"producto": "Enchiladas", "cantidad": 2, "subtotal": 100},
            {"producto": "Horchata", "cantidad": 1, "subtotal": 50}
        ],
        "cuenta": {"total": 150},
        "totalPagado": 50
    }"#;

    fn table() -> Table {
        Table {
            id: 12,
            number: 4,
            status: TableStatus::Ocupada,
        }
    }

    fn open(default_tip: u32) -> SettlementSession {
        SettlementSession::open(
            table(),
            &StaticGateway(BILL),
            Percentage::from_whole(default_tip),
        )
        .unwrap()
    }

    #[test]
    fn test_open_seeds_default_tip() {
        let session = open(10);
        assert_eq!(session.adjustments().tip, Money::from_cents(1500));
        assert!(session.adjustments().discount.is_zero());
        assert_eq!(session.amount_text(), "");
        assert_eq!(session.method(), PaymentMethod::Cash);
    }

    #[test]
    fn test_percentages_use_product_subtotal() {
        let mut session = open(0);
        session.apply_discount_percentage(Decimal::from(10)).unwrap();
        session.apply_tip_percentage(Decimal::from(15)).unwrap();

        let summary = session.summary().unwrap();
        assert_eq!(summary.discount, Money::from_cents(1500));
        assert_eq!(summary.tip, Money::from_cents(2250));
        assert_eq!(summary.final_total, Money::from_cents(15750));
        assert_eq!(summary.remaining, Money::from_cents(10750));
    }

    #[test]
    fn test_negative_percentage_keeps_previous_discount() {
        let mut session = open(0);
        session.apply_discount_percentage(Decimal::from(20)).unwrap();

        let err = session.apply_discount_percentage(Decimal::from(-5)).unwrap_err();
        assert!(matches!(err, SessionError::Core(ref e) if e.is_invalid_argument()));
        assert_eq!(session.adjustments().discount, Money::from_cents(3000));
    }

    #[test]
    fn test_lenient_text_fields() {
        let mut session = open(0);
        session.set_tip_text("12.5").unwrap();
        session.set_discount_text("abc").unwrap();

        assert_eq!(session.adjustments().tip, Money::from_cents(1250));
        assert!(session.adjustments().discount.is_zero());
    }

    #[test]
    fn test_preview() {
        let mut session = open(0);
        session.apply_discount_percentage(Decimal::from(10)).unwrap();
        session.apply_tip_percentage(Decimal::from(15)).unwrap();

        let full = session.preview().unwrap();
        assert_eq!(full.amount, Money::from_cents(10750));
        assert_eq!(full.kind, PaymentKind::FullClose);
        assert_eq!(full.confirmation_prompt, "¿Cerrar Cuenta de Mesa 4? Monto: $107.50");

        session.set_amount_text("50").unwrap();
        let partial = session.preview().unwrap();
        assert_eq!(partial.amount, Money::from_cents(5000));
        assert_eq!(partial.kind, PaymentKind::Partial);

        // Zero or garbage falls back to the remaining.
        session.set_amount_text("0").unwrap();
        assert_eq!(session.preview().unwrap().amount, Money::from_cents(10750));
        session.set_amount_text("doce").unwrap();
        assert_eq!(session.preview().unwrap().kind, PaymentKind::FullClose);
    }

    #[test]
    fn test_amount_text_reads_leading_number() {
        let mut session = open(0);

        session.set_amount_text("50,00").unwrap();
        let preview = session.preview().unwrap();
        assert_eq!(preview.amount, Money::from_cents(5000));
        assert_eq!(preview.kind, PaymentKind::Partial);

        session.set_amount_text("20 pesos").unwrap();
        assert_eq!(session.preview().unwrap().amount, Money::from_cents(2000));

        let err = session.set_amount_text("99999999999999999999").unwrap_err();
        assert!(matches!(err, SessionError::Core(ref e) if e.is_invalid_argument()));
        assert_eq!(session.amount_text(), "20 pesos");
    }

    #[test]
    fn test_ticket_uses_given_currency() {
        let session = open(0);
        let ticket = session
            .ticket("Mi Restaurante", 32, &|m| format!("€{}", m.to_decimal()))
            .unwrap();

        assert!(ticket.contains("€150.00"));
        assert!(!ticket.contains('$'));
    }

    #[test]
    fn test_use_split_share() {
        let mut session = open(0);
        session.apply_discount_percentage(Decimal::from(10)).unwrap();
        session.apply_tip_percentage(Decimal::from(15)).unwrap();

        let share = session.use_split_share(3).unwrap();
        assert_eq!(share, Money::from_cents(5250));
        assert_eq!(session.amount_text(), "52.50");
        assert_eq!(session.preview().unwrap().kind, PaymentKind::Partial);

        assert!(session.split(0).is_err());
        assert_eq!(session.amount_text(), "52.50");
    }

    #[test]
    fn test_ticket_uses_session_figures() {
        let mut session = open(0);
        session.set_tip(Money::from_cents(2250)).unwrap();
        let ticket = session.ticket("Mi Restaurante", 32, &|m| m.to_string()).unwrap();

        assert!(ticket.contains("Mesa 4"));
        assert!(ticket.contains("TOTAL:                   $172.50"));
    }

    #[test]
    fn test_submit_gateway_failure_keeps_session_open() {
        let mut session = open(0);
        session.set_amount_text("50").unwrap();
        let err = session.submit(&StaticGateway(BILL)).unwrap_err();
        assert!(matches!(err, SessionError::Gateway(_)));
        assert!(!session.is_closed());
        assert!(!session.needs_refresh());
        assert_eq!(session.amount_text(), "50");
    }

    #[test]
    fn test_refresh_after_payment_error_message() {
        let err = SessionError::RefreshAfterPayment {
            outcome: SettlementOutcome::Open {
                remaining: Money::from_cents(5750),
            },
            source: Box::new(GatewayError::Unavailable("timeout".into()).into()),
        };
        assert_eq!(
            err.to_string(),
            "Pago registrado. Restante: $57.50 but the bill could not be refreshed: \
             Cuentas service unavailable: timeout"
        );
    }
}
