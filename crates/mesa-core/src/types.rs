//! # Domain Types
//!
//! Core domain types of the cuentas (bill settlement) flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │    BillState    │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  table_id       │   │  product_name   │       │
//! │  │  number         │   │  items ─────────┼──►│  quantity       │       │
//! │  │  status         │   │  stored_discount│   │  line_subtotal  │       │
//! │  └─────────────────┘   │  stored_tip     │   └─────────────────┘       │
//! │                        │  amount_paid    │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │  PaymentMethod  │   │   Adjustments   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Decimal ≥ 0    │   │  Cash           │   │  discount       │       │
//! │  │  15 = 15%       │   │  Card           │   │  tip            │       │
//! │  └─────────────────┘   │  Transfer       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! A `BillState` is an immutable snapshot of what the server reported. It is
//! replaced wholesale after every payment, never patched in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A non-negative percentage (`15` means 15%).
///
/// Used identically for discount and tip buttons. Kept as a `Decimal` so that
/// `12.5%` stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "Decimal")]
pub struct Percentage(#[ts(type = "number")] Decimal);

impl Percentage {
    /// Creates a percentage, rejecting negative values.
    pub fn new(percent: Decimal) -> Result<Self, ValidationError> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(ValidationError::MustBeNonNegative {
                field: "percent".to_string(),
            });
        }
        Ok(Percentage(percent))
    }

    /// Creates a whole-number percentage. Always valid.
    #[inline]
    pub fn from_whole(percent: u32) -> Self {
        Percentage(Decimal::from(percent))
    }

    /// Zero percent.
    #[inline]
    pub fn zero() -> Self {
        Percentage(Decimal::ZERO)
    }

    /// Returns the raw percentage value.
    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `round(base × self / 100, 2)`, half-up.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::{Money, Percentage};
    ///
    /// let tip = Percentage::from_whole(15).apply_to(Money::from_cents(15000)).unwrap();
    /// assert_eq!(tip.cents(), 2250);
    /// ```
    pub fn apply_to(&self, base: Money) -> Result<Money, ValidationError> {
        base.to_decimal()
            .checked_mul(self.0)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "percent".to_string(),
                min: 0,
                max: i64::MAX,
            })
            .and_then(Money::try_from_decimal)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

/// Serialized as a JSON number, like every other figure the API exchanges.
impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Table (Mesa)
// =============================================================================

/// Floor status of a table as reported by `GET /mesas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Free, nothing to bill.
    Disponible,
    /// Seated with an open cuenta.
    Ocupada,
    /// Waiting (reserved / about to be seated).
    Espera,
    /// Any status this client doesn't know about.
    #[serde(other)]
    Unknown,
}

/// A physical table on the floor plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Table {
    /// Server identifier used in `/cuentas/mesa/{id}`.
    pub id: i64,
    /// Number painted on the table (shown as "Mesa 4").
    #[serde(rename = "numero")]
    pub number: i64,
    #[serde(rename = "estado")]
    pub status: TableStatus,
}

impl Table {
    /// Only occupied tables have a cuenta to settle.
    #[inline]
    pub fn has_open_bill(&self) -> bool {
        self.status == TableStatus::Ocupada
    }
}

/// Filters the floor plan down to tables with an open bill, keeping order.
pub fn occupied_tables(tables: &[Table]) -> Vec<Table> {
    tables.iter().filter(|t| t.has_open_bill()).cloned().collect()
}

// =============================================================================
// Line Item
// =============================================================================

/// One ordered product on an open bill.
///
/// `line_subtotal` is computed by the server (`unit_price × quantity`) and is
/// authoritative. It is never recomputed here: the unit price may have
/// changed since the item was ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_name: String,
    /// Always > 0.
    pub quantity: i64,
    /// Always ≥ 0.
    pub line_subtotal: Money,
}

// =============================================================================
// Bill State (Cuenta)
// =============================================================================

/// The open financial record for one table, exactly as last reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillState {
    pub table_id: i64,
    pub items: Vec<LineItem>,
    /// Discount persisted from a previous settlement session (may be zero).
    pub stored_discount: Money,
    /// Tip persisted from a previous settlement session (may be zero).
    pub stored_tip: Money,
    /// Cumulative partial payments. Never decreases while the bill is open.
    pub amount_paid_so_far: Money,
    /// `cuenta.total` as served. Display only; never a computation base.
    pub reported_total: Money,
}

impl BillState {
    /// Sum of the line subtotals. See [`crate::settlement::compute_product_subtotal`].
    pub fn product_subtotal(&self) -> Money {
        crate::settlement::compute_product_subtotal(&self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. Serialized with the API's Spanish names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "efectivo")]
    Cash,
    #[serde(rename = "tarjeta")]
    Card,
    #[serde(rename = "transferencia")]
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];

    /// Wire name (`efectivo`, `tarjeta`, `transferencia`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "efectivo",
            PaymentMethod::Card => "tarjeta",
            PaymentMethod::Transfer => "transferencia",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" | "cash" => Ok(PaymentMethod::Cash),
            "tarjeta" | "card" => Ok(PaymentMethod::Card),
            "transferencia" | "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(ValidationError::InvalidFormat {
                field: "method".to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Adjustments
// =============================================================================

/// Discount and tip as raw amounts, already resolved from manual entry or a
/// percentage button. Immutable per computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Adjustments {
    pub discount: Money,
    pub tip: Money,
}

impl Adjustments {
    pub fn new(discount: Money, tip: Money) -> Self {
        Adjustments { discount, tip }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rejects_negative() {
        assert!(Percentage::new(Decimal::new(-1, 0)).is_err());
        assert!(Percentage::new(Decimal::ZERO).is_ok());
        assert!(Percentage::new(Decimal::new(125, 1)).is_ok());
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_whole(15).to_string(), "15%");
        assert_eq!(Percentage::new(Decimal::new(1250, 2)).unwrap().to_string(), "12.5%");
    }

    #[test]
    fn test_percentage_deserialize_validates() {
        let ok: Percentage = serde_json::from_str("10").unwrap();
        assert_eq!(ok, Percentage::from_whole(10));
        assert!(serde_json::from_str::<Percentage>("-5").is_err());
        assert_eq!(serde_json::to_string(&Percentage::from_whole(15)).unwrap(), "15.0");
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Transfer).unwrap(),
            "\"transferencia\""
        );
        assert_eq!("Tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_occupied_tables() {
        let tables: Vec<Table> = serde_json::from_str(
            r#"[
                {"id": 1, "numero": 1, "estado": "disponible"},
                {"id": 2, "numero": 2, "estado": "ocupada"},
                {"id": 3, "numero": 3, "estado": "espera"},
                {"id": 4, "numero": 4, "estado": "limpieza"},
                {"id": 5, "numero": 5, "estado": "ocupada"}
            ]"#,
        )
        .unwrap();

        assert_eq!(tables[3].status, TableStatus::Unknown);
        let open: Vec<i64> = occupied_tables(&tables).iter().map(|t| t.id).collect();
        assert_eq!(open, vec![2, 5]);
    }
}
