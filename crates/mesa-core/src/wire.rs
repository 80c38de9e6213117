//! # Wire Shapes
//!
//! JSON records exchanged with the cuentas REST API, with the field names the
//! server actually uses. Amounts travel as JSON numbers and are converted to
//! cents exactly once, here.
//!
//! ```text
//! GET  /mesas                ──► Vec<Table>           (already in wire shape)
//! GET  /cuentas/mesa/{id}    ──► BillDetailDto      ──► BillState
//! POST /cuentas/cerrar/{id}  ◄── PaymentRequestDto  ◄── PaymentAttempt
//!                            ──► PaymentResponseDto ──► SettlementOutcome
//! ```
//!
//! The transport itself lives outside this crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::settlement::SettlementOutcome;
use crate::types::{BillState, LineItem, PaymentMethod};
use crate::validation::{validate_non_negative_amount, validate_quantity};

/// `estado` value of a response that closed the cuenta.
pub const CLOSED_STATUS: &str = "cerrada";

// =============================================================================
// Bill Detail
// =============================================================================

/// One entry of `items` in the bill detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemDto {
    #[serde(rename = "producto")]
    pub product: String,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub subtotal: Decimal,
}

/// The stored `cuenta` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CuentaDto {
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub total: Decimal,
    #[serde(rename = "descuento", default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub discount: Option<Decimal>,
    #[serde(rename = "propina", default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub tip: Option<Decimal>,
}

/// Response of `GET /cuentas/mesa/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillDetailDto {
    pub items: Vec<LineItemDto>,
    pub cuenta: CuentaDto,
    #[serde(rename = "totalPagado", default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub amount_paid: Option<Decimal>,
}

fn response_money(field: &str, value: Decimal) -> Result<Money, ValidationError> {
    let money = Money::try_from_decimal(value)?;
    validate_non_negative_amount(field, money)?;
    Ok(money)
}

fn invalid_response(err: ValidationError) -> CoreError {
    CoreError::InvalidSettlementResponse {
        reason: err.to_string(),
    }
}

impl BillDetailDto {
    /// Converts the served record into a validated snapshot.
    ///
    /// ## Errors
    /// `InvalidSettlementResponse` for a zero/negative quantity, a negative
    /// amount anywhere in the record, or any amount (the product subtotal
    /// included) above [`Money::max_amount`].
    pub fn into_bill_state(self, table_id: i64) -> CoreResult<BillState> {
        let items = self
            .items
            .into_iter()
            .map(|item| -> Result<LineItem, ValidationError> {
                validate_quantity(item.quantity)?;
                Ok(LineItem {
                    line_subtotal: response_money("subtotal", item.subtotal)?,
                    product_name: item.product,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<LineItem>, _>>()
            .map_err(invalid_response)?;

        items
            .iter()
            .try_fold(Money::zero(), |sum, item| sum.checked_add(item.line_subtotal))
            .filter(|subtotal| *subtotal <= Money::max_amount())
            .ok_or_else(|| CoreError::InvalidSettlementResponse {
                reason: format!("product subtotal exceeds {}", Money::max_amount()),
            })?;

        let or_zero = |v: Option<Decimal>| v.unwrap_or(Decimal::ZERO);

        Ok(BillState {
            table_id,
            items,
            stored_discount: response_money("descuento", or_zero(self.cuenta.discount))
                .map_err(invalid_response)?,
            stored_tip: response_money("propina", or_zero(self.cuenta.tip))
                .map_err(invalid_response)?,
            amount_paid_so_far: response_money("totalPagado", or_zero(self.amount_paid))
                .map_err(invalid_response)?,
            reported_total: response_money("total", self.cuenta.total)
                .map_err(invalid_response)?,
        })
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Body of `POST /cuentas/cerrar/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRequestDto {
    #[serde(rename = "metodoPago")]
    pub method: PaymentMethod,
    #[serde(rename = "propina", with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub tip: Decimal,
    #[serde(rename = "descuento", with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub discount: Decimal,
    #[serde(rename = "monto", with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub amount: Decimal,
}

/// Answer of the settlement service.
///
/// `estado == "cerrada"` closes the cuenta (with optional `cambio`); any other
/// status is an open cuenta and must carry `restante`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentResponseDto {
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "cambio", default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub change: Option<Decimal>,
    #[serde(rename = "restante", default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub remaining: Option<Decimal>,
}

impl PaymentResponseDto {
    /// Interprets the response. This is the authoritative close/partial
    /// decision.
    pub fn outcome(&self) -> CoreResult<SettlementOutcome> {
        if self.status == CLOSED_STATUS {
            let change = response_money("cambio", self.change.unwrap_or(Decimal::ZERO))
                .map_err(invalid_response)?;
            return Ok(SettlementOutcome::Closed { change });
        }

        let remaining = self
            .remaining
            .ok_or_else(|| CoreError::InvalidSettlementResponse {
                reason: format!("status '{}' without restante", self.status),
            })?;

        Ok(SettlementOutcome::Open {
            remaining: response_money("restante", remaining).map_err(invalid_response)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
