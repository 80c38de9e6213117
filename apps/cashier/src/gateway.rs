//! # Bill Gateway
//!
//! The cashier's only route to the cuentas REST API.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────────────┐
//! │  SettlementSession   │──────► │  dyn BillGateway                     │
//! │                      │        │   list_tables   GET  /mesas          │
//! │                      │◄────── │   fetch_bill    GET  /cuentas/mesa/n │
//! └──────────────────────┘        │   submit_payment POST /cuentas/...   │
//!                                 └──────────────┬───────────────────────┘
//!                                                │
//!                       ┌────────────────────────┴──────────────┐
//!                       ▼                                       ▼
//!               HTTP client (outside                 FileGateway (bill JSON
//!               this workspace)                      saved to disk, read only)
//! ```
//!
//! Methods are synchronous and return the raw wire shapes; turning them into
//! domain values is `mesa_core::wire`'s job.

use std::fs;
use std::path::PathBuf;

use mesa_core::wire::{BillDetailDto, PaymentRequestDto, PaymentResponseDto};
use mesa_core::Table;
use thiserror::Error;
use tracing::debug;

/// Failure of the collaborator behind [`BillGateway`].
///
/// The message is shown to the operator as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Cuentas service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error (`msg` of the error body).
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to read bill data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cuentas payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Access to tables and cuentas.
pub trait BillGateway {
    /// `GET /mesas`
    fn list_tables(&self) -> GatewayResult<Vec<Table>>;

    /// `GET /cuentas/mesa/{table_id}`
    fn fetch_bill(&self, table_id: i64) -> GatewayResult<BillDetailDto>;

    /// `POST /cuentas/cerrar/{table_id}`. Called at most once per attempt.
    fn submit_payment(
        &self,
        table_id: i64,
        request: &PaymentRequestDto,
    ) -> GatewayResult<PaymentResponseDto>;
}

// =============================================================================
// File Gateway
// =============================================================================

/// Read-only gateway over JSON files in the API's own shapes.
///
/// Serves the same bill for any table id. Payments are refused.
#[derive(Debug, Clone, Default)]
pub struct FileGateway {
    bill_path: Option<PathBuf>,
    tables_path: Option<PathBuf>,
}

impl FileGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bill(mut self, path: impl Into<PathBuf>) -> Self {
        self.bill_path = Some(path.into());
        self
    }

    pub fn with_tables(mut self, path: impl Into<PathBuf>) -> Self {
        self.tables_path = Some(path.into());
        self
    }
}

impl BillGateway for FileGateway {
    fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        let path = self
            .tables_path
            .as_ref()
            .ok_or_else(|| GatewayError::Unavailable("no tables file given".into()))?;
        debug!(?path, "Reading tables file");
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn fetch_bill(&self, table_id: i64) -> GatewayResult<BillDetailDto> {
        let path = self
            .bill_path
            .as_ref()
            .ok_or_else(|| GatewayError::Unavailable("no bill file given".into()))?;
        debug!(?path, table_id, "Reading bill file");
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn submit_payment(
        &self,
        table_id: i64,
        _request: &PaymentRequestDto,
    ) -> GatewayResult<PaymentResponseDto> {
        Err(GatewayError::Unavailable(format!(
            "cannot settle table {} from a saved bill file",
            table_id
        )))
    }
}
