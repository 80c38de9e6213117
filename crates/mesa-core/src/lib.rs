//! # mesa-core: Bill Settlement Logic for Mesa POS
//!
//! Everything the cashier needs to settle a table's cuenta, as pure
//! functions over plain data. The HTTP client, the terminal and the config
//! file all live in `mesa-cashier`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mesa POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    mesa-cashier (app)                           │   │
//! │  │   CLI ──► SettlementSession ──► BillGateway (cuentas REST API) │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mesa-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   money   │  │ settlement │  │   split   │  │  receipt  │ │   │
//! │  │   │   Money   │  │ BillSummary│  │  shares   │  │  ticket   │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐                │   │
//! │  │   │   types   │  │ validation │  │   wire    │                │   │
//! │  │   │ BillState │  │  parsers   │  │   DTOs    │                │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK READS OUTSIDE PaymentAttempt  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer cents, decimal conversion at the edges
//! - [`types`] - Tables, bill snapshots, percentages, payment methods
//! - [`settlement`] - Totals, remaining balance, payment classification
//! - [`split`] - Dividing a total between diners
//! - [`receipt`] - Plain-text ticket rendering
//! - [`validation`] - Operator input parsing
//! - [`wire`] - JSON shapes of the cuentas API
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::settlement::{classify_payment, compute_final_total, PaymentKind};
//! use mesa_core::{Money, Percentage};
//!
//! let subtotal = Money::from_cents(15000);
//! let discount = Percentage::from_whole(10).apply_to(subtotal).unwrap();
//! let tip = Percentage::from_whole(15).apply_to(subtotal).unwrap();
//!
//! let total = compute_final_total(subtotal, discount, tip);
//! assert_eq!(total, Money::from_cents(15750));
//!
//! let remaining = total - Money::from_cents(5000);
//! assert_eq!(classify_payment(remaining, remaining), PaymentKind::FullClose);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receipt;
pub mod settlement;
pub mod split;
pub mod types;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use settlement::{BillSummary, PaymentAttempt, PaymentKind, SettlementOutcome};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest party a bill can be split between.
///
/// Catches a mistyped head count (500 instead of 5) before it turns into a
/// list of one-cent shares.
pub const MAX_SPLIT_PEOPLE: i64 = 50;
