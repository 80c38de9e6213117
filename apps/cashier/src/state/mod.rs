//! # State Module
//!
//! What the cashier holds between commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │   CashierConfig          │      │   SettlementSession          │    │
//! │  │                          │      │                              │    │
//! │  │  restaurant_name         │─────►│  table                       │    │
//! │  │  default_tip_percent     │      │  BillState snapshot          │    │
//! │  │  receipt_width, presets  │      │  adjustments, amount, method │    │
//! │  └──────────────────────────┘      └──────────────────────────────┘    │
//! │                                                                         │
//! │  • CashierConfig: read-only after load                                 │
//! │  • SettlementSession: owned, mutated through &mut self, no locks       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{CashierConfig, ConfigError, ConfigResult};
pub use session::{PaymentPreview, SessionError, SessionResult, SettlementSession};
