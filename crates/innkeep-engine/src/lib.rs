//! # innkeep-engine: Settlement Engine for Innkeep
//!
//! This crate is the stateful half of Innkeep: it holds the live
//! rental board, the drink catalog and the shift journal in memory and
//! exposes the operations the front desk runs. All of the pricing math
//! lives in `innkeep-core`; this crate decides when it runs and what
//! gets written down afterwards.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Data Flow                                │
//! │                                                                         │
//! │  Desk Command (check_in, add_drink, commit_checkout, ...)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  innkeep-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌───────────────┐  │   │
//! │  │   │ SettlementSvc  │   │  DrinkLedger  │   │  ShiftLedger  │  │   │
//! │  │   │(settlement.rs) │   │  (drinks.rs)  │   │  (shifts.rs)  │  │   │
//! │  │   │                │   │               │   │               │  │   │
//! │  │   │ rental board   │──►│ pack + unit   │   │ cash journal  │  │   │
//! │  │   │ quote/commit   │   │ stock counts  │   │ shift reports │  │   │
//! │  │   │ lock registry  │   └───────────────┘   └───────────────┘  │   │
//! │  │   └────────────────┘                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  innkeep-core (tier resolver, bill math, validation, Money)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Engine configuration and environment overrides
//! - [`error`] - Wire-level error envelope and codes
//! - [`store`] - Snapshot map and the advisory lock registry
//! - [`drinks`] - Two-level drink inventory ledger
//! - [`shifts`] - Shift lifecycle, transaction journal, reports
//! - [`settlement`] - The service facade tying everything together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use innkeep_engine::{EngineConfig, SettlementService};
//! use innkeep_core::{PriceTable, TimingRules};
//!
//! let service = SettlementService::new(
//!     EngineConfig::from_env(),
//!     PriceTable::new(TimingRules::default()),
//! )?;
//!
//! service.open_shift("emp-1")?;
//! let rental = service.check_in(request).await?;
//! let quote = service.preview_checkout(&checkout)?;
//! let settled = service.commit_checkout(&checkout).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod drinks;
pub mod error;
pub mod settlement;
pub mod shifts;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::EngineConfig;
pub use error::{ApiError, ErrorCode};

// Service surface re-exports for convenience
pub use drinks::{DrinkLedger, NewDrinkSku};
pub use settlement::{
    AddDrinkResponse, CheckInRequest, CheckoutRequest, DrinkChargeLine, DrinkCharges, Quote,
    RentalSettingsUpdate, SettlementResult, SettlementService,
};
pub use shifts::{RoomStat, ShiftLedger, ShiftReport};
pub use store::{LockRegistry, SnapshotMap};
