//! # innkeep-core: Pure Business Logic for Innkeep
//!
//! This crate is the **heart** of Innkeep. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │    Room Board ──► Rental UI ──► Checkout UI ──► Shift Report    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON API                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                innkeep-engine (Settlement Engine)               │   │
//! │  │    check_in, add_drink, preview_checkout, commit_checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ innkeep-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   tier    │  │   quote   │  │   │
//! │  │   │  Rental   │  │   Money   │  │  resolve  │  │ summarize │  │   │
//! │  │   │  DrinkSku │  │ minor i64 │  │  ladder   │  │  the bill │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO LOCKS • PURE FUNCTIONS                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Rental, DrinkSku, Shift, Transaction, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The price table: timing rules + per-room-type rates
//! - [`tier`] - The time-tier resolver (hourly / half-day / overnight)
//! - [`quote`] - Bill composition (room + drinks − discount + surcharge)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Clock, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use innkeep_core::pricing::{RoomRates, TimingRules};
//! use innkeep_core::tier::resolve;
//! use innkeep_core::types::RentType;
//!
//! let rules = TimingRules::default();
//! let rates = RoomRates {
//!     half_day_price_minor: 180_000,
//!     full_day_price_minor: 260_000,
//! };
//!
//! // An hourly stay of 2h30 bills three started hours
//! let check_in = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
//! let checkout = Utc.with_ymd_and_hms(2026, 3, 14, 11, 30, 0).unwrap();
//! let charge = resolve(RentType::Hourly, check_in, checkout, rates, &rules).unwrap();
//!
//! // 50,000 base + 2 × 20,000 additional
//! assert_eq!(charge.total_minor, 90_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use innkeep_core::Money` instead of
// `use innkeep_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PriceTable, RoomRates, TimingRules};
pub use quote::{summarize, ChargeSummary};
pub use tier::{resolve, stay_duration, ChargeTier, RoomCharge, StayDuration};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single drink on one rental.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10).
/// Configurable per-house in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum guests on a single rental.
///
/// ## Business Reason
/// Room capacity tops out far below this; the bound catches fat-finger
/// entries at the desk.
pub const MAX_GUESTS: i64 = 20;

/// Maximum additional cars parked against one rental.
pub const MAX_ADDITIONAL_CARS: usize = 10;
