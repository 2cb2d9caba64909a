//! # Pricing Module
//!
//! The price table: house-wide timing rules plus per-room-type rates.
//!
//! ## How Pricing Is Organized
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PriceTable                                      │
//! │                                                                         │
//! │  TimingRules (one per house)          RoomRates (one per room type)     │
//! │  ──────────────────────────           ─────────────────────────────     │
//! │  base_hour_price        50,000        "standard" → half 180,000         │
//! │  additional_hour_price  20,000                     full 260,000         │
//! │  hourly_threshold_hours      5        "vip"      → half 250,000         │
//! │  max_half_day_hours         12                     full 350,000         │
//! │  min_full_day_hours         18                                          │
//! │  max_full_day_hours         24                                          │
//! │                                                                         │
//! │  The tier resolver reads BOTH: rules decide the shape of the charge,    │
//! │  rates decide the amounts.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is read-only during settlement: the resolver receives a
//! snapshot and two quotes over the same inputs always agree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// Timing Rules
// =============================================================================

/// House-wide billing windows and hourly prices.
///
/// All `_hours` fields are whole hours; all `_price_minor` fields are
/// minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimingRules {
    /// Hourly rentals past this many hours raise a non-fatal warning
    /// (the desk should offer a half-day rate instead).
    pub hourly_threshold_hours: i64,

    /// Price of the first (started) hour.
    pub base_hour_price_minor: i64,

    /// Price of each started hour after the first.
    pub additional_hour_price_minor: i64,

    /// Hour of day from which half-day check-ins are offered (UI gating;
    /// the resolver itself only looks at elapsed time).
    pub half_day_start_hour: u32,

    /// Hour of day until which half-day check-ins are offered.
    pub half_day_end_hour: u32,

    /// Stays shorter than this still pay the full half-day rate.
    pub min_half_day_hours: i64,

    /// Hours covered by the flat half-day rate.
    pub max_half_day_hours: i64,

    /// At or past this duration a half-day stay escalates to the
    /// composite half-day-plus charge.
    pub min_full_day_hours: i64,

    /// Hours covered by the flat full-day rate.
    pub max_full_day_hours: i64,
}

impl TimingRules {
    /// Returns the first-hour price as Money.
    #[inline]
    pub fn base_hour_price(&self) -> Money {
        Money::from_minor(self.base_hour_price_minor)
    }

    /// Returns the additional-hour price as Money.
    #[inline]
    pub fn additional_hour_price(&self) -> Money {
        Money::from_minor(self.additional_hour_price_minor)
    }

    /// Checks the windows are ordered and the prices non-negative.
    ///
    /// ## Rules
    /// - 0 < max_half_day < min_full_day <= max_full_day
    /// - hourly threshold positive
    /// - prices non-negative
    pub fn validate(&self) -> ValidationResult<()> {
        if self.hourly_threshold_hours <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "hourly_threshold_hours".to_string(),
            });
        }
        if self.max_half_day_hours <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_half_day_hours".to_string(),
            });
        }
        if self.min_full_day_hours <= self.max_half_day_hours {
            return Err(ValidationError::OutOfRange {
                field: "min_full_day_hours".to_string(),
                min: self.max_half_day_hours + 1,
                max: i64::MAX,
            });
        }
        if self.max_full_day_hours < self.min_full_day_hours {
            return Err(ValidationError::OutOfRange {
                field: "max_full_day_hours".to_string(),
                min: self.min_full_day_hours,
                max: i64::MAX,
            });
        }
        if self.base_hour_price_minor < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "base_hour_price".to_string(),
            });
        }
        if self.additional_hour_price_minor < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "additional_hour_price".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TimingRules {
    fn default() -> Self {
        TimingRules {
            hourly_threshold_hours: 5,
            base_hour_price_minor: 50_000,
            additional_hour_price_minor: 20_000,
            half_day_start_hour: 9,
            half_day_end_hour: 18,
            min_half_day_hours: 4,
            max_half_day_hours: 12,
            min_full_day_hours: 18,
            max_full_day_hours: 24,
        }
    }
}

// =============================================================================
// Room Rates
// =============================================================================

/// Flat rates for one room type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomRates {
    /// Half-day flat rate in minor units.
    pub half_day_price_minor: i64,

    /// Full-day flat rate in minor units.
    pub full_day_price_minor: i64,
}

impl RoomRates {
    /// Returns the half-day rate as Money.
    #[inline]
    pub fn half_day_price(&self) -> Money {
        Money::from_minor(self.half_day_price_minor)
    }

    /// Returns the full-day rate as Money.
    #[inline]
    pub fn full_day_price(&self) -> Money {
        Money::from_minor(self.full_day_price_minor)
    }
}

// =============================================================================
// Price Table
// =============================================================================

/// The complete pricing configuration: timing rules plus rates per
/// room type, keyed by `room_type_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct PriceTable {
    pub timing: TimingRules,
    pub rates: HashMap<String, RoomRates>,
}

impl PriceTable {
    /// Creates a table with the given timing rules and no room types.
    pub fn new(timing: TimingRules) -> Self {
        PriceTable {
            timing,
            rates: HashMap::new(),
        }
    }

    /// Adds or replaces the rates for a room type (builder style).
    pub fn with_rates(mut self, room_type_id: &str, rates: RoomRates) -> Self {
        self.rates.insert(room_type_id.to_string(), rates);
        self
    }

    /// Looks up the rates for a room type.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::pricing::{PriceTable, RoomRates, TimingRules};
    ///
    /// let table = PriceTable::new(TimingRules::default()).with_rates(
    ///     "standard",
    ///     RoomRates {
    ///         half_day_price_minor: 180_000,
    ///         full_day_price_minor: 260_000,
    ///     },
    /// );
    /// assert!(table.rates_for("standard").is_ok());
    /// assert!(table.rates_for("penthouse").is_err());
    /// ```
    pub fn rates_for(&self, room_type_id: &str) -> CoreResult<RoomRates> {
        self.rates
            .get(room_type_id)
            .copied()
            .ok_or_else(|| CoreError::UnknownRoomType(room_type_id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
