//! # Quote Module
//!
//! Pure composition of a settlement total from its parts.
//!
//! ```text
//! RoomCharge.total ──┐
//!                    ├──► subtotal ──► − discount ──► + surcharge ──► final
//! Σ drink lines ─────┘                              (clamped at zero)
//!
//!                                     tendered − final ──► change
//!                                     (clamped at zero)
//! ```
//!
//! Both preview and commit flow through [`summarize`]; the commit never
//! trusts a client-supplied total.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tier::RoomCharge;
use crate::types::DrinkOrderLine;

// =============================================================================
// Charge Summary
// =============================================================================

/// Every number on the bill, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChargeSummary {
    pub room: RoomCharge,
    pub drinks_total_minor: i64,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub surcharge_minor: i64,
    pub final_minor: i64,
    pub tendered_minor: i64,
    pub change_minor: i64,
}

impl ChargeSummary {
    /// Returns the amount due as Money.
    #[inline]
    pub fn final_amount(&self) -> Money {
        Money::from_minor(self.final_minor)
    }
}

/// Composes the bill from the room charge, the drink lines, and the
/// desk's adjustments.
///
/// ## Rules
/// - `final = max(0, subtotal - discount + surcharge)`: a discount
///   larger than the bill settles at zero, never negative
/// - `change = max(0, tendered - final)`: under-tendering yields zero
///   change (split tender is handled at the desk, not here)
///
/// ## Example
/// ```rust
/// use innkeep_core::money::Money;
/// use innkeep_core::quote::summarize;
/// # use chrono::{TimeZone, Utc};
/// # use innkeep_core::pricing::{RoomRates, TimingRules};
/// # use innkeep_core::tier::resolve;
/// # use innkeep_core::types::RentType;
/// # let rates = RoomRates { half_day_price_minor: 180_000, full_day_price_minor: 260_000 };
/// # let check_in = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
/// # let as_of = Utc.with_ymd_and_hms(2026, 3, 14, 11, 30, 0).unwrap();
/// # let room = resolve(RentType::Hourly, check_in, as_of, rates, &TimingRules::default()).unwrap();
///
/// let summary = summarize(
///     room, // 90,000 for 2h30 hourly
///     &[],
///     Money::from_minor(10_000),
///     Money::zero(),
///     Money::from_minor(100_000),
/// );
/// assert_eq!(summary.final_minor, 80_000);
/// assert_eq!(summary.change_minor, 20_000);
/// ```
pub fn summarize(
    room: RoomCharge,
    drink_lines: &[DrinkOrderLine],
    discount: Money,
    surcharge: Money,
    tendered: Money,
) -> ChargeSummary {
    let drinks_total = drink_lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    let subtotal = room.total() + drinks_total;
    let final_amount = (subtotal - discount + surcharge).max_zero();
    let change = (tendered - final_amount).max_zero();

    ChargeSummary {
        room,
        drinks_total_minor: drinks_total.minor(),
        subtotal_minor: subtotal.minor(),
        discount_minor: discount.minor(),
        surcharge_minor: surcharge.minor(),
        final_minor: final_amount.minor(),
        tendered_minor: tendered.minor(),
        change_minor: change.minor(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
