//! # Time Tier Resolver
//!
//! Maps an elapsed stay onto the billing tier ladder and produces the
//! room charge breakdown.
//!
//! ## The Tier Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HOW A STAY IS BILLED (defaults shown)                                  │
//! │                                                                         │
//! │  Hourly rental                                                          │
//! │    hour 1          →  base_hour_price            (minimum charge)       │
//! │    hours 2..n      →  + additional_hour_price each                      │
//! │    past 5 hours    →  amount still computed, WARNING raised             │
//! │                                                                         │
//! │  Half-day rental                                                        │
//! │    0..=12 hours    →  half_day_price flat        (even a 2h stay)       │
//! │    13..=17 hours   →  + additional_hour_price per started hour          │
//! │    18+ hours       →  half_day_price                                    │
//! │                       + full_day_price × extra_hours / 24, rounded UP   │
//! │                       (the "half-day plus" composite)                   │
//! │                                                                         │
//! │  Overnight rental                                                       │
//! │    0..=24 hours    →  full_day_price flat                               │
//! │    25+ hours       →  + additional_hour_price per started hour          │
//! │                                                                         │
//! │  EVERY duration rounds UP to started hours first:                       │
//! │    45 min → 1 hour     2h30 → 3 hours     24h01 → 25 hours             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity Contract
//! The resolver never reads the clock: the caller supplies `as_of`.
//! Identical inputs produce identical breakdowns, so a preview printed
//! for the guest always matches the commit that follows it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{RoomRates, TimingRules};
use crate::types::RentType;

// =============================================================================
// Charge Tier
// =============================================================================

/// The tier a stay resolved to.
///
/// `HalfDayPlus` only ever arises from a half-day rental that ran past
/// the full-day boundary; it is never chosen at check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChargeTier {
    Hourly,
    HalfDay,
    HalfDayPlus,
    Overnight,
}

// =============================================================================
// Stay Duration
// =============================================================================

/// Elapsed stay time, decomposed for display and billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StayDuration {
    /// Whole hours elapsed.
    pub hours: i64,
    /// Minutes past the last whole hour (0-59).
    pub minutes: i64,
    /// Hours billed: elapsed rounded UP, minimum 1.
    pub started_hours: i64,
}

/// Computes the elapsed stay at minute resolution.
///
/// ## Rules
/// - `as_of` before `check_in` fails with `InvalidTimeRange`
/// - seconds are floored to whole minutes
/// - `started_hours` rounds minutes UP to hours, with a 1-hour minimum
///   (a 5-minute stay still bills one hour)
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use innkeep_core::tier::stay_duration;
///
/// let check_in = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
/// let as_of = Utc.with_ymd_and_hms(2026, 3, 14, 11, 30, 0).unwrap();
///
/// let d = stay_duration(check_in, as_of).unwrap();
/// assert_eq!((d.hours, d.minutes), (2, 30));
/// assert_eq!(d.started_hours, 3);
/// ```
pub fn stay_duration(
    check_in: DateTime<Utc>,
    as_of: DateTime<Utc>,
) -> CoreResult<StayDuration> {
    if as_of < check_in {
        return Err(CoreError::InvalidTimeRange {
            check_in: check_in.to_rfc3339(),
            checkout: as_of.to_rfc3339(),
        });
    }

    let total_minutes = (as_of - check_in).num_minutes();
    let started_hours = ((total_minutes + 59) / 60).max(1);

    Ok(StayDuration {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
        started_hours,
    })
}

// =============================================================================
// Room Charge
// =============================================================================

/// An overrun charge on top of a flat tier rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtraCharge {
    /// Mirrors the charge's tier; tells the bill printer which label
    /// to use for the overrun line.
    pub kind: ChargeTier,
    /// Started hours past the tier's covered window.
    pub hours: i64,
    /// Overrun amount in minor units.
    pub amount_minor: i64,
}

/// Non-fatal escalation notice on an hourly stay.
///
/// The charge is still computed; the desk decides whether to switch the
/// rental to a half-day rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierWarning {
    pub threshold_hours: i64,
    pub started_hours: i64,
    pub message: String,
}

/// The complete room charge breakdown for one stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomCharge {
    pub tier: ChargeTier,
    pub duration: StayDuration,
    /// Flat tier amount in minor units.
    pub base_minor: i64,
    /// Overrun past the tier window, if any.
    pub extra: Option<ExtraCharge>,
    /// base + extra, minor units.
    pub total_minor: i64,
    /// Present only when an hourly stay ran past the threshold.
    pub warning: Option<TierWarning>,
}

impl RoomCharge {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves a stay to its room charge.
///
/// ## Arguments
/// * `rent_type` - how the rental is billed (chosen at check-in)
/// * `check_in` - when the stay began
/// * `as_of` - the proposed checkout instant (supplied, never read from
///   a clock here)
/// * `rates` - the room type's flat rates
/// * `rules` - the house timing rules
///
/// ## Returns
/// The full breakdown, or `InvalidTimeRange` when `as_of` precedes
/// `check_in`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use innkeep_core::pricing::{RoomRates, TimingRules};
/// use innkeep_core::tier::resolve;
/// use innkeep_core::types::RentType;
///
/// let rules = TimingRules::default();
/// let rates = RoomRates {
///     half_day_price_minor: 180_000,
///     full_day_price_minor: 260_000,
/// };
/// let check_in = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
/// let as_of = Utc.with_ymd_and_hms(2026, 3, 14, 9, 45, 0).unwrap();
///
/// let charge = resolve(RentType::Hourly, check_in, as_of, rates, &rules).unwrap();
/// assert_eq!(charge.total_minor, 50_000);
/// ```
pub fn resolve(
    rent_type: RentType,
    check_in: DateTime<Utc>,
    as_of: DateTime<Utc>,
    rates: RoomRates,
    rules: &TimingRules,
) -> CoreResult<RoomCharge> {
    let duration = stay_duration(check_in, as_of)?;
    let started = duration.started_hours;

    let charge = match rent_type {
        RentType::Hourly => resolve_hourly(duration, rules),
        RentType::HalfDay => resolve_half_day(duration, rates, rules),
        RentType::Overnight => resolve_overnight(duration, rates, rules),
    };

    debug_assert!(charge.total_minor == charge.base_minor
        + charge.extra.map(|e| e.amount_minor).unwrap_or(0));
    debug_assert!(started >= 1);

    Ok(charge)
}

/// First hour at the base rate, each further started hour at the
/// additional rate. Past the threshold the charge stands but a warning
/// rides along.
fn resolve_hourly(duration: StayDuration, rules: &TimingRules) -> RoomCharge {
    let started = duration.started_hours;
    let base = rules.base_hour_price();

    let extra = if started > 1 {
        let hours = started - 1;
        Some(ExtraCharge {
            kind: ChargeTier::Hourly,
            hours,
            amount_minor: (rules.additional_hour_price() * hours).minor(),
        })
    } else {
        None
    };

    let warning = if started > rules.hourly_threshold_hours {
        Some(TierWarning {
            threshold_hours: rules.hourly_threshold_hours,
            started_hours: started,
            message: format!(
                "Hourly stay reached {} hours (threshold {}); consider a half-day rate",
                started, rules.hourly_threshold_hours
            ),
        })
    } else {
        None
    };

    let total = base + Money::from_minor(extra.map(|e| e.amount_minor).unwrap_or(0));
    RoomCharge {
        tier: ChargeTier::Hourly,
        duration,
        base_minor: base.minor(),
        extra,
        total_minor: total.minor(),
        warning,
    }
}

/// Flat half-day rate up to the covered window. Short stays below the
/// minimum still pay the full rate. Overruns bill per started hour
/// until the full-day boundary, where the composite half-day-plus
/// charge takes over.
fn resolve_half_day(
    duration: StayDuration,
    rates: RoomRates,
    rules: &TimingRules,
) -> RoomCharge {
    let started = duration.started_hours;
    let base = rates.half_day_price();

    let (tier, extra) = if started <= rules.max_half_day_hours {
        (ChargeTier::HalfDay, None)
    } else if started < rules.min_full_day_hours {
        let hours = started - rules.max_half_day_hours;
        (
            ChargeTier::HalfDay,
            Some(ExtraCharge {
                kind: ChargeTier::HalfDay,
                hours,
                amount_minor: (rules.additional_hour_price() * hours).minor(),
            }),
        )
    } else {
        // Past the full-day boundary the overrun hours bill at the
        // full-day proportional rate, rounded up per started fraction.
        let hours = started - rules.max_half_day_hours;
        (
            ChargeTier::HalfDayPlus,
            Some(ExtraCharge {
                kind: ChargeTier::HalfDayPlus,
                hours,
                amount_minor: rates
                    .full_day_price()
                    .prorate_ceil(hours, rules.max_full_day_hours)
                    .minor(),
            }),
        )
    };

    let total = base + Money::from_minor(extra.map(|e| e.amount_minor).unwrap_or(0));
    RoomCharge {
        tier,
        duration,
        base_minor: base.minor(),
        extra,
        total_minor: total.minor(),
        warning: None,
    }
}

/// Flat full-day rate up to the covered window, per-hour beyond it.
fn resolve_overnight(
    duration: StayDuration,
    rates: RoomRates,
    rules: &TimingRules,
) -> RoomCharge {
    let started = duration.started_hours;
    let base = rates.full_day_price();

    let extra = if started > rules.max_full_day_hours {
        let hours = started - rules.max_full_day_hours;
        Some(ExtraCharge {
            kind: ChargeTier::Overnight,
            hours,
            amount_minor: (rules.additional_hour_price() * hours).minor(),
        })
    } else {
        None
    };

    let total = base + Money::from_minor(extra.map(|e| e.amount_minor).unwrap_or(0));
    RoomCharge {
        tier: ChargeTier::Overnight,
        duration,
        base_minor: base.minor(),
        extra,
        total_minor: total.minor(),
        warning: None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rules() -> TimingRules {
        TimingRules::default()
    }

    fn rates() -> RoomRates {
        RoomRates {
            half_day_price_minor: 180_000,
            full_day_price_minor: 260_000,
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    fn at_day(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
    }

    #[test]
    fn test_duration_rejects_inverted_range() {
        let err = stay_duration(at(10, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimeRange { .. }));
    }

    #[test]
    fn test_duration_rounding() {
        // 45 minutes: under one hour, still bills one
        let d = stay_duration(at(9, 0), at(9, 45)).unwrap();
        assert_eq!((d.hours, d.minutes, d.started_hours), (0, 45, 1));

        // Exactly one hour stays at one started hour
        let d = stay_duration(at(9, 0), at(10, 0)).unwrap();
        assert_eq!(d.started_hours, 1);

        // The 61st minute starts the second hour
        let d = stay_duration(at(9, 0), at(10, 1)).unwrap();
        assert_eq!(d.started_hours, 2);

        // Zero-length stay still bills the minimum hour
        let d = stay_duration(at(9, 0), at(9, 0)).unwrap();
        assert_eq!(d.started_hours, 1);
    }

    #[test]
    fn test_hourly_first_hour_only() {
        // 09:00 -> 09:45: one started hour, base price only
        let charge =
            resolve(RentType::Hourly, at(9, 0), at(9, 45), rates(), &rules()).unwrap();

        assert_eq!(charge.tier, ChargeTier::Hourly);
        assert_eq!(charge.base_minor, 50_000);
        assert!(charge.extra.is_none());
        assert_eq!(charge.total_minor, 50_000);
        assert!(charge.warning.is_none());
    }

    #[test]
    fn test_hourly_additional_hours() {
        // 09:00 -> 11:30: three started hours, base + 2 additional
        let charge =
            resolve(RentType::Hourly, at(9, 0), at(11, 30), rates(), &rules()).unwrap();

        assert_eq!(charge.base_minor, 50_000);
        let extra = charge.extra.unwrap();
        assert_eq!(extra.hours, 2);
        assert_eq!(extra.amount_minor, 40_000);
        assert_eq!(charge.total_minor, 90_000);
        assert!(charge.warning.is_none());
    }

    #[test]
    fn test_hourly_threshold_warning() {
        // 5h10 -> 6 started hours, past the 5-hour threshold
        let charge =
            resolve(RentType::Hourly, at(9, 0), at(14, 10), rates(), &rules()).unwrap();

        let warning = charge.warning.expect("warning expected past threshold");
        assert_eq!(warning.threshold_hours, 5);
        assert_eq!(warning.started_hours, 6);
        // The amount is still computed in full
        assert_eq!(charge.total_minor, 50_000 + 5 * 20_000);

        // Exactly at the threshold: no warning
        let charge =
            resolve(RentType::Hourly, at(9, 0), at(14, 0), rates(), &rules()).unwrap();
        assert!(charge.warning.is_none());
    }

    #[test]
    fn test_half_day_flat_window() {
        // 10 hours: inside the half-day window, flat rate
        let charge =
            resolve(RentType::HalfDay, at(9, 0), at(19, 0), rates(), &rules()).unwrap();

        assert_eq!(charge.tier, ChargeTier::HalfDay);
        assert!(charge.extra.is_none());
        assert_eq!(charge.total_minor, 180_000);
    }

    #[test]
    fn test_half_day_minimum_charge_floor() {
        // A 2-hour stay on a half-day rate still pays the full rate
        let charge =
            resolve(RentType::HalfDay, at(9, 0), at(11, 0), rates(), &rules()).unwrap();

        assert_eq!(charge.total_minor, 180_000);
        assert!(charge.extra.is_none());
    }

    #[test]
    fn test_half_day_hourly_overrun() {
        // 13h20 -> 14 started hours: 2 past the 12-hour window
        let charge = resolve(
            RentType::HalfDay,
            at(9, 0),
            at_day(14, 22, 20),
            rates(),
            &rules(),
        )
        .unwrap();

        assert_eq!(charge.tier, ChargeTier::HalfDay);
        let extra = charge.extra.unwrap();
        assert_eq!(extra.kind, ChargeTier::HalfDay);
        assert_eq!(extra.hours, 2);
        assert_eq!(extra.amount_minor, 40_000);
        assert_eq!(charge.total_minor, 220_000);
    }

    #[test]
    fn test_half_day_plus_composite() {
        // 20 hours: past the 18-hour full-day boundary.
        // Extra = 8 hours at the full-day proportional rate:
        // 260000 * 8 / 24 = 86666.67 -> 86667
        let charge = resolve(
            RentType::HalfDay,
            at(9, 0),
            at_day(15, 5, 0),
            rates(),
            &rules(),
        )
        .unwrap();

        assert_eq!(charge.tier, ChargeTier::HalfDayPlus);
        let extra = charge.extra.unwrap();
        assert_eq!(extra.kind, ChargeTier::HalfDayPlus);
        assert_eq!(extra.hours, 8);
        assert_eq!(extra.amount_minor, 86_667);
        assert_eq!(charge.total_minor, 266_667);
    }

    #[test]
    fn test_half_day_boundary_is_exclusive() {
        // Exactly 12 started hours: still flat
        let charge = resolve(
            RentType::HalfDay,
            at(9, 0),
            at_day(14, 21, 0),
            rates(),
            &rules(),
        )
        .unwrap();
        assert!(charge.extra.is_none());

        // Exactly 18 started hours: composite takes over
        let charge = resolve(
            RentType::HalfDay,
            at(9, 0),
            at_day(15, 3, 0),
            rates(),
            &rules(),
        )
        .unwrap();
        assert_eq!(charge.tier, ChargeTier::HalfDayPlus);
    }

    #[test]
    fn test_overnight_flat_window() {
        // 23 hours: inside the 24-hour window, flat full-day rate
        let charge = resolve(
            RentType::Overnight,
            at(22, 0),
            at_day(15, 21, 0),
            rates(),
            &rules(),
        )
        .unwrap();

        assert_eq!(charge.tier, ChargeTier::Overnight);
        assert!(charge.extra.is_none());
        assert_eq!(charge.total_minor, 260_000);
    }

    #[test]
    fn test_overnight_overrun() {
        // 26h30 -> 27 started hours: 3 past the 24-hour window
        let charge = resolve(
            RentType::Overnight,
            at(9, 0),
            at_day(15, 11, 30),
            rates(),
            &rules(),
        )
        .unwrap();

        let extra = charge.extra.unwrap();
        assert_eq!(extra.kind, ChargeTier::Overnight);
        assert_eq!(extra.hours, 3);
        assert_eq!(extra.amount_minor, 60_000);
        assert_eq!(charge.total_minor, 320_000);
    }

    #[test]
    fn test_resolver_is_deterministic() {
        let a = resolve(RentType::Hourly, at(9, 0), at(11, 30), rates(), &rules()).unwrap();
        let b = resolve(RentType::Hourly, at(9, 0), at(11, 30), rates(), &rules()).unwrap();
        assert_eq!(a, b);
    }
}
