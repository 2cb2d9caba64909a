//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many billing systems:                                               │
//! │    150000 / 12 = 12500.000000000002 → Ghost fractions on receipts!      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    All amounts are i64 counts of the smallest currency unit.            │
//! │    Division is explicit and ceiling/floor is chosen per business rule.  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use innkeep_core::money::Money;
//!
//! // Create from minor units (the only constructor)
//! let base = Money::from_minor(50_000);
//!
//! // Arithmetic operations
//! let two_extra = Money::from_minor(20_000) * 2;
//! let total = base + two_extra;
//! assert_eq!(total.minor(), 90_000);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(50000.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for removals and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  RoomRates.half_day_price ──► RoomCharge.total ──┐                      │
/// │                                                  ├──► Quote.final       │
/// │  DrinkOrderLine.unit_price ──► drinks total ─────┘         │            │
/// │                                                            ▼            │
/// │                                              Transaction.amount         │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let base = Money::from_minor(50_000);
    /// assert_eq!(base.minor(), 50_000);
    /// ```
    ///
    /// ## Why Minor Units?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The engine, calculations, and API all use minor units.
    /// Only the UI converts for display.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units (smallest currency unit).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.minor(), 0);
    /// assert!(zero.is_zero());
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps the value to zero if negative.
    ///
    /// Discounts larger than the subtotal and over-tendering both resolve
    /// through this: a settlement never goes negative, change never does
    /// either.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let over_discounted = Money::from_minor(30_000) - Money::from_minor(50_000);
    /// assert_eq!(over_discounted.max_zero().minor(), 0);
    /// ```
    #[inline]
    pub const fn max_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(15_000);
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 45_000);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Drink: Cola 15,000
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 45,000
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Prorates a full-period price over `units` of a `period_units`-long
    /// period, rounding UP so a started fraction is charged in full.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    ///
    /// // 5 hours of a 260,000 / 24h rate: 260000 * 5 / 24 = 54166.66 → 54167
    /// let full_day = Money::from_minor(260_000);
    /// assert_eq!(full_day.prorate_ceil(5, 24).minor(), 54_167);
    /// ```
    ///
    /// ## Why Ceiling?
    /// The same policy as hour rounding: a started unit is billed whole.
    /// Floor division would systematically undercharge by up to one minor
    /// unit per settlement.
    pub fn prorate_ceil(&self, units: i64, period_units: i64) -> Money {
        // i128 to prevent overflow on large amounts
        let scaled = self.0 as i128 * units as i128;
        let per = period_units as i128;
        Money(((scaled + per - 1) / per) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money with thousands grouping.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

/// Groups an unsigned amount into comma-separated thousands.
fn group_thousands(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while value > 0 {
        groups.push((value % 1000) as u16);
        value /= 1000;
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(group) = groups.pop() {
        out.push_str(&format!(",{:03}", group));
    }
    out
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(50_000);
        assert_eq!(money.minor(), 50_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(50_000)), "50,000");
        assert_eq!(format!("{}", Money::from_minor(1_250_000)), "1,250,000");
        assert_eq!(format!("{}", Money::from_minor(-15_000)), "-15,000");
        assert_eq!(format!("{}", Money::from_minor(999)), "999");
        assert_eq!(format!("{}", Money::from_minor(0)), "0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(50_000);
        let b = Money::from_minor(20_000);

        assert_eq!((a + b).minor(), 70_000);
        assert_eq!((a - b).minor(), 30_000);
        let result: Money = b * 2;
        assert_eq!(result.minor(), 40_000);
    }

    #[test]
    fn test_max_zero() {
        let negative = Money::from_minor(30_000) - Money::from_minor(50_000);
        assert_eq!(negative.max_zero().minor(), 0);

        let positive = Money::from_minor(100);
        assert_eq!(positive.max_zero().minor(), 100);

        assert_eq!(Money::zero().max_zero().minor(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_minor(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_minor(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(15_000);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.minor(), 45_000);
    }

    #[test]
    fn test_prorate_ceil_exact_division() {
        // 260000 * 12 / 24 divides exactly: 130000, no rounding needed
        let full_day = Money::from_minor(260_000);
        assert_eq!(full_day.prorate_ceil(12, 24).minor(), 130_000);
    }

    /// Critical test: a started fraction of a period is charged in full.
    /// This documents the intentional round-up policy.
    #[test]
    fn test_prorate_ceil_rounds_up() {
        let full_day = Money::from_minor(260_000);
        // 260000 * 5 / 24 = 54166.666... → 54167, never 54166
        assert_eq!(full_day.prorate_ceil(5, 24).minor(), 54_167);

        // Floor would lose the fraction; ceiling keeps the charge whole
        let floored = 260_000_i64 * 5 / 24;
        assert_eq!(floored, 54_166);
        assert!(full_day.prorate_ceil(5, 24).minor() > floored);
    }
}
