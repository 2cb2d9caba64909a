//! # Domain Types
//!
//! Core domain types used throughout Innkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Rental      │   │    DrinkSku     │   │   Transaction   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  room_id        │   │  name           │   │  shift_id (FK)  │       │
//! │  │  rent_type      │   │  pack_stock     │   │  kind           │       │
//! │  │  drink_orders   │   │  unit_stock     │   │  amount_minor   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Shift       │   │  RentalStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  opened_at      │   │  Active         │   │  Cash           │       │
//! │  │  opening_cash   │   │  Completed      │   │  Banking        │       │
//! │  └─────────────────┘   │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (room_id, drink name, etc.) - human-readable, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tier::RoomCharge;

// =============================================================================
// Rent Type
// =============================================================================

/// How a rental is billed.
///
/// Chosen at check-in; can be switched while the rental is active
/// (the tier resolver only ever reads the value current at settlement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RentType {
    /// First hour at the base rate, each started hour after at the
    /// additional-hour rate.
    Hourly,
    /// Flat half-day rate, with per-hour overrun charges.
    HalfDay,
    /// Flat full-day rate covering up to the full-day window.
    Overnight,
}

// =============================================================================
// Rental Status
// =============================================================================

/// The lifecycle state of a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    /// Guest is in the room; drinks and settings can still change.
    Active,
    /// Settled and closed. Immutable from here on.
    Completed,
    /// Abandoned before settlement. Reserved drinks were returned.
    Cancelled,
}

impl Default for RentalStatus {
    fn default() -> Self {
        RentalStatus::Active
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash at the desk.
    Cash,
    /// Bank transfer shown on the guest's phone.
    Banking,
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// What a ledger transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Prepayment taken at check-in.
    CheckIn,
    /// Drink added to (or removed from) a rental. Settled at checkout.
    DrinkAdd,
    /// Final settlement at checkout.
    Checkout,
}

// =============================================================================
// Drink SKU
// =============================================================================

/// A drink available for sale, stocked in packs plus loose units.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrinkSku {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the desk and on the bill.
    pub name: String,

    /// Purchase cost per unit in minor units (for margin reporting).
    pub cost_price_minor: i64,

    /// Selling price per unit in minor units.
    pub selling_price_minor: i64,

    /// Units per unopened pack (e.g. 24 cans per crate).
    pub units_per_pack: i64,

    /// Unopened packs on hand.
    pub pack_stock: i64,

    /// Loose units on hand. Kept below `units_per_pack` after every
    /// mutation; a pack is broken open when loose units run out.
    pub unit_stock: i64,

    /// Restock alert fires when availability drops to this level.
    pub alert_threshold: i64,

    /// Whether the SKU is active (soft delete).
    pub is_active: bool,

    /// When the SKU was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the SKU was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DrinkSku {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_minor(self.selling_price_minor)
    }

    /// Total sellable units: packs broken down plus loose units.
    ///
    /// ## Example
    /// 2 packs of 24 plus 5 loose units = 53 available.
    #[inline]
    pub fn available(&self) -> i64 {
        self.pack_stock * self.units_per_pack + self.unit_stock
    }

    /// Checks if availability has dropped to the alert threshold.
    pub fn is_low_stock(&self) -> bool {
        self.available() <= self.alert_threshold
    }

    /// Checks if the requested quantity can be reserved.
    pub fn can_reserve(&self, quantity: i64) -> bool {
        self.is_active && self.available() >= quantity
    }
}

// =============================================================================
// Drink Order Line
// =============================================================================

/// A drink line on a rental.
/// Uses snapshot pattern to freeze drink data at time of first order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrinkOrderLine {
    pub drink_id: String,
    /// Drink name at time of order (frozen).
    pub name: String,
    /// Unit price in minor units at time of order (frozen).
    /// Later catalog price changes never touch an open line.
    pub unit_price_minor: i64,
    /// Units currently on the line. Always >= 1; the line is removed
    /// when a reduction brings it to zero.
    pub quantity: i64,
}

impl DrinkOrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.unit_price_minor * self.quantity)
    }
}

// =============================================================================
// Additional Car
// =============================================================================

/// A further vehicle parked against an active rental.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdditionalCar {
    /// Number plate as entered at the desk.
    pub car_number: String,
    /// Registered customer, if the plate matched one.
    pub customer_id: Option<String>,
    /// True when no customer record exists for this car.
    pub is_walk_in: bool,
}

// =============================================================================
// Prepayment
// =============================================================================

/// Money taken at check-in, before any charge exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Prepayment {
    /// Amount in minor units.
    pub amount_minor: i64,
    pub method: PaymentMethod,
}

impl Prepayment {
    /// Returns the prepaid amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

// =============================================================================
// Settlement Record
// =============================================================================

/// The frozen outcome of a checkout, written exactly once.
///
/// A replayed commit is answered from this record so the caller always
/// receives the original figures, never a recomputation at a later time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettlementRecord {
    /// When the settlement committed.
    #[ts(as = "String")]
    pub settled_at: DateTime<Utc>,
    /// Shift the checkout transaction was recorded under.
    pub shift_id: String,
    /// The checkout transaction written by this settlement.
    pub transaction_id: String,
    /// Room charge breakdown frozen at settlement.
    pub room: RoomCharge,
    /// Sum of all drink lines in minor units.
    pub drinks_total_minor: i64,
    /// Room + drinks in minor units.
    pub subtotal_minor: i64,
    /// Discount applied, minor units.
    pub discount_minor: i64,
    /// Surcharge applied, minor units.
    pub surcharge_minor: i64,
    /// Amount due after discount and surcharge, clamped at zero.
    pub final_minor: i64,
    pub method: PaymentMethod,
    /// Amount the guest handed over, minor units.
    pub tendered_minor: i64,
    /// Change returned, minor units.
    pub change_minor: i64,
    /// Free-text note from the desk.
    pub note: Option<String>,
}

// =============================================================================
// Rental
// =============================================================================

/// An occupied room from check-in until settlement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rental {
    pub id: String,
    /// Room code (business identifier, e.g. "P-201").
    pub room_id: String,
    /// Room type used for rate lookup.
    pub room_type_id: String,
    pub rent_type: RentType,
    #[ts(as = "String")]
    pub check_in_time: DateTime<Utc>,
    pub number_of_guests: i64,
    /// Primary car plate. Empty when the guest has no car.
    pub car_number: String,
    /// Registered customer; None for walk-ins.
    pub customer_id: Option<String>,
    /// Further vehicles, in the order they were added.
    pub additional_cars: Vec<AdditionalCar>,
    /// Drink lines, in the order first ordered.
    pub drink_orders: Vec<DrinkOrderLine>,
    pub status: RentalStatus,
    /// The shift that was open when this rental checked in.
    /// Transactions recorded under any other shift are cross-shift.
    pub origin_shift_id: String,
    /// Money taken at check-in, if any.
    pub prepayment: Option<Prepayment>,
    /// Set once at settlement.
    #[ts(as = "Option<String>")]
    pub check_out_time: Option<DateTime<Utc>>,
    /// Set once at settlement.
    pub settlement: Option<SettlementRecord>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    /// Checks if the rental is still active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }

    /// Sum of all drink lines.
    pub fn drinks_total(&self) -> Money {
        self.drink_orders
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// Current quantity on the line for a drink, zero if no line exists.
    pub fn drink_quantity(&self, drink_id: &str) -> i64 {
        self.drink_orders
            .iter()
            .find(|line| line.drink_id == drink_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }
}

// =============================================================================
// Shift
// =============================================================================

/// One cashier session at the desk.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub employee_id: String,
    /// Float in the drawer at open, minor units.
    pub opening_cash_minor: i64,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    /// Set when the shift closes; None while open.
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// Checks if the shift is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable ledger entry. Appended, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// The shift that was open when this entry was recorded.
    pub shift_id: String,
    pub rental_id: String,
    /// Room code at time of recording (frozen, for per-room reporting).
    pub room_id: String,
    pub kind: TransactionKind,
    /// Signed amount in minor units. Drink removals post negative.
    pub amount_minor: i64,
    /// How money changed hands. None for drink postings, which are
    /// settled later at checkout.
    pub method: Option<PaymentMethod>,
    /// True when the rental checked in under a different shift.
    pub is_cross_shift: bool,
    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sku(pack_stock: i64, unit_stock: i64) -> DrinkSku {
        DrinkSku {
            id: "d-1".to_string(),
            name: "Cola 330ml".to_string(),
            cost_price_minor: 8_000,
            selling_price_minor: 15_000,
            units_per_pack: 24,
            pack_stock,
            unit_stock,
            alert_threshold: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rental_status_default() {
        let status = RentalStatus::default();
        assert_eq!(status, RentalStatus::Active);
    }

    #[test]
    fn test_sku_available_combines_packs_and_units() {
        let sku = test_sku(2, 5);
        assert_eq!(sku.available(), 53);

        let empty = test_sku(0, 0);
        assert_eq!(empty.available(), 0);
    }

    #[test]
    fn test_sku_low_stock_threshold() {
        let plenty = test_sku(2, 0);
        assert!(!plenty.is_low_stock());

        let low = test_sku(0, 10);
        assert!(low.is_low_stock());
    }

    #[test]
    fn test_sku_can_reserve() {
        let sku = test_sku(0, 2);
        assert!(sku.can_reserve(2));
        assert!(!sku.can_reserve(3));

        let inactive = DrinkSku {
            is_active: false,
            ..test_sku(5, 0)
        };
        assert!(!inactive.can_reserve(1));
    }

    #[test]
    fn test_order_line_totals() {
        let line = DrinkOrderLine {
            drink_id: "d-1".to_string(),
            name: "Cola 330ml".to_string(),
            unit_price_minor: 15_000,
            quantity: 3,
        };
        assert_eq!(line.unit_price().minor(), 15_000);
        assert_eq!(line.line_total().minor(), 45_000);
    }

    #[test]
    fn test_shift_is_open() {
        let mut shift = Shift {
            id: "s-1".to_string(),
            employee_id: "e-1".to_string(),
            opening_cash_minor: 500_000,
            opened_at: Utc::now(),
            closed_at: None,
        };
        assert!(shift.is_open());

        shift.closed_at = Some(Utc::now());
        assert!(!shift.is_open());
    }
}
