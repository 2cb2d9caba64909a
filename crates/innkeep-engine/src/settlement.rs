//! # Settlement Service
//!
//! The composition root: rentals, the drink ledger, the shift ledger
//! and the price table behind one service surface. This is the API the
//! command layer calls; everything here returns typed results.
//!
//! ## The Two Checkout Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PREVIEW (read-only, repeatable)      COMMIT (atomic, once)             │
//! │                                                                         │
//! │  rental snapshot                      lock rental                       │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  resolve tier ──► summarize           Completed? ──► replay stored      │
//! │       │                               Cancelled? ──► StaleRental        │
//! │       ▼                                    │                            │
//! │  Quote (no locks, no writes)          resolve tier ──► summarize        │
//! │                                            │            (same math)     │
//! │                                            ▼                            │
//! │                                       journal Checkout  ← last fallible │
//! │                                            │              step          │
//! │                                            ▼                            │
//! │                                       rental := Completed + record      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Discipline
//! Every mutating operation orders ALL fallible checks before ANY
//! mutation, so a failure never leaves partial state behind and no
//! compensation path exists. The journal append is always the last
//! step that can refuse; the stock apply and snapshot swap that follow
//! cannot fail under the locks already held.
//!
//! Lock order is fixed: rental advisory, then SKU advisory, then the
//! shift book, then the data maps. Std-lock sections never span an
//! await.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use innkeep_core::validation::{
    validate_adjustment_minor, validate_car_number, validate_guest_count, validate_quantity_delta,
    validate_room_id,
};
use innkeep_core::{
    resolve, summarize, AdditionalCar, ChargeSummary, CoreError, CoreResult, DrinkOrderLine,
    DrinkSku, Money, PaymentMethod, Prepayment, PriceTable, RentType, Rental, RentalStatus,
    RoomCharge, SettlementRecord, Shift, StayDuration, TransactionKind, ValidationError,
    MAX_ADDITIONAL_CARS, MAX_LINE_QUANTITY,
};

use crate::config::EngineConfig;
use crate::drinks::DrinkLedger;
use crate::shifts::{ShiftLedger, ShiftReport};
use crate::store::{LockRegistry, SnapshotMap};

// =============================================================================
// Request Shapes
// =============================================================================

/// Check-in payload from the desk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub room_id: String,
    pub room_type_id: String,
    pub rent_type: RentType,
    /// Billing start override (e.g. the guest arrived before the desk
    /// caught up). Defaults to now.
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    pub number_of_guests: i64,
    #[serde(default)]
    pub car_number: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Money taken up front, minor units. Zero for none.
    #[serde(default)]
    pub prepaid_minor: i64,
    /// Required when `prepaid_minor` is positive.
    #[serde(default)]
    pub prepaid_method: Option<PaymentMethod>,
}

/// Shared payload for preview and commit. The preview ignores `note`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub rental_id: String,
    /// The proposed (or actual) checkout instant. Supplied by the
    /// caller so a preview printed for the guest matches the commit.
    pub checkout_time: DateTime<Utc>,
    #[serde(default)]
    pub discount_minor: i64,
    #[serde(default)]
    pub surcharge_minor: i64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub tendered_minor: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Settings that can change while a rental is active. `None` leaves a
/// field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalSettingsUpdate {
    #[serde(default)]
    pub rent_type: Option<RentType>,
    #[serde(default)]
    pub number_of_guests: Option<i64>,
}

// =============================================================================
// Response Shapes
// =============================================================================

/// One drink line on the bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkChargeLine {
    pub drink_id: String,
    pub name: String,
    pub unit_price_minor: i64,
    pub quantity: i64,
    pub line_total_minor: i64,
}

/// The drink side of the bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkCharges {
    pub items: Vec<DrinkChargeLine>,
    pub total_minor: i64,
}

/// A non-binding settlement preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub rental_id: String,
    pub room_id: String,
    pub duration: StayDuration,
    pub room: RoomCharge,
    pub drinks: DrinkCharges,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub surcharge_minor: i64,
    #[serde(rename = "final")]
    pub final_minor: i64,
    pub payment_method: PaymentMethod,
    pub tendered_minor: i64,
    pub change_minor: i64,
}

/// The committed settlement. A replayed commit returns the original
/// figures byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    pub rental_id: String,
    pub room_id: String,
    pub duration: StayDuration,
    pub room: RoomCharge,
    pub drinks: DrinkCharges,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub surcharge_minor: i64,
    #[serde(rename = "final")]
    pub final_minor: i64,
    pub payment_method: PaymentMethod,
    pub tendered_minor: i64,
    pub change_minor: i64,
    pub settled_at: DateTime<Utc>,
    pub shift_id: String,
    pub transaction_id: String,
    pub note: Option<String>,
}

/// Post-mutation snapshots after a drink change, so the desk can show
/// both the updated bill and the remaining stock without a second call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDrinkResponse {
    pub rental: Rental,
    pub drink_stock: DrinkSku,
}

// =============================================================================
// Settlement Service
// =============================================================================

/// The engine facade. One instance per house, shared behind an `Arc`.
#[derive(Debug)]
pub struct SettlementService {
    config: EngineConfig,
    price_table: RwLock<Arc<PriceTable>>,
    rentals: SnapshotMap<Rental>,
    drinks: DrinkLedger,
    shifts: ShiftLedger,
    locks: LockRegistry,
}

impl SettlementService {
    /// Builds a service from configuration and an initial price table.
    /// The timing windows are validated up front, exactly as
    /// [`update_price_table`](Self::update_price_table) validates a
    /// swap.
    pub fn new(config: EngineConfig, price_table: PriceTable) -> CoreResult<Self> {
        price_table.timing.validate()?;
        let shifts = ShiftLedger::new(config.opening_cash_minor);
        let locks = LockRegistry::new(config.lock_wait());
        Ok(SettlementService {
            config,
            price_table: RwLock::new(Arc::new(price_table)),
            rentals: SnapshotMap::new(),
            drinks: DrinkLedger::new(),
            shifts,
            locks,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the drink catalog. Stock-mutating admin calls
    /// should go through [`restock_drink`](Self::restock_drink) and
    /// [`set_drink_active`](Self::set_drink_active) so they serialize
    /// with in-flight orders.
    pub fn drinks(&self) -> &DrinkLedger {
        &self.drinks
    }

    pub fn shifts(&self) -> &ShiftLedger {
        &self.shifts
    }

    /// The current price table snapshot.
    pub fn price_table(&self) -> Arc<PriceTable> {
        self.price_table
            .read()
            .expect("price table poisoned")
            .clone()
    }

    /// Swaps in a new price table after validating its timing windows.
    /// In-flight settlements keep the snapshot they already took.
    pub fn update_price_table(&self, table: PriceTable) -> CoreResult<()> {
        table.timing.validate()?;
        *self.price_table.write().expect("price table poisoned") = Arc::new(table);
        info!("Price table updated");
        Ok(())
    }

    // =========================================================================
    // Rental Lifecycle
    // =========================================================================

    /// Current snapshot of one rental.
    pub fn rental(&self, rental_id: &str) -> CoreResult<Arc<Rental>> {
        self.rentals
            .get(rental_id)
            .ok_or_else(|| CoreError::RentalNotFound(rental_id.to_string()))
    }

    /// The room board: every active rental, ordered by room.
    pub fn active_rentals(&self) -> Vec<Arc<Rental>> {
        let mut rentals: Vec<Arc<Rental>> = self
            .rentals
            .values()
            .into_iter()
            .filter(|r| r.is_active())
            .collect();
        rentals.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rentals
    }

    /// Checks a guest in and records the check-in transaction.
    ///
    /// The rental's origin shift is the shift its check-in posting
    /// lands in, read back from the journal entry.
    ///
    /// ## Errors
    /// - `Validation` for a bad room id, guest count, plate, negative
    ///   prepayment, or a positive prepayment without a method
    /// - `UnknownRoomType` when no rates exist for the room type
    /// - `RoomOccupied` when the room already has an active rental
    /// - `NoOpenShift` when no shift is open; nothing is created
    pub async fn check_in(&self, request: CheckInRequest) -> CoreResult<Arc<Rental>> {
        validate_room_id(&request.room_id)?;
        validate_guest_count(request.number_of_guests)?;
        let car_number = validate_car_number(&request.car_number)?;
        validate_adjustment_minor("prepaid", request.prepaid_minor)?;
        self.price_table().rates_for(&request.room_type_id)?;

        let prepayment = if request.prepaid_minor > 0 {
            let method = request
                .prepaid_method
                .ok_or_else(|| ValidationError::Required {
                    field: "prepaid_method".to_string(),
                })?;
            Some(Prepayment {
                amount_minor: request.prepaid_minor,
                method,
            })
        } else {
            None
        };

        let shift = self.shifts.require_open()?;
        let room_id = request.room_id.trim().to_string();
        let _room_guard = self.locks.acquire(&room_key(&room_id)).await?;

        if let Some(occupant) = self
            .rentals
            .values()
            .into_iter()
            .find(|r| r.is_active() && r.room_id == room_id)
        {
            return Err(CoreError::RoomOccupied {
                room_id,
                rental_id: occupant.id.clone(),
            });
        }

        let now = Utc::now();
        let mut rental = Rental {
            id: Uuid::new_v4().to_string(),
            room_id,
            room_type_id: request.room_type_id,
            rent_type: request.rent_type,
            check_in_time: request.check_in_time.unwrap_or(now),
            number_of_guests: request.number_of_guests,
            car_number,
            customer_id: request.customer_id,
            additional_cars: Vec::new(),
            drink_orders: Vec::new(),
            status: RentalStatus::Active,
            origin_shift_id: shift.id,
            prepayment,
            check_out_time: None,
            settlement: None,
            created_at: now,
            updated_at: now,
        };

        // Journal first: if the shift closed since the check above, the
        // rental must not come into existence
        let transaction = self.shifts.record(
            &rental,
            TransactionKind::CheckIn,
            Money::from_minor(request.prepaid_minor),
            prepayment.map(|p| p.method),
        )?;
        // The journal is authoritative for the origin: the shift
        // observed above may have rolled over while the room lock was
        // pending
        rental.origin_shift_id = transaction.shift_id;
        let rental = self.rentals.insert(&rental.id.clone(), rental);

        info!(
            rental_id = %rental.id,
            room_id = %rental.room_id,
            rent_type = ?rental.rent_type,
            prepaid = request.prepaid_minor,
            "Guest checked in"
        );
        Ok(rental)
    }

    /// Parks another car against an active rental.
    pub async fn add_car(
        &self,
        rental_id: &str,
        car_number: &str,
        customer_id: Option<String>,
    ) -> CoreResult<Arc<Rental>> {
        let plate = validate_car_number(car_number)?;
        if plate.is_empty() {
            return Err(ValidationError::Required {
                field: "car_number".to_string(),
            }
            .into());
        }

        let _guard = self.locks.acquire(&rental_key(rental_id)).await?;
        let rental = self.rental(rental_id)?;
        require_active(&rental)?;

        if rental.additional_cars.len() >= MAX_ADDITIONAL_CARS {
            return Err(ValidationError::OutOfRange {
                field: "additional_cars".to_string(),
                min: 0,
                max: MAX_ADDITIONAL_CARS as i64,
            }
            .into());
        }

        let mut updated = (*rental).clone();
        updated.additional_cars.push(AdditionalCar {
            car_number: plate.clone(),
            is_walk_in: customer_id.is_none(),
            customer_id,
        });
        updated.updated_at = Utc::now();
        let rental = self.rentals.insert(rental_id, updated);

        info!(rental_id = %rental_id, car_number = %plate, "Car added to rental");
        Ok(rental)
    }

    /// Applies settings changes to an active rental. A rent-type switch
    /// takes effect at the next settlement computation.
    pub async fn update_rental_settings(
        &self,
        rental_id: &str,
        update: RentalSettingsUpdate,
    ) -> CoreResult<Arc<Rental>> {
        if let Some(guests) = update.number_of_guests {
            validate_guest_count(guests)?;
        }

        let _guard = self.locks.acquire(&rental_key(rental_id)).await?;
        let rental = self.rental(rental_id)?;
        require_active(&rental)?;

        let mut updated = (*rental).clone();
        if let Some(rent_type) = update.rent_type {
            updated.rent_type = rent_type;
        }
        if let Some(guests) = update.number_of_guests {
            updated.number_of_guests = guests;
        }
        updated.updated_at = Utc::now();
        let rental = self.rentals.insert(rental_id, updated);

        info!(
            rental_id = %rental_id,
            rent_type = ?rental.rent_type,
            guests = rental.number_of_guests,
            "Rental settings updated"
        );
        Ok(rental)
    }

    // =========================================================================
    // Drinks
    // =========================================================================

    /// Changes a drink line by a signed quantity and moves stock the
    /// opposite way. The line's unit price freezes at first creation.
    ///
    /// Holds the rental lock, then the SKU lock; the availability check
    /// runs under the SKU lock so two racing adds can never both pass
    /// on the same last cans.
    ///
    /// ## Errors
    /// - `Validation` for a zero delta, a reduction below zero, or a
    ///   line past the per-line cap
    /// - `StaleRental` when the rental is no longer active
    /// - `InsufficientStock` with current availability; nothing changes
    /// - `NoOpenShift` when no shift is open; nothing changes
    pub async fn add_drink(
        &self,
        rental_id: &str,
        drink_id: &str,
        delta: i64,
    ) -> CoreResult<AddDrinkResponse> {
        validate_quantity_delta(delta)?;

        let _rental_guard = self.locks.acquire(&rental_key(rental_id)).await?;
        let rental = self.rental(rental_id)?;
        require_active(&rental)?;

        let current_qty = rental.drink_quantity(drink_id);
        let new_qty = current_qty + delta;
        if new_qty < 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: current_qty,
            }
            .into());
        }
        if new_qty > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: MAX_LINE_QUANTITY,
            }
            .into());
        }

        let _sku_guard = self.locks.acquire(&drink_key(drink_id)).await?;

        // Authoritative availability check, pinned by the held SKU lock
        let sku = self.drinks.sku(drink_id)?;
        if delta > 0 {
            if !sku.is_active {
                return Err(CoreError::DrinkNotFound(drink_id.to_string()));
            }
            if sku.available() < delta {
                return Err(CoreError::InsufficientStock {
                    sku: sku.name.clone(),
                    available: sku.available(),
                    requested: delta,
                });
            }
        }

        let unit_price_minor = rental
            .drink_orders
            .iter()
            .find(|line| line.drink_id == drink_id)
            .map(|line| line.unit_price_minor)
            .unwrap_or(sku.selling_price_minor);

        // Journal first; stock and line apply cannot refuse after this
        self.shifts.record(
            &rental,
            TransactionKind::DrinkAdd,
            Money::from_minor(delta * unit_price_minor),
            None,
        )?;

        let stock = match self.drinks.apply_delta(drink_id, delta) {
            Ok(stock) => stock,
            Err(err) => {
                // Unreachable through this service: the check above ran
                // under the SKU lock every stock mutation takes. A raw
                // ledger call bypassed the lock; the journal entry
                // stands for reconciliation to flag.
                error!(
                    rental_id = %rental_id,
                    drink_id = %drink_id,
                    delta = delta,
                    %err,
                    "Stock apply refused after journal append"
                );
                return Err(err);
            }
        };

        let mut updated = (*rental).clone();
        match updated
            .drink_orders
            .iter_mut()
            .find(|line| line.drink_id == drink_id)
        {
            Some(line) => line.quantity = new_qty,
            None => updated.drink_orders.push(DrinkOrderLine {
                drink_id: drink_id.to_string(),
                name: sku.name.clone(),
                unit_price_minor,
                quantity: new_qty,
            }),
        }
        updated.drink_orders.retain(|line| line.quantity > 0);
        updated.updated_at = Utc::now();
        let rental = self.rentals.insert(rental_id, updated);

        info!(
            rental_id = %rental_id,
            drink_id = %drink_id,
            delta = delta,
            line_quantity = new_qty,
            remaining = stock.available(),
            "Drink line changed"
        );
        Ok(AddDrinkResponse {
            rental: (*rental).clone(),
            drink_stock: (*stock).clone(),
        })
    }

    /// Adds a delivery to a SKU, serialized with in-flight orders.
    pub async fn restock_drink(
        &self,
        drink_id: &str,
        packs: i64,
        units: i64,
    ) -> CoreResult<Arc<DrinkSku>> {
        let _guard = self.locks.acquire(&drink_key(drink_id)).await?;
        self.drinks.restock(drink_id, packs, units)
    }

    /// Activates or delists a SKU, serialized with in-flight orders.
    pub async fn set_drink_active(&self, drink_id: &str, active: bool) -> CoreResult<Arc<DrinkSku>> {
        let _guard = self.locks.acquire(&drink_key(drink_id)).await?;
        self.drinks.set_active(drink_id, active)
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    /// Computes the running bill without touching anything.
    ///
    /// Lock-free and repeatable: the desk refreshes this while the
    /// guest decides. The commit recomputes the same math, so a preview
    /// and a commit over identical inputs always agree.
    pub fn preview_checkout(&self, request: &CheckoutRequest) -> CoreResult<Quote> {
        let rental = self.rental(&request.rental_id)?;
        require_active(&rental)?;
        let summary = self.charge_summary(&rental, request)?;

        debug!(
            rental_id = %rental.id,
            final_minor = summary.final_minor,
            "Checkout previewed"
        );
        Ok(build_quote(&rental, &summary, request.method))
    }

    /// Settles an active rental: exactly once, all or nothing.
    ///
    /// A second commit for the same rental replays the stored outcome
    /// instead of charging again, so a double-tapped checkout button is
    /// harmless. The final amount is re-derived here; a client-supplied
    /// total is never trusted.
    ///
    /// ## Errors
    /// - `StaleRental` when the rental was cancelled
    /// - `InvalidTimeRange` when the checkout instant precedes check-in
    /// - `NoOpenShift` when no shift is open; the rental stays active
    pub async fn commit_checkout(&self, request: &CheckoutRequest) -> CoreResult<SettlementResult> {
        let _guard = self.locks.acquire(&rental_key(&request.rental_id)).await?;
        let rental = self.rental(&request.rental_id)?;

        match rental.status {
            RentalStatus::Completed => {
                let record = stored_settlement(&rental)?;
                info!(
                    rental_id = %rental.id,
                    transaction_id = %record.transaction_id,
                    "Checkout replayed from stored settlement"
                );
                return Ok(build_settlement_result(&rental, record));
            }
            RentalStatus::Cancelled => {
                return Err(CoreError::StaleRental {
                    rental_id: rental.id.clone(),
                    status: "cancelled".to_string(),
                });
            }
            RentalStatus::Active => {}
        }

        let summary = self.charge_summary(&rental, request)?;

        // Journal under the shift open right now; last fallible step
        let transaction = self.shifts.record(
            &rental,
            TransactionKind::Checkout,
            Money::from_minor(summary.final_minor),
            Some(request.method),
        )?;

        let record = SettlementRecord {
            settled_at: transaction.occurred_at,
            shift_id: transaction.shift_id.clone(),
            transaction_id: transaction.id.clone(),
            room: summary.room.clone(),
            drinks_total_minor: summary.drinks_total_minor,
            subtotal_minor: summary.subtotal_minor,
            discount_minor: summary.discount_minor,
            surcharge_minor: summary.surcharge_minor,
            final_minor: summary.final_minor,
            method: request.method,
            tendered_minor: summary.tendered_minor,
            change_minor: summary.change_minor,
            note: request.note.clone(),
        };

        let mut updated = (*rental).clone();
        updated.status = RentalStatus::Completed;
        updated.check_out_time = Some(request.checkout_time);
        updated.settlement = Some(record);
        updated.updated_at = Utc::now();
        let rental = self.rentals.insert(&request.rental_id, updated);

        info!(
            rental_id = %rental.id,
            room_id = %rental.room_id,
            final_minor = summary.final_minor,
            method = ?request.method,
            cross_shift = transaction.is_cross_shift,
            "Checkout committed"
        );
        let record = stored_settlement(&rental)?;
        Ok(build_settlement_result(&rental, record))
    }

    /// Cancels an active rental and returns every reserved drink to
    /// stock, with one release posting per line.
    pub async fn cancel_rental(&self, rental_id: &str) -> CoreResult<Arc<Rental>> {
        let _guard = self.locks.acquire(&rental_key(rental_id)).await?;
        let rental = self.rental(rental_id)?;
        require_active(&rental)?;

        // The release postings are journal entries, so cancellation
        // needs an open shift even for a rental with no drinks
        self.shifts.require_open()?;

        let releases: Vec<(TransactionKind, Money, Option<PaymentMethod>)> = rental
            .drink_orders
            .iter()
            .map(|line| {
                (
                    TransactionKind::DrinkAdd,
                    Money::from_minor(-line.quantity * line.unit_price_minor),
                    None,
                )
            })
            .collect();
        if !releases.is_empty() {
            self.shifts.record_batch(&rental, releases)?;
        }

        // Releases never fail on a known SKU; log and keep going if the
        // catalog was mutated behind the service's back
        for line in &rental.drink_orders {
            if let Err(err) = self.drinks.apply_delta(&line.drink_id, -line.quantity) {
                error!(
                    rental_id = %rental_id,
                    drink_id = %line.drink_id,
                    quantity = line.quantity,
                    %err,
                    "Stock release refused during cancellation"
                );
            }
        }

        let mut updated = (*rental).clone();
        updated.status = RentalStatus::Cancelled;
        updated.drink_orders.clear();
        updated.updated_at = Utc::now();
        let rental = self.rentals.insert(rental_id, updated);

        info!(rental_id = %rental_id, room_id = %rental.room_id, "Rental cancelled");
        Ok(rental)
    }

    // =========================================================================
    // Shifts
    // =========================================================================

    /// Opens a shift with the configured cash float.
    pub fn open_shift(&self, employee_id: &str) -> CoreResult<Shift> {
        self.shifts.open_shift(employee_id)
    }

    /// Closes the named shift and returns its final report.
    ///
    /// With `require_same_shift_settlement` set, the close is refused
    /// while any active rental checked in under this shift.
    pub fn close_shift(&self, shift_id: &str) -> CoreResult<ShiftReport> {
        if self.config.require_same_shift_settlement {
            let unsettled = self
                .rentals
                .values()
                .into_iter()
                .filter(|r| r.is_active() && r.origin_shift_id == shift_id)
                .count();
            if unsettled > 0 {
                warn!(
                    shift_id = %shift_id,
                    unsettled = unsettled,
                    "Shift close refused: unsettled rentals from this shift"
                );
                return Err(CoreError::UnsettledRentals { count: unsettled });
            }
        }
        self.shifts.close_shift(shift_id)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// The single bill computation both preview and commit run.
    fn charge_summary(
        &self,
        rental: &Rental,
        request: &CheckoutRequest,
    ) -> CoreResult<ChargeSummary> {
        validate_adjustment_minor("discount", request.discount_minor)?;
        validate_adjustment_minor("surcharge", request.surcharge_minor)?;
        validate_adjustment_minor("tendered", request.tendered_minor)?;

        let table = self.price_table();
        let rates = table.rates_for(&rental.room_type_id)?;
        let room = resolve(
            rental.rent_type,
            rental.check_in_time,
            request.checkout_time,
            rates,
            &table.timing,
        )?;

        Ok(summarize(
            room,
            &rental.drink_orders,
            Money::from_minor(request.discount_minor),
            Money::from_minor(request.surcharge_minor),
            Money::from_minor(request.tendered_minor),
        ))
    }
}

// =============================================================================
// Assembly Helpers
// =============================================================================

fn rental_key(rental_id: &str) -> String {
    format!("rental:{rental_id}")
}

fn drink_key(drink_id: &str) -> String {
    format!("drink:{drink_id}")
}

fn room_key(room_id: &str) -> String {
    format!("room:{room_id}")
}

fn require_active(rental: &Rental) -> CoreResult<()> {
    if rental.is_active() {
        Ok(())
    } else {
        Err(CoreError::StaleRental {
            rental_id: rental.id.clone(),
            status: format!("{:?}", rental.status).to_lowercase(),
        })
    }
}

fn stored_settlement(rental: &Rental) -> CoreResult<&SettlementRecord> {
    rental.settlement.as_ref().ok_or_else(|| {
        // A completed rental always carries its record; reaching this
        // means the snapshot was built outside the service
        error!(rental_id = %rental.id, "Completed rental has no settlement record");
        CoreError::StaleRental {
            rental_id: rental.id.clone(),
            status: "corrupt".to_string(),
        }
    })
}

fn drink_charges(lines: &[DrinkOrderLine], total_minor: i64) -> DrinkCharges {
    DrinkCharges {
        items: lines
            .iter()
            .map(|line| DrinkChargeLine {
                drink_id: line.drink_id.clone(),
                name: line.name.clone(),
                unit_price_minor: line.unit_price_minor,
                quantity: line.quantity,
                line_total_minor: line.line_total().minor(),
            })
            .collect(),
        total_minor,
    }
}

fn build_quote(rental: &Rental, summary: &ChargeSummary, method: PaymentMethod) -> Quote {
    Quote {
        rental_id: rental.id.clone(),
        room_id: rental.room_id.clone(),
        duration: summary.room.duration,
        room: summary.room.clone(),
        drinks: drink_charges(&rental.drink_orders, summary.drinks_total_minor),
        subtotal_minor: summary.subtotal_minor,
        discount_minor: summary.discount_minor,
        surcharge_minor: summary.surcharge_minor,
        final_minor: summary.final_minor,
        payment_method: method,
        tendered_minor: summary.tendered_minor,
        change_minor: summary.change_minor,
    }
}

fn build_settlement_result(rental: &Rental, record: &SettlementRecord) -> SettlementResult {
    SettlementResult {
        rental_id: rental.id.clone(),
        room_id: rental.room_id.clone(),
        duration: record.room.duration,
        room: record.room.clone(),
        drinks: drink_charges(&rental.drink_orders, record.drinks_total_minor),
        subtotal_minor: record.subtotal_minor,
        discount_minor: record.discount_minor,
        surcharge_minor: record.surcharge_minor,
        final_minor: record.final_minor,
        payment_method: record.method,
        tendered_minor: record.tendered_minor,
        change_minor: record.change_minor,
        settled_at: record.settled_at,
        shift_id: record.shift_id.clone(),
        transaction_id: record.transaction_id.clone(),
        note: record.note.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
