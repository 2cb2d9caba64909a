//! # Drink Ledger
//!
//! The authority over drink stock. Every counter change flows through
//! `apply_delta`, which checks and mutates inside one write-lock
//! section so no interleaving can oversell a SKU.
//!
//! ## Two-Level Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Pack / Unit Normalization                                  │
//! │                                                                         │
//! │  A SKU holds stock as unopened packs plus loose units:                  │
//! │                                                                         │
//! │     available = pack_stock × units_per_pack + unit_stock                │
//! │                                                                         │
//! │  Every mutation recomputes both counters from the new total:           │
//! │                                                                         │
//! │     pack_stock = total / units_per_pack                                 │
//! │     unit_stock = total % units_per_pack                                 │
//! │                                                                         │
//! │  so 0 <= unit_stock < units_per_pack always holds, and a decrement      │
//! │  that exceeds the loose units breaks a pack open automatically:         │
//! │                                                                         │
//! │     1 pack of 24 + 1 loose, take 2  →  0 packs + 23 loose               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serialization of check-against-mutate across CALLS (the desk flow
//! that checks availability, appends a ledger entry, then applies the
//! delta) is the caller's job via the per-SKU advisory lock; this
//! module guarantees only that each single `apply_delta` is atomic.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use innkeep_core::validation::{
    validate_drink_name, validate_price_minor, validate_stock_count, validate_units_per_pack,
};
use innkeep_core::{CoreError, CoreResult, DrinkSku, ValidationError};

// =============================================================================
// Input Shapes
// =============================================================================

/// Request payload for registering a drink SKU.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrinkSku {
    pub name: String,
    pub cost_price_minor: i64,
    pub selling_price_minor: i64,
    pub units_per_pack: i64,
    pub pack_stock: i64,
    pub unit_stock: i64,
    pub alert_threshold: i64,
}

// =============================================================================
// Drink Ledger
// =============================================================================

/// In-memory drink catalog and stock counters.
#[derive(Debug)]
pub struct DrinkLedger {
    skus: RwLock<HashMap<String, Arc<DrinkSku>>>,
}

impl DrinkLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        DrinkLedger {
            skus: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new SKU after validating every field.
    ///
    /// Initial counters are normalized (loose units above a full pack
    /// fold into `pack_stock`), so a delivery entered as "1 pack + 30
    /// cans" of a 24-pack lands as 2 packs + 6 loose.
    ///
    /// ## Errors
    /// - `Validation` for an empty/overlong name, negative price or
    ///   stock, or a non-positive pack size
    /// - `Validation(Duplicate)` when an active SKU already uses the name
    pub fn register_sku(&self, input: NewDrinkSku) -> CoreResult<Arc<DrinkSku>> {
        validate_drink_name(&input.name)?;
        validate_price_minor(input.cost_price_minor)?;
        validate_price_minor(input.selling_price_minor)?;
        validate_units_per_pack(input.units_per_pack)?;
        validate_stock_count("pack_stock", input.pack_stock)?;
        validate_stock_count("unit_stock", input.unit_stock)?;
        validate_stock_count("alert_threshold", input.alert_threshold)?;

        let name = input.name.trim().to_string();
        let total = input.pack_stock * input.units_per_pack + input.unit_stock;
        let now = Utc::now();

        // Duplicate check and insert under one write section
        let mut skus = self.skus.write().expect("drink catalog poisoned");

        let duplicate = skus
            .values()
            .any(|sku| sku.is_active && sku.name.eq_ignore_ascii_case(&name));
        if duplicate {
            return Err(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name,
            }
            .into());
        }

        let sku = Arc::new(DrinkSku {
            id: Uuid::new_v4().to_string(),
            name,
            cost_price_minor: input.cost_price_minor,
            selling_price_minor: input.selling_price_minor,
            units_per_pack: input.units_per_pack,
            pack_stock: total / input.units_per_pack,
            unit_stock: total % input.units_per_pack,
            alert_threshold: input.alert_threshold,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        skus.insert(sku.id.clone(), sku.clone());
        drop(skus);

        info!(
            sku_id = %sku.id,
            name = %sku.name,
            available = sku.available(),
            "Drink SKU registered"
        );
        Ok(sku)
    }

    /// Returns the current snapshot of a SKU.
    pub fn sku(&self, sku_id: &str) -> CoreResult<Arc<DrinkSku>> {
        self.skus
            .read()
            .expect("drink catalog poisoned")
            .get(sku_id)
            .cloned()
            .ok_or_else(|| CoreError::DrinkNotFound(sku_id.to_string()))
    }

    /// Returns every SKU, sorted by name for a stable catalog listing.
    pub fn all_skus(&self) -> Vec<Arc<DrinkSku>> {
        let mut skus: Vec<Arc<DrinkSku>> = self
            .skus
            .read()
            .expect("drink catalog poisoned")
            .values()
            .cloned()
            .collect();
        skus.sort_by(|a, b| a.name.cmp(&b.name));
        skus
    }

    /// Returns active SKUs whose availability is at or below their
    /// alert threshold, sorted by name.
    pub fn alerting_skus(&self) -> Vec<Arc<DrinkSku>> {
        let mut skus: Vec<Arc<DrinkSku>> = self
            .skus
            .read()
            .expect("drink catalog poisoned")
            .values()
            .filter(|sku| sku.is_active && sku.is_low_stock())
            .cloned()
            .collect();
        skus.sort_by(|a, b| a.name.cmp(&b.name));
        skus
    }

    /// Total sellable units for a SKU.
    pub fn available_stock(&self, sku_id: &str) -> CoreResult<i64> {
        Ok(self.sku(sku_id)?.available())
    }

    /// Activates or soft-deletes a SKU. A deactivated SKU stays in the
    /// catalog for history but can no longer be sold.
    pub fn set_active(&self, sku_id: &str, active: bool) -> CoreResult<Arc<DrinkSku>> {
        let mut skus = self.skus.write().expect("drink catalog poisoned");
        let current = skus
            .get(sku_id)
            .cloned()
            .ok_or_else(|| CoreError::DrinkNotFound(sku_id.to_string()))?;

        let mut updated = (*current).clone();
        updated.is_active = active;
        updated.updated_at = Utc::now();
        let arc = Arc::new(updated);
        skus.insert(sku_id.to_string(), arc.clone());
        drop(skus);

        info!(sku_id = %sku_id, active = active, "Drink SKU active flag changed");
        Ok(arc)
    }

    /// Adds a delivery to a SKU's counters and renormalizes.
    pub fn restock(&self, sku_id: &str, packs: i64, units: i64) -> CoreResult<Arc<DrinkSku>> {
        validate_stock_count("packs", packs)?;
        validate_stock_count("units", units)?;

        let mut skus = self.skus.write().expect("drink catalog poisoned");
        let current = skus
            .get(sku_id)
            .cloned()
            .ok_or_else(|| CoreError::DrinkNotFound(sku_id.to_string()))?;

        let total = current.available() + packs * current.units_per_pack + units;
        let mut updated = (*current).clone();
        updated.pack_stock = total / updated.units_per_pack;
        updated.unit_stock = total % updated.units_per_pack;
        updated.updated_at = Utc::now();
        let arc = Arc::new(updated);
        skus.insert(sku_id.to_string(), arc.clone());
        drop(skus);

        info!(
            sku_id = %sku_id,
            added_packs = packs,
            added_units = units,
            available = arc.available(),
            "Drink SKU restocked"
        );
        Ok(arc)
    }

    /// Applies a signed stock change. Positive takes units out (a
    /// reservation), negative puts them back (a release).
    ///
    /// Check and mutation happen inside a single write-lock section:
    /// either the whole delta applies or nothing does. A failed call
    /// leaves the counters byte-identical.
    ///
    /// ## Errors
    /// - `DrinkNotFound` for an unknown id, or a reservation against a
    ///   deactivated SKU (delisted drinks are not sellable; releases
    ///   still work so a cancellation can restock them)
    /// - `InsufficientStock` when a reservation exceeds availability,
    ///   carrying the current availability for the caller to display
    pub fn apply_delta(&self, sku_id: &str, delta: i64) -> CoreResult<Arc<DrinkSku>> {
        let mut skus = self.skus.write().expect("drink catalog poisoned");
        let current = skus
            .get(sku_id)
            .cloned()
            .ok_or_else(|| CoreError::DrinkNotFound(sku_id.to_string()))?;

        let available = current.available();
        if delta > 0 {
            if !current.is_active {
                return Err(CoreError::DrinkNotFound(sku_id.to_string()));
            }
            if available < delta {
                return Err(CoreError::InsufficientStock {
                    sku: current.name.clone(),
                    available,
                    requested: delta,
                });
            }
        }

        let total = available - delta;
        let mut updated = (*current).clone();
        updated.pack_stock = total / updated.units_per_pack;
        updated.unit_stock = total % updated.units_per_pack;
        updated.updated_at = Utc::now();
        let arc = Arc::new(updated);
        skus.insert(sku_id.to_string(), arc.clone());
        drop(skus);

        info!(
            sku_id = %sku_id,
            delta = delta,
            available = arc.available(),
            "Drink stock changed"
        );
        if delta > 0 && arc.is_low_stock() {
            warn!(
                sku_id = %sku_id,
                name = %arc.name,
                available = arc.available(),
                threshold = arc.alert_threshold,
                "Drink stock at or below alert threshold"
            );
        }
        Ok(arc)
    }
}

impl Default for DrinkLedger {
    fn default() -> Self {
        DrinkLedger::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sku(name: &str, units_per_pack: i64, pack_stock: i64, unit_stock: i64) -> NewDrinkSku {
        NewDrinkSku {
            name: name.to_string(),
            cost_price_minor: 8_000,
            selling_price_minor: 15_000,
            units_per_pack,
            pack_stock,
            unit_stock,
            alert_threshold: 10,
        }
    }

    #[test]
    fn test_register_normalizes_counters() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 1, 30)).unwrap();

        // 1 pack + 30 loose of a 24-pack = 54 units = 2 packs + 6 loose
        assert_eq!(sku.pack_stock, 2);
        assert_eq!(sku.unit_stock, 6);
        assert_eq!(sku.available(), 54);
        assert!(sku.is_active);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let ledger = DrinkLedger::new();

        assert!(ledger.register_sku(new_sku("", 24, 1, 0)).is_err());
        assert!(ledger
            .register_sku(NewDrinkSku {
                units_per_pack: 0,
                ..new_sku("Cola", 24, 1, 0)
            })
            .is_err());
        assert!(ledger
            .register_sku(NewDrinkSku {
                selling_price_minor: -1,
                ..new_sku("Cola", 24, 1, 0)
            })
            .is_err());
        assert!(ledger
            .register_sku(NewDrinkSku {
                pack_stock: -1,
                ..new_sku("Cola", 24, 1, 0)
            })
            .is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let ledger = DrinkLedger::new();
        ledger.register_sku(new_sku("Cola 330ml", 24, 1, 0)).unwrap();

        let err = ledger
            .register_sku(new_sku("  cola 330ML ", 24, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_reserve_beyond_availability_leaves_stock_untouched() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 0, 2)).unwrap();

        let err = ledger.apply_delta(&sku.id, 3).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // The failed reservation changed nothing
        let after = ledger.sku(&sku.id).unwrap();
        assert_eq!(after.pack_stock, 0);
        assert_eq!(after.unit_stock, 2);
    }

    #[test]
    fn test_reserve_breaks_a_pack_when_loose_units_run_out() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 1, 1)).unwrap();

        let after = ledger.apply_delta(&sku.id, 2).unwrap();
        assert_eq!(after.pack_stock, 0);
        assert_eq!(after.unit_stock, 23);
        assert_eq!(after.available(), 23);
    }

    #[test]
    fn test_release_refolds_into_packs() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 0, 23)).unwrap();

        let after = ledger.apply_delta(&sku.id, -2).unwrap();
        assert_eq!(after.pack_stock, 1);
        assert_eq!(after.unit_stock, 1);
    }

    #[test]
    fn test_delta_sequence_conserves_totals() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 2, 5)).unwrap();
        let start = sku.available();

        ledger.apply_delta(&sku.id, 7).unwrap();
        ledger.apply_delta(&sku.id, -3).unwrap();
        ledger.apply_delta(&sku.id, 1).unwrap();

        let after = ledger.sku(&sku.id).unwrap();
        assert_eq!(after.available(), start - 7 + 3 - 1);
        assert!(after.unit_stock < after.units_per_pack);
        assert!(after.unit_stock >= 0);
    }

    #[test]
    fn test_restock_adds_and_normalizes() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 0, 23)).unwrap();

        let after = ledger.restock(&sku.id, 0, 5).unwrap();
        assert_eq!(after.pack_stock, 1);
        assert_eq!(after.unit_stock, 4);

        assert!(ledger.restock(&sku.id, -1, 0).is_err());
        assert!(ledger.restock("missing", 1, 0).is_err());
    }

    #[test]
    fn test_alerting_skus_filters_on_threshold() {
        let ledger = DrinkLedger::new();
        let low = ledger.register_sku(new_sku("Cola 330ml", 24, 0, 9)).unwrap();
        ledger.register_sku(new_sku("Water 500ml", 24, 2, 0)).unwrap();

        let alerting = ledger.alerting_skus();
        assert_eq!(alerting.len(), 1);
        assert_eq!(alerting[0].id, low.id);
    }

    #[test]
    fn test_deactivated_sku_rejects_reservations_but_accepts_releases() {
        let ledger = DrinkLedger::new();
        let sku = ledger.register_sku(new_sku("Cola 330ml", 24, 1, 0)).unwrap();
        ledger.set_active(&sku.id, false).unwrap();

        let err = ledger.apply_delta(&sku.id, 1).unwrap_err();
        assert!(matches!(err, CoreError::DrinkNotFound(_)));

        // A cancellation can still return units
        let after = ledger.apply_delta(&sku.id, -2).unwrap();
        assert_eq!(after.available(), 26);
    }

    #[test]
    fn test_unknown_sku_lookup() {
        let ledger = DrinkLedger::new();
        assert!(matches!(
            ledger.available_stock("missing"),
            Err(CoreError::DrinkNotFound(_))
        ));
    }
}
