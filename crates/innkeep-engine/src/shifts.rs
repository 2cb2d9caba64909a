//! # Shift Ledger
//!
//! The per-shift cash book. At most one shift is open at a time; every
//! transaction is stamped with the shift that was open when it was
//! recorded and is immutable from then on.
//!
//! ## Revenue Decomposition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              What Counts As Shift Revenue                               │
//! │                                                                         │
//! │  CheckIn   (method = cash|banking)  →  cash / banking buckets           │
//! │  Checkout  (method = cash|banking)  →  cash / banking buckets           │
//! │  DrinkAdd  (method = None)          →  drink_sales only                 │
//! │                                                                         │
//! │  totalRevenue = cash + banking                                          │
//! │  expectedCash = openingCash + cash                                      │
//! │                                                                         │
//! │  Drink postings record consumption when it happens, but the money       │
//! │  arrives inside the checkout total. Counting them in revenue as         │
//! │  well would double-count every can sold.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cross-Shift Settlements
//! A rental that checks in under shift S1 and checks out under S2 books
//! its checkout into S2 (the drawer the money actually entered). The
//! transaction is flagged `is_cross_shift` and the report lists it
//! separately so the two cashiers can reconcile the handover.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use innkeep_core::{
    CoreError, CoreResult, Money, PaymentMethod, Rental, Shift, Transaction, TransactionKind,
    ValidationError,
};

// =============================================================================
// Report Shapes
// =============================================================================

/// Per-room settlement stats within one shift.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStat {
    pub room_id: String,
    /// Checkouts settled in this room during the shift.
    pub checkout_count: usize,
    /// Settled money (check-in prepayments + checkouts) for this room,
    /// minor units.
    pub revenue_minor: i64,
}

/// The reconciliation view of one shift.
///
/// Returned live by `current_report` and, with `closed_at` set, as the
/// final summary from `close_shift`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReport {
    pub shift: Shift,
    pub opening_cash_minor: i64,
    /// Settled cash (CheckIn + Checkout with method cash), minor units.
    pub cash_minor: i64,
    /// Settled bank transfers, minor units.
    pub banking_minor: i64,
    /// cash + banking, minor units.
    pub total_revenue_minor: i64,
    /// Net signed value of drink postings, minor units. Informational;
    /// already inside the checkout totals.
    pub drink_sales_minor: i64,
    /// opening cash + settled cash: what the drawer should hold.
    pub expected_cash_minor: i64,
    /// Every transaction recorded under this shift, in order.
    pub transactions: Vec<Transaction>,
    /// The subset whose rental checked in under an earlier shift.
    pub cross_shift_transactions: Vec<Transaction>,
    pub room_stats: Vec<RoomStat>,
}

// =============================================================================
// Shift Ledger
// =============================================================================

/// Everything the ledger guards, behind one mutex.
///
/// One lock means a record can never interleave with a close: a
/// transaction is either fully inside a shift or refused with
/// `NoOpenShift`, never half-attached.
#[derive(Debug, Default)]
struct ShiftBook {
    current: Option<Shift>,
    history: Vec<Shift>,
    transactions: Vec<Transaction>,
}

/// The shift lifecycle and transaction journal.
#[derive(Debug)]
pub struct ShiftLedger {
    opening_cash_minor: i64,
    book: Mutex<ShiftBook>,
}

impl ShiftLedger {
    /// Creates a ledger. Every shift opens with the same configured
    /// cash float.
    pub fn new(opening_cash_minor: i64) -> Self {
        ShiftLedger {
            opening_cash_minor,
            book: Mutex::new(ShiftBook::default()),
        }
    }

    /// Opens a new shift.
    ///
    /// ## Errors
    /// - `ShiftAlreadyOpen` while another shift is open
    /// - `Validation` for an empty employee id
    pub fn open_shift(&self, employee_id: &str) -> CoreResult<Shift> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(ValidationError::Required {
                field: "employee_id".to_string(),
            }
            .into());
        }

        let mut book = self.book.lock().expect("shift book poisoned");
        if let Some(open) = &book.current {
            return Err(CoreError::ShiftAlreadyOpen {
                shift_id: open.id.clone(),
            });
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            opening_cash_minor: self.opening_cash_minor,
            opened_at: Utc::now(),
            closed_at: None,
        };
        book.current = Some(shift.clone());
        drop(book);

        info!(
            shift_id = %shift.id,
            employee_id = %shift.employee_id,
            opening_cash = shift.opening_cash_minor,
            "Shift opened"
        );
        Ok(shift)
    }

    /// Returns the currently open shift, if any.
    pub fn current_shift(&self) -> Option<Shift> {
        self.book
            .lock()
            .expect("shift book poisoned")
            .current
            .clone()
    }

    /// Returns the open shift or `NoOpenShift`.
    pub fn require_open(&self) -> CoreResult<Shift> {
        self.current_shift().ok_or(CoreError::NoOpenShift)
    }

    /// Appends one transaction under the open shift.
    ///
    /// The entry is stamped with the recording time and flagged
    /// cross-shift when the rental checked in under a different shift.
    /// A check-in entry itself is never flagged.
    ///
    /// ## Errors
    /// - `NoOpenShift` when no shift is open; nothing is appended
    pub fn record(
        &self,
        rental: &Rental,
        kind: TransactionKind,
        amount: Money,
        method: Option<PaymentMethod>,
    ) -> CoreResult<Transaction> {
        let mut book = self.book.lock().expect("shift book poisoned");
        let shift = book.current.as_ref().ok_or(CoreError::NoOpenShift)?;
        let transaction = build_transaction(shift, rental, kind, amount, method);
        book.transactions.push(transaction.clone());
        drop(book);

        debug!(
            transaction_id = %transaction.id,
            shift_id = %transaction.shift_id,
            rental_id = %transaction.rental_id,
            kind = ?kind,
            amount = %amount,
            cross_shift = transaction.is_cross_shift,
            "Transaction recorded"
        );
        Ok(transaction)
    }

    /// Appends several transactions for one rental as a unit.
    ///
    /// The open-shift check runs once up front, so either every entry
    /// lands under the same shift or none does. Used by cancellation,
    /// which posts one release per drink line.
    pub fn record_batch(
        &self,
        rental: &Rental,
        entries: Vec<(TransactionKind, Money, Option<PaymentMethod>)>,
    ) -> CoreResult<Vec<Transaction>> {
        let mut book = self.book.lock().expect("shift book poisoned");
        let shift = book.current.as_ref().ok_or(CoreError::NoOpenShift)?;

        let transactions: Vec<Transaction> = entries
            .into_iter()
            .map(|(kind, amount, method)| build_transaction(shift, rental, kind, amount, method))
            .collect();
        book.transactions.extend(transactions.iter().cloned());
        drop(book);

        for transaction in &transactions {
            debug!(
                transaction_id = %transaction.id,
                shift_id = %transaction.shift_id,
                rental_id = %transaction.rental_id,
                kind = ?transaction.kind,
                amount = transaction.amount_minor,
                "Transaction recorded"
            );
        }
        Ok(transactions)
    }

    /// Builds the live report for the open shift.
    pub fn current_report(&self) -> CoreResult<ShiftReport> {
        let book = self.book.lock().expect("shift book poisoned");
        let shift = book.current.as_ref().ok_or(CoreError::NoOpenShift)?;
        Ok(build_report(shift.clone(), &book.transactions))
    }

    /// Closes the open shift and returns its final report.
    ///
    /// The caller must name the shift it believes is open; a stale id
    /// is refused so two terminals cannot close each other's drawer
    /// unnoticed. After close the ledger accepts no transactions until
    /// the next `open_shift`.
    ///
    /// ## Errors
    /// - `NoOpenShift` when nothing is open
    /// - `ShiftNotCurrent` when `shift_id` is not the open shift
    pub fn close_shift(&self, shift_id: &str) -> CoreResult<ShiftReport> {
        let mut book = self.book.lock().expect("shift book poisoned");
        let open = book.current.as_ref().ok_or(CoreError::NoOpenShift)?;
        if open.id != shift_id {
            return Err(CoreError::ShiftNotCurrent {
                shift_id: shift_id.to_string(),
            });
        }

        let mut closed = book.current.take().expect("checked above");
        closed.closed_at = Some(Utc::now());
        let report = build_report(closed.clone(), &book.transactions);
        book.history.push(closed);
        drop(book);

        info!(
            shift_id = %report.shift.id,
            total_revenue = report.total_revenue_minor,
            expected_cash = report.expected_cash_minor,
            transactions = report.transactions.len(),
            "Shift closed"
        );
        Ok(report)
    }
}

// =============================================================================
// Report Assembly
// =============================================================================

fn build_transaction(
    shift: &Shift,
    rental: &Rental,
    kind: TransactionKind,
    amount: Money,
    method: Option<PaymentMethod>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        shift_id: shift.id.clone(),
        rental_id: rental.id.clone(),
        room_id: rental.room_id.clone(),
        kind,
        amount_minor: amount.minor(),
        method,
        // A check-in posting defines the rental's origin shift and is
        // never cross-shift itself
        is_cross_shift: kind != TransactionKind::CheckIn
            && rental.origin_shift_id != shift.id,
        occurred_at: Utc::now(),
    }
}

fn build_report(shift: Shift, all_transactions: &[Transaction]) -> ShiftReport {
    let transactions: Vec<Transaction> = all_transactions
        .iter()
        .filter(|t| t.shift_id == shift.id)
        .cloned()
        .collect();

    let mut cash_minor = 0;
    let mut banking_minor = 0;
    let mut drink_sales_minor = 0;
    // BTreeMap keeps the per-room stats in room order
    let mut rooms: BTreeMap<String, RoomStat> = BTreeMap::new();

    for transaction in &transactions {
        match transaction.method {
            Some(PaymentMethod::Cash) => cash_minor += transaction.amount_minor,
            Some(PaymentMethod::Banking) => banking_minor += transaction.amount_minor,
            None => {}
        }
        if transaction.kind == TransactionKind::DrinkAdd {
            drink_sales_minor += transaction.amount_minor;
        }

        if transaction.method.is_some() {
            let stat = rooms
                .entry(transaction.room_id.clone())
                .or_insert_with(|| RoomStat {
                    room_id: transaction.room_id.clone(),
                    checkout_count: 0,
                    revenue_minor: 0,
                });
            stat.revenue_minor += transaction.amount_minor;
            if transaction.kind == TransactionKind::Checkout {
                stat.checkout_count += 1;
            }
        }
    }

    let cross_shift_transactions: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.is_cross_shift)
        .cloned()
        .collect();

    let opening_cash_minor = shift.opening_cash_minor;
    ShiftReport {
        shift,
        opening_cash_minor,
        cash_minor,
        banking_minor,
        total_revenue_minor: cash_minor + banking_minor,
        drink_sales_minor,
        expected_cash_minor: opening_cash_minor + cash_minor,
        transactions,
        cross_shift_transactions,
        room_stats: rooms.into_values().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::{RentType, RentalStatus};

    fn test_rental(room_id: &str, origin_shift_id: &str) -> Rental {
        Rental {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.to_string(),
            room_type_id: "standard".to_string(),
            rent_type: RentType::Hourly,
            check_in_time: Utc::now(),
            number_of_guests: 1,
            car_number: String::new(),
            customer_id: None,
            additional_cars: Vec::new(),
            drink_orders: Vec::new(),
            status: RentalStatus::Active,
            origin_shift_id: origin_shift_id.to_string(),
            prepayment: None,
            check_out_time: None,
            settlement: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_shift_lifecycle() {
        let ledger = ShiftLedger::new(500_000);
        assert!(ledger.current_shift().is_none());
        assert!(matches!(ledger.require_open(), Err(CoreError::NoOpenShift)));

        let shift = ledger.open_shift("emp-1").unwrap();
        assert_eq!(shift.opening_cash_minor, 500_000);
        assert!(shift.is_open());

        // Second open while one is running
        let err = ledger.open_shift("emp-2").unwrap_err();
        assert!(matches!(err, CoreError::ShiftAlreadyOpen { .. }));

        let report = ledger.close_shift(&shift.id).unwrap();
        assert!(report.shift.closed_at.is_some());
        assert!(ledger.current_shift().is_none());

        // Closing again finds nothing open
        assert!(matches!(
            ledger.close_shift(&shift.id),
            Err(CoreError::NoOpenShift)
        ));
    }

    #[test]
    fn test_open_shift_requires_employee() {
        let ledger = ShiftLedger::new(500_000);
        assert!(matches!(
            ledger.open_shift("  "),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_close_refuses_stale_shift_id() {
        let ledger = ShiftLedger::new(500_000);
        ledger.open_shift("emp-1").unwrap();

        let err = ledger.close_shift("some-other-shift").unwrap_err();
        assert!(matches!(err, CoreError::ShiftNotCurrent { .. }));
        assert!(ledger.current_shift().is_some());
    }

    #[test]
    fn test_record_requires_open_shift() {
        let ledger = ShiftLedger::new(500_000);
        let rental = test_rental("P-201", "s-0");

        let err = ledger
            .record(
                &rental,
                TransactionKind::Checkout,
                Money::from_minor(90_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NoOpenShift));
    }

    #[test]
    fn test_report_buckets_by_method_and_kind() {
        let ledger = ShiftLedger::new(500_000);
        let shift = ledger.open_shift("emp-1").unwrap();
        let rental = test_rental("P-201", &shift.id);

        ledger
            .record(
                &rental,
                TransactionKind::CheckIn,
                Money::from_minor(100_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap();
        ledger
            .record(
                &rental,
                TransactionKind::DrinkAdd,
                Money::from_minor(45_000),
                None,
            )
            .unwrap();
        ledger
            .record(
                &rental,
                TransactionKind::DrinkAdd,
                Money::from_minor(-15_000),
                None,
            )
            .unwrap();
        ledger
            .record(
                &rental,
                TransactionKind::Checkout,
                Money::from_minor(120_000),
                Some(PaymentMethod::Banking),
            )
            .unwrap();

        let report = ledger.current_report().unwrap();
        assert_eq!(report.cash_minor, 100_000);
        assert_eq!(report.banking_minor, 120_000);
        assert_eq!(report.total_revenue_minor, 220_000);
        // Drink postings net out separately and never touch revenue
        assert_eq!(report.drink_sales_minor, 30_000);
        assert_eq!(report.expected_cash_minor, 600_000);
        assert_eq!(report.transactions.len(), 4);
        assert!(report.cross_shift_transactions.is_empty());
    }

    #[test]
    fn test_cross_shift_checkout_books_into_closing_shift() {
        let ledger = ShiftLedger::new(500_000);

        // Night shift takes the check-in
        let s1 = ledger.open_shift("emp-night").unwrap();
        let rental = test_rental("P-201", &s1.id);
        ledger
            .record(
                &rental,
                TransactionKind::CheckIn,
                Money::zero(),
                Some(PaymentMethod::Cash),
            )
            .unwrap();
        ledger.close_shift(&s1.id).unwrap();

        // Morning shift settles the same rental
        let s2 = ledger.open_shift("emp-morning").unwrap();
        let checkout = ledger
            .record(
                &rental,
                TransactionKind::Checkout,
                Money::from_minor(70_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap();

        assert!(checkout.is_cross_shift);
        assert_eq!(checkout.shift_id, s2.id);

        let report = ledger.current_report().unwrap();
        assert_eq!(report.cross_shift_transactions.len(), 1);
        assert_eq!(report.cross_shift_transactions[0].id, checkout.id);
        // The money counts in the shift that received it
        assert_eq!(report.total_revenue_minor, 70_000);
        assert_eq!(report.cash_minor, 70_000);
    }

    #[test]
    fn test_check_in_posting_is_never_cross_shift() {
        let ledger = ShiftLedger::new(500_000);
        ledger.open_shift("emp-1").unwrap();

        // Origin stamped from a shift that is long gone
        let rental = test_rental("P-201", "s-archived");
        let check_in = ledger
            .record(&rental, TransactionKind::CheckIn, Money::zero(), None)
            .unwrap();
        assert!(!check_in.is_cross_shift);

        let drink = ledger
            .record(
                &rental,
                TransactionKind::DrinkAdd,
                Money::from_minor(15_000),
                None,
            )
            .unwrap();
        assert!(drink.is_cross_shift);

        let report = ledger.current_report().unwrap();
        assert_eq!(report.cross_shift_transactions.len(), 1);
        assert_eq!(report.cross_shift_transactions[0].id, drink.id);
    }

    #[test]
    fn test_room_stats_group_settled_money_by_room() {
        let ledger = ShiftLedger::new(500_000);
        let shift = ledger.open_shift("emp-1").unwrap();
        let room_a = test_rental("A-101", &shift.id);
        let room_b = test_rental("B-202", &shift.id);

        ledger
            .record(
                &room_a,
                TransactionKind::CheckIn,
                Money::from_minor(50_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap();
        ledger
            .record(
                &room_a,
                TransactionKind::Checkout,
                Money::from_minor(90_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap();
        ledger
            .record(
                &room_b,
                TransactionKind::Checkout,
                Money::from_minor(260_000),
                Some(PaymentMethod::Banking),
            )
            .unwrap();

        let report = ledger.current_report().unwrap();
        assert_eq!(report.room_stats.len(), 2);

        // BTreeMap ordering: A-101 before B-202
        assert_eq!(report.room_stats[0].room_id, "A-101");
        assert_eq!(report.room_stats[0].checkout_count, 1);
        assert_eq!(report.room_stats[0].revenue_minor, 140_000);
        assert_eq!(report.room_stats[1].room_id, "B-202");
        assert_eq!(report.room_stats[1].checkout_count, 1);
        assert_eq!(report.room_stats[1].revenue_minor, 260_000);
    }

    #[test]
    fn test_record_batch_lands_under_one_shift() {
        let ledger = ShiftLedger::new(500_000);
        let shift = ledger.open_shift("emp-1").unwrap();
        let rental = test_rental("P-201", &shift.id);

        let transactions = ledger
            .record_batch(
                &rental,
                vec![
                    (TransactionKind::DrinkAdd, Money::from_minor(-30_000), None),
                    (TransactionKind::DrinkAdd, Money::from_minor(-15_000), None),
                ],
            )
            .unwrap();
        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().all(|t| t.shift_id == shift.id));

        let report = ledger.current_report().unwrap();
        assert_eq!(report.drink_sales_minor, -45_000);
    }

    #[test]
    fn test_record_batch_refused_without_shift() {
        let ledger = ShiftLedger::new(500_000);
        let rental = test_rental("P-201", "s-0");

        let err = ledger
            .record_batch(
                &rental,
                vec![(TransactionKind::DrinkAdd, Money::from_minor(-30_000), None)],
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NoOpenShift));

        // Nothing leaked into the journal
        let shift = ledger.open_shift("emp-1").unwrap();
        let report = ledger.current_report().unwrap();
        assert!(report.transactions.is_empty());
        ledger.close_shift(&shift.id).unwrap();
    }

    #[test]
    fn test_closed_report_is_final() {
        let ledger = ShiftLedger::new(500_000);
        let shift = ledger.open_shift("emp-1").unwrap();
        let rental = test_rental("P-201", &shift.id);
        ledger
            .record(
                &rental,
                TransactionKind::Checkout,
                Money::from_minor(90_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap();

        let report = ledger.close_shift(&shift.id).unwrap();
        assert_eq!(report.total_revenue_minor, 90_000);
        assert!(!report.shift.is_open());

        // The journal refuses entries until the next shift opens
        let err = ledger
            .record(
                &rental,
                TransactionKind::Checkout,
                Money::from_minor(10_000),
                Some(PaymentMethod::Cash),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NoOpenShift));
    }
}
