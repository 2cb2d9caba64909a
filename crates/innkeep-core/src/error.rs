//! # Error Types
//!
//! Domain-specific error types for innkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  innkeep-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  innkeep-engine errors (separate crate)                                 │
//! │  └── ApiError         - What the frontend sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, availability, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message
//!
//! Note that a tier threshold overrun is NOT an error: it rides on the
//! price breakdown as a warning so the desk can decide what to do.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout time precedes check-in time.
    ///
    /// ## When This Occurs
    /// - Operator backdates a checkout before the stay began
    /// - Client clock skew produces an `as_of` earlier than check-in
    #[error("Invalid time range: checkout {checkout} is before check-in {check_in}")]
    InvalidTimeRange { check_in: String, checkout: String },

    /// Insufficient stock to reserve the requested drinks.
    ///
    /// ## When This Occurs
    /// - Adding more units of a drink than packs + loose units can cover
    ///
    /// ## User Workflow
    /// ```text
    /// Add drink (qty: 3)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "COLA-330", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 2 COLA-330 left" and disables further adds
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Rental is not in a state that allows checkout.
    ///
    /// ## When This Occurs
    /// - Committing a checkout for a cancelled rental
    /// - Operating on a rental another operation already moved on
    #[error("Rental {rental_id} is {status}, cannot settle")]
    StaleRental { rental_id: String, status: String },

    /// No shift is currently open.
    ///
    /// ## When This Occurs
    /// - Recording any transaction after close and before the next open
    #[error("No open shift: open a shift before recording transactions")]
    NoOpenShift,

    /// A shift is already open.
    #[error("Shift {shift_id} is already open")]
    ShiftAlreadyOpen { shift_id: String },

    /// The given shift is not the currently open one.
    #[error("Shift {shift_id} is not the current shift")]
    ShiftNotCurrent { shift_id: String },

    /// Shift close refused while rentals from this shift are unsettled.
    #[error("Cannot close shift: {count} unsettled rental(s) opened this shift")]
    UnsettledRentals { count: usize },

    /// Entity lock could not be acquired within the bounded wait.
    ///
    /// ## When This Occurs
    /// - Two operators act on the same rental or drink at once and one
    ///   holds the lock past the configured wait
    ///
    /// Safe to retry.
    #[error("Resource busy: {resource}")]
    Busy { resource: String },

    /// Rental cannot be found.
    #[error("Rental not found: {0}")]
    RentalNotFound(String),

    /// Drink SKU cannot be found.
    #[error("Drink not found: {0}")]
    DrinkNotFound(String),

    /// Room type has no configured rates.
    #[error("No rates configured for room type: {0}")]
    UnknownRoomType(String),

    /// Room already has an active rental.
    #[error("Room {room_id} is occupied by rental {rental_id}")]
    RoomOccupied { room_id: String, rental_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
