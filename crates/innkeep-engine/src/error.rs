//! # API Error Type
//!
//! Unified error type for the engine's API surface.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Innkeep                                │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  POST /checkout/commit                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Engine Operation                                                │  │
//! │  │  CoreResult<T>                                                   │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Stock short? ── CoreError::InsufficientStock ──┐                │  │
//! │  │         │                                       │                │  │
//! │  │         ▼                                       ▼                │  │
//! │  │  Rental gone? ── CoreError::StaleRental ───── ApiError ────────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await commitCheckout(rentalId)                                       │
//! │  } catch (e) {                                                          │
//! │    // e.message = "Insufficient stock for COLA-330: ..."                │
//! │    // e.code = "INSUFFICIENT_STOCK"                                     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `InsufficientStock` and `StaleRental` keep their own codes so the UI
//! can react specifically (disable the add button, refresh the board)
//! rather than showing a generic failure. `Busy` is safe to retry.

use serde::Serialize;

use innkeep_core::CoreError;

/// API error returned from engine operations.
///
/// ## Serialization
/// This is what the frontend receives when an operation fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for COLA-330: available 2, requested 3"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await addDrink(rentalId, drinkId, 3);
/// } catch (e) {
///   switch (e.code) {
///     case 'INSUFFICIENT_STOCK':
///       disableAddButton(e.message);
///       break;
///     case 'BUSY':
///       retryShortly();
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Checkout time precedes check-in time
    InvalidTimeRange,

    /// Not enough drink stock for the requested quantity
    InsufficientStock,

    /// Rental already settled or cancelled
    StaleRental,

    /// No shift is open at the desk
    NoOpenShift,

    /// Shift lifecycle violation (already open, not current, unsettled)
    ShiftError,

    /// Room already has an active rental
    RoomOccupied,

    /// Entity lock contention; safe to retry
    Busy,

    /// Business logic error (422)
    BusinessLogic,

    /// Internal engine error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RentalNotFound(id) => ApiError::not_found("Rental", &id),
            CoreError::DrinkNotFound(id) => ApiError::not_found("Drink", &id),
            CoreError::InvalidTimeRange { .. } => {
                ApiError::new(ErrorCode::InvalidTimeRange, err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::StaleRental { .. } => ApiError::new(ErrorCode::StaleRental, err.to_string()),
            CoreError::NoOpenShift => ApiError::new(ErrorCode::NoOpenShift, err.to_string()),
            CoreError::ShiftAlreadyOpen { .. }
            | CoreError::ShiftNotCurrent { .. }
            | CoreError::UnsettledRentals { .. } => {
                ApiError::new(ErrorCode::ShiftError, err.to_string())
            }
            CoreError::Busy { .. } => ApiError::new(ErrorCode::Busy, err.to_string()),
            CoreError::RoomOccupied { .. } => ApiError::new(ErrorCode::RoomOccupied, err.to_string()),
            CoreError::UnknownRoomType(_) => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
