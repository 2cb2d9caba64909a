//! # Validation Module
//!
//! Input validation utilities for Innkeep.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine entry points (Rust)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain invariants (innkeep-core)                             │
//! │  ├── Stock never negative                                              │
//! │  └── Status transitions checked under lock                             │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use innkeep_core::validation::{validate_room_id, validate_quantity_delta};
//!
//! // Validate the room code before check-in
//! validate_room_id("P-201").unwrap();
//!
//! // Validate a drink quantity change before touching stock
//! validate_quantity_delta(3).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_GUESTS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a room identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_room_id;
///
/// assert!(validate_room_id("P-201").is_ok());
/// assert!(validate_room_id("").is_err());
/// assert!(validate_room_id("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_room_id(room_id: &str) -> ValidationResult<()> {
    let room_id = room_id.trim();

    if room_id.is_empty() {
        return Err(ValidationError::Required {
            field: "room_id".to_string(),
        });
    }

    if room_id.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "room_id".to_string(),
            max: 50,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !room_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "room_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a drink name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_drink_name;
///
/// assert!(validate_drink_name("Cola 330ml").is_ok());
/// assert!(validate_drink_name("").is_err());
/// ```
pub fn validate_drink_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a car number plate.
///
/// ## Rules
/// - Can be empty (guest without a car)
/// - Maximum 20 characters
///
/// ## Returns
/// The trimmed plate string.
pub fn validate_car_number(plate: &str) -> ValidationResult<String> {
    let plate = plate.trim();

    if plate.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "car_number".to_string(),
            max: 20,
        });
    }

    Ok(plate.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a drink quantity change.
///
/// ## Rules
/// - Must be non-zero (a zero delta is a no-op the caller should not send)
/// - Magnitude must not exceed MAX_LINE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Rental: Add Drink                                                      │
/// │                                                                         │
/// │  Operator taps +3 on Cola                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity_delta(3) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── delta == 0? → Error: "quantity must be positive"              │
/// │       │                                                                 │
/// │       ├── |delta| > 999? → Error: "quantity must be between..."         │
/// │       │                                                                 │
/// │       └── OK → Proceed with reserve                                     │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if delta.abs() > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_LINE_QUANTITY,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_price_minor;
///
/// assert!(validate_price_minor(15_000).is_ok());
/// assert!(validate_price_minor(0).is_ok());
/// assert!(validate_price_minor(-100).is_err());
/// ```
pub fn validate_price_minor(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a settlement adjustment (discount, surcharge, tendered).
///
/// ## Rules
/// - Must be non-negative; the sign is carried by the field's meaning,
///   never by the value
pub fn validate_adjustment_minor(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a guest count.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_GUESTS (20)
pub fn validate_guest_count(guests: i64) -> ValidationResult<()> {
    if guests <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "number_of_guests".to_string(),
        });
    }

    if guests > MAX_GUESTS {
        return Err(ValidationError::OutOfRange {
            field: "number_of_guests".to_string(),
            min: 1,
            max: MAX_GUESTS,
        });
    }

    Ok(())
}

/// Validates a pack size.
///
/// ## Rules
/// - Must be positive (a pack holds at least one unit)
pub fn validate_units_per_pack(units: i64) -> ValidationResult<()> {
    if units <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "units_per_pack".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock counter (packs or loose units).
///
/// ## Rules
/// - Must be non-negative
pub fn validate_stock_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID v4 format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use innkeep_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    // Try to parse as UUID
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
