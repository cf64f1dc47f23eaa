//! Unified error codes for Tavola
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Reservation errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Operations errors (users, shifts, inventory)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a plain `u16` so the frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Request conflicts with current state
    Conflict = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Password too short
    PasswordTooShort = 1006,
    /// Username already taken
    UsernameExists = 1007,
    /// Email already registered
    EmailExists = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Users cannot delete their own account
    CannotDeleteSelf = 2003,

    // ==================== 3xxx: Cart ====================
    /// Cart line not found
    CartItemNotFound = 3001,
    /// Cart line quantity out of range
    CartQuantityExceeded = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,
    /// Order can no longer be cancelled
    OrderNotCancellable = 4003,
    /// Dine-in order without a table
    OrderTableRequired = 4004,
    /// Order line quantity out of range
    OrderItemInvalidQuantity = 4005,

    // ==================== 5xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 5001,
    /// Table already booked for the slot
    ReservationConflict = 5002,
    /// No table fits the party at the slot
    NoTableAvailable = 5003,
    /// Party does not fit the requested table
    TableCapacityExceeded = 5004,
    /// Time is not a bookable slot
    InvalidTimeSlot = 5005,
    /// Reservation date is in the past
    ReservationInPast = 5006,
    /// Reservation can no longer be edited by its owner
    ReservationNotEditable = 5007,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is not currently available
    MenuItemUnavailable = 6002,
    /// Menu item name already exists
    MenuItemNameExists = 6003,
    /// Invalid price
    InvalidPrice = 6004,
    /// Dietary option not found
    DietaryOptionNotFound = 6005,
    /// Dietary option name already exists
    DietaryOptionNameExists = 6006,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table number already exists
    TableNumberExists = 7002,
    /// Table is inactive or out of service
    TableInactive = 7003,
    /// Table still has reservations
    TableHasReservations = 7004,
    /// Capacity out of range
    InvalidCapacity = 7005,

    // ==================== 8xxx: Operations ====================
    /// User not found
    UserNotFound = 8001,
    /// Shift not found
    ShiftNotFound = 8101,
    /// Shift overlaps another shift of the same user
    ShiftOverlap = 8102,
    /// Shift end is not after its start
    ShiftInvalidRange = 8103,
    /// Shift assignee is not an active staff member
    ShiftAssigneeInvalid = 8104,
    /// Inventory item not found
    InventoryItemNotFound = 8501,
    /// Inventory item name already exists
    InventoryNameExists = 8502,
    /// Adjustment would drive stock negative
    InsufficientStock = 8503,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::Conflict => "Request conflicts with current state",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CannotDeleteSelf => "Cannot delete your own account",

            // Cart
            ErrorCode::CartItemNotFound => "Item is not in the cart",
            ErrorCode::CartQuantityExceeded => "Cart quantity out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderTableRequired => "Dine-in orders require a table",
            ErrorCode::OrderItemInvalidQuantity => "Order item quantity out of range",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationConflict => "Table is already booked for this time",
            ErrorCode::NoTableAvailable => "No table available for this time",
            ErrorCode::TableCapacityExceeded => "Party size exceeds table capacity",
            ErrorCode::InvalidTimeSlot => "Time is not a bookable slot",
            ErrorCode::ReservationInPast => "Reservation date is in the past",
            ErrorCode::ReservationNotEditable => "Reservation can no longer be modified",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::MenuItemNameExists => "Menu item name already exists",
            ErrorCode::InvalidPrice => "Invalid price",
            ErrorCode::DietaryOptionNotFound => "Dietary option not found",
            ErrorCode::DietaryOptionNameExists => "Dietary option name already exists",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableInactive => "Table is not in service",
            ErrorCode::TableHasReservations => "Table has reservations",
            ErrorCode::InvalidCapacity => "Table capacity out of range",

            // Operations
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::ShiftNotFound => "Shift not found",
            ErrorCode::ShiftOverlap => "Shift overlaps an existing shift",
            ErrorCode::ShiftInvalidRange => "Shift must end after it starts",
            ErrorCode::ShiftAssigneeInvalid => "Shift must be assigned to active staff",
            ErrorCode::InventoryItemNotFound => "Inventory item not found",
            ErrorCode::InventoryNameExists => "Inventory item name already exists",
            ErrorCode::InsufficientStock => "Insufficient stock",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown `u16` into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,
            9 => ErrorCode::Conflict,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1005 => ErrorCode::AccountDisabled,
            1006 => ErrorCode::PasswordTooShort,
            1007 => ErrorCode::UsernameExists,
            1008 => ErrorCode::EmailExists,

            2001 => ErrorCode::PermissionDenied,
            2003 => ErrorCode::CannotDeleteSelf,

            3001 => ErrorCode::CartItemNotFound,
            3002 => ErrorCode::CartQuantityExceeded,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderEmpty,
            4003 => ErrorCode::OrderNotCancellable,
            4004 => ErrorCode::OrderTableRequired,
            4005 => ErrorCode::OrderItemInvalidQuantity,

            5001 => ErrorCode::ReservationNotFound,
            5002 => ErrorCode::ReservationConflict,
            5003 => ErrorCode::NoTableAvailable,
            5004 => ErrorCode::TableCapacityExceeded,
            5005 => ErrorCode::InvalidTimeSlot,
            5006 => ErrorCode::ReservationInPast,
            5007 => ErrorCode::ReservationNotEditable,

            6001 => ErrorCode::MenuItemNotFound,
            6002 => ErrorCode::MenuItemUnavailable,
            6003 => ErrorCode::MenuItemNameExists,
            6004 => ErrorCode::InvalidPrice,
            6005 => ErrorCode::DietaryOptionNotFound,
            6006 => ErrorCode::DietaryOptionNameExists,

            7001 => ErrorCode::TableNotFound,
            7002 => ErrorCode::TableNumberExists,
            7003 => ErrorCode::TableInactive,
            7004 => ErrorCode::TableHasReservations,
            7005 => ErrorCode::InvalidCapacity,

            8001 => ErrorCode::UserNotFound,
            8101 => ErrorCode::ShiftNotFound,
            8102 => ErrorCode::ShiftOverlap,
            8103 => ErrorCode::ShiftInvalidRange,
            8104 => ErrorCode::ShiftAssigneeInvalid,
            8501 => ErrorCode::InventoryItemNotFound,
            8502 => ErrorCode::InventoryNameExists,
            8503 => ErrorCode::InsufficientStock,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::ReservationConflict.code(), 5002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 8503);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::OrderEmpty));
        assert_eq!(ErrorCode::try_from(8102), Ok(ErrorCode::ShiftOverlap));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(
            InvalidErrorCode(4999).to_string(),
            "invalid error code: 4999"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableNotFound).unwrap();
        assert_eq!(json, "7001");

        let code: ErrorCode = serde_json::from_str("5003").unwrap();
        assert_eq!(code, ErrorCode::NoTableAvailable);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::MenuItemNotFound.to_string(), "E6001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderEmpty.message(), "Order is empty");
        assert_eq!(
            ErrorCode::InvalidCredentials.message(),
            "Invalid username or password"
        );
    }
}
