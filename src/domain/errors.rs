//! Rental domain error types
//!
//! These errors are framework-agnostic and represent business-level failures
//! of the rental lifecycle. All of them are recoverable, caller-facing
//! rejections; persistence failures pass through as `Database`.

use std::fmt;

#[derive(Debug)]
pub enum RentalError {
    /// Create attempted against a missing or non-available item
    ItemUnavailable,
    /// Requester is the item's owner
    SelfRentalForbidden,
    /// End date precedes start date, or computed days < 1
    InvalidDateRange,
    /// Referenced rental id does not exist
    RentalNotFound,
    /// Actor is not permitted to perform the requested transition
    NotAuthorized,
    /// Requested transition is not legal from the rental's current status
    InvalidTransition,
    /// Database/persistence error, passed through unchanged
    Database(String),
}

impl fmt::Display for RentalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentalError::ItemUnavailable => write!(f, "Item not found or not available"),
            RentalError::SelfRentalForbidden => write!(f, "You cannot rent your own item"),
            RentalError::InvalidDateRange => write!(f, "Invalid date range"),
            RentalError::RentalNotFound => write!(f, "Rental not found"),
            RentalError::NotAuthorized => write!(f, "Not authorized"),
            RentalError::InvalidTransition => {
                write!(f, "Rental status does not allow this action")
            }
            RentalError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for RentalError {}

impl From<sea_orm::DbErr> for RentalError {
    fn from(e: sea_orm::DbErr) -> Self {
        RentalError::Database(e.to_string())
    }
}
