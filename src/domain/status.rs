//! Rental and item status machinery
//!
//! The single authority for which transitions are legal, who may request
//! them, and which item-status write is paired with each rental-status
//! write. HTTP handlers and services must go through this table instead of
//! re-checking ownership inline per route.

use super::errors::RentalError;

/// Availability status of a listed item.
/// Valid values:
/// - `available`: listed, can be requested
/// - `pending`: a rental request is awaiting the owner's decision
/// - `rented`: a confirmed rental is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Available,
    Pending,
    Rented,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Pending => "pending",
            ItemStatus::Rented => "rented",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ItemStatus::Available),
            "pending" => Some(ItemStatus::Pending),
            "rented" => Some(ItemStatus::Rented),
            _ => None,
        }
    }
}

/// Lifecycle status of a rental.
/// `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
}

impl RentalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Rejected => "rejected",
            RentalStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RentalStatus::Pending),
            "confirmed" => Some(RentalStatus::Confirmed),
            "rejected" => Some(RentalStatus::Rejected),
            "completed" => Some(RentalStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RentalStatus::Rejected | RentalStatus::Completed)
    }
}

/// A requested transition on an existing rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalEvent {
    Accept,
    Reject,
    Complete,
}

impl RentalEvent {
    /// Whether `actor_id` may request this event on a rental owned by
    /// `owner_id` and rented by `renter_id`. Accept and reject belong to the
    /// owner; complete may come from either party.
    pub fn permits(self, actor_id: i32, owner_id: i32, renter_id: i32) -> bool {
        match self {
            RentalEvent::Accept | RentalEvent::Reject => actor_id == owner_id,
            RentalEvent::Complete => actor_id == owner_id || actor_id == renter_id,
        }
    }

    /// The transition table: target rental status and paired item status for
    /// this event from the given state, or `None` when the transition is not
    /// legal.
    pub fn apply(self, from: RentalStatus) -> Option<(RentalStatus, ItemStatus)> {
        match (self, from) {
            (RentalEvent::Accept, RentalStatus::Pending) => {
                Some((RentalStatus::Confirmed, ItemStatus::Rented))
            }
            (RentalEvent::Reject, RentalStatus::Pending) => {
                Some((RentalStatus::Rejected, ItemStatus::Available))
            }
            (RentalEvent::Complete, RentalStatus::Confirmed) => {
                Some((RentalStatus::Completed, ItemStatus::Available))
            }
            _ => None,
        }
    }

    /// Full check for a requested transition: actor rule first, so an
    /// outsider is rejected with `NotAuthorized` regardless of the rental's
    /// current status, then the transition table.
    pub fn check(
        self,
        from: RentalStatus,
        actor_id: i32,
        owner_id: i32,
        renter_id: i32,
    ) -> Result<(RentalStatus, ItemStatus), RentalError> {
        if !self.permits(actor_id, owner_id, renter_id) {
            return Err(RentalError::NotAuthorized);
        }
        self.apply(from).ok_or(RentalError::InvalidTransition)
    }
}
