//! Status enums for Crewdesk entities.
//!
//! Every enum here maps 1:1 onto a Postgres enum type of the same
//! (snake_case) name; the `postgres` feature derives the sqlx glue.
//!
//! [`RequestStatus`] additionally carries the request lifecycle as an
//! explicit transition table. Callers check transitions through
//! [`RequestStatus::can_transition_to`] instead of comparing status
//! strings at each call site.

use serde::{Deserialize, Serialize};

/// User account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "role", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Whether this role has administrative privileges.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Availability status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Available,
    Busy,
    OnLeave,
    Resigned,
}

/// Inventory item kind.
///
/// Reusable items are expected back after use and restocked on return;
/// consumable items are permanently deducted once approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "item_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Consumable,
    Reusable,
}

/// Lifecycle status of an inventory request.
///
/// ```text
/// pending ──> approved ──> pending_return ──> returned
///    │
///    └──────> rejected
/// ```
///
/// Stock is deducted when the request is created (the reservation).
/// `rejected` and `returned` are terminal: once reached, no further
/// ledger mutation may touch the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "request_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    PendingReturn,
    Returned,
}

impl RequestStatus {
    /// The full transition table for the request lifecycle.
    ///
    /// Returns `true` when moving from `self` to `next` is a legal
    /// transition. Everything not listed here is disallowed, including
    /// any move out of a terminal state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::PendingReturn)
                | (Self::PendingReturn, Self::Returned)
        )
    }

    /// Whether this status is terminal: no further ledger mutation may
    /// occur once a request reaches it.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Returned)
    }
}

/// Disposition of a borrowed item recorded at job completion.
///
/// Only `Returned` puts stock back; `Damaged` and `Lost` model real
/// loss and leave the deduction permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "return_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    Returned,
    Damaged,
    Lost,
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "job_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Category of a maintenance ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ticket_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    EquipmentFailure,
    ItSupport,
    SafetyConcern,
    Other,
}

/// Priority of a maintenance ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ticket_priority", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

/// Lifecycle status of a maintenance ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ticket_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::PendingReturn,
        RequestStatus::Returned,
    ];

    #[test]
    fn pending_branches_to_approved_or_rejected() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Returned));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::PendingReturn));
    }

    #[test]
    fn return_path_is_linear() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::PendingReturn));
        assert!(RequestStatus::PendingReturn.can_transition_to(RequestStatus::Returned));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Returned));
    }

    #[test]
    fn terminal_states_allow_no_exit() {
        for from in [RequestStatus::Rejected, RequestStatus::Returned] {
            assert!(from.is_terminal());
            for to in ALL_STATUSES {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?} must be illegal");
            }
        }
    }

    #[test]
    fn no_self_transitions() {
        for status in ALL_STATUSES {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn exactly_four_legal_transitions() {
        let mut legal = 0;
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                if from.can_transition_to(to) {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, 4);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&RequestStatus::PendingReturn).expect("serializes");
        assert_eq!(json, "\"pending_return\"");
        let json = serde_json::to_string(&TicketCategory::EquipmentFailure).expect("serializes");
        assert_eq!(json, "\"equipment_failure\"");
    }
}
