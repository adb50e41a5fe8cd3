//! Domain error types.
//!
//! These errors represent validation failures caught on the client before
//! anything is sent to the backend. They are distinct from API/IO errors.

use super::PlanSpotId;

/// Domain-level errors for validation and edit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Stay duration outside the accepted range
    #[error("stay duration must be 5-480 minutes (got {0})")]
    StayOutOfRange(u32),

    /// Transport duration outside the accepted range
    #[error("transport duration must be 0-300 minutes (got {0})")]
    TransportOutOfRange(u32),

    /// Position does not exist in the day's list
    #[error("position {index} is out of bounds for a day with {len} spots")]
    IndexOutOfRange { index: usize, len: usize },

    /// No spot with this id in the working copy
    #[error("no spot {0} in this plan")]
    UnknownPlanSpot(PlanSpotId),

    /// Day number outside 1..=days
    #[error("day {day} is outside the plan's {days} days")]
    InvalidDay { day: u32, days: u32 },

    /// Check-out is not after check-in
    #[error("check-out date must be after check-in date")]
    InvalidStayDates,

    /// A required text field is empty
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Operation requires edit mode
    #[error("plan is not being edited")]
    NotEditing,
}
