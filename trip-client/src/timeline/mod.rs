//! Itinerary timeline.
//!
//! Keeps the displayed start and end times of each day consistent with an
//! editable, ordered list of spots. The first spot of a day starts at the
//! day anchor and every later spot starts when the previous one ends plus
//! the travel time between them.

mod day;
mod edit;

pub use day::{
    DayTimeline, EndTime, LODGING_NOTE, TimelineEntry, TransportSegment, merge_day, split_day,
};
pub use edit::{EditSession, Mode, PlanStore, WorkingCopy};
