//! Domain types for the trip planner.
//!
//! This module contains the itinerary model: spots, the plans they are
//! scheduled in, and the folders plans are grouped into. Value types
//! enforce their invariants at construction time.

mod category;
mod error;
mod folder;
mod id;
mod plan;
mod spot;
mod tag;
mod time;
mod transport;

pub use category::{InvalidCategory, SpotCategory};
pub use error::DomainError;
pub use folder::{FolderNode, PlanFolder, build_folder_tree, plans_in_folder, validate_folder_name};
pub use id::{FolderId, PlanId, PlanSpotId, SpotId};
pub use plan::{
    Plan, PlanSpot, STAY_MINUTES_RANGE, TRANSPORT_MINUTES_RANGE, validate_stay, validate_stay_dates,
    validate_transport,
};
pub use spot::{DEFAULT_STAY_MINUTES, GeoPoint, Spot};
pub use tag::Tag;
pub use time::{ClockTime, MINUTES_PER_DAY, TimeError};
pub use transport::{ModeChoice, TransportMode, estimate_transport_minutes};
