//! Client for the trip-planner REST backend.
//!
//! All requests carry a JSON content type and, when the session holds one,
//! a bearer token. A 401 response clears the session. Responses are turned
//! into domain types at this boundary.

mod client;
mod convert;
mod error;
mod folders;
mod jobs;
mod plans;
mod spots;
mod types;

#[cfg(test)]
mod client_tests;

pub use client::ApiClient;
pub use convert::{convert_folder, convert_plan, convert_spot, parse_date, parse_timestamp};
pub use error::{ApiError, ErrorKind};
pub use spots::{SearchState, SpotQuery, SpotSearch};
pub use types::{
    BulkAddResponse, FolderDto, JobStatus, PlanDto, PlanRouteResponse, RouteInfo, SpotDto,
};
