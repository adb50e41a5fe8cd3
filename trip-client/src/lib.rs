//! Trip planner client core.
//!
//! Keeps a plan's day-by-day timeline consistent while it is edited,
//! derives the map overlay for it, and talks to the trip-planner backend.

pub mod api;
pub mod config;
pub mod domain;
pub mod map;
pub mod session;
pub mod tasks;
pub mod timeline;
