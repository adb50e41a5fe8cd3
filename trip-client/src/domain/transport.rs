//! Transport modes between consecutive spots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TRANSPORT_MINUTES_RANGE;

/// How a traveller moves from one spot to the next, as stored on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walk,
    Train,
    Car,
    Bus,
}

impl TransportMode {
    /// Average speed used for rough duration estimates, in km/h.
    pub fn speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Walk => 4.0,
            TransportMode::Car => 40.0,
            TransportMode::Train => 30.0,
            TransportMode::Bus => 25.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walk => "walk",
            TransportMode::Train => "train",
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three choices offered by the mode selector on a transport segment.
///
/// Train and bus are both presented as public transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeChoice {
    Public,
    Car,
    Walk,
}

impl ModeChoice {
    /// Average speed used for rough duration estimates, in km/h.
    pub fn speed_kmh(&self) -> f64 {
        match self {
            ModeChoice::Public => 30.0,
            ModeChoice::Car => 40.0,
            ModeChoice::Walk => 4.0,
        }
    }

    /// Selector value for a stored mode; unset modes show as public.
    pub fn for_stored(mode: Option<TransportMode>) -> Self {
        mode.map(ModeChoice::from).unwrap_or(ModeChoice::Public)
    }

    /// The stored mode written back when a plan is saved.
    pub fn to_stored(self) -> TransportMode {
        match self {
            ModeChoice::Public => TransportMode::Train,
            ModeChoice::Car => TransportMode::Car,
            ModeChoice::Walk => TransportMode::Walk,
        }
    }

    /// Fixed overhead added on top of travel time (parking, waiting).
    fn overhead_minutes(&self) -> u32 {
        match self {
            ModeChoice::Public => 10,
            ModeChoice::Car => 5,
            ModeChoice::Walk => 0,
        }
    }

    /// Lower bound for any estimate in this mode.
    fn floor_minutes(&self) -> u32 {
        match self {
            ModeChoice::Public => 10,
            ModeChoice::Car | ModeChoice::Walk => 5,
        }
    }
}

impl fmt::Display for ModeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeChoice::Public => "public",
            ModeChoice::Car => "car",
            ModeChoice::Walk => "walk",
        })
    }
}

impl From<TransportMode> for ModeChoice {
    fn from(mode: TransportMode) -> Self {
        match mode {
            TransportMode::Walk => ModeChoice::Walk,
            TransportMode::Car => ModeChoice::Car,
            TransportMode::Train | TransportMode::Bus => ModeChoice::Public,
        }
    }
}

/// Estimate the travel time of a segment if it were made in `target` mode.
///
/// The distance is implied from the known duration and the average speed of
/// the known mode; it is never reconciled with real route geometry. Returns
/// `None` when there is no known mode/duration pair to start from. Estimates
/// are capped at the longest storable transport duration.
///
/// # Examples
///
/// ```
/// use trip_client::domain::{ModeChoice, TransportMode, estimate_transport_minutes};
///
/// // 30 minutes by car implies ~20 km, which is ~300 minutes on foot.
/// let walk = estimate_transport_minutes(Some(TransportMode::Car), Some(30), ModeChoice::Walk);
/// assert_eq!(walk, Some(300));
///
/// // Keeping the same mode keeps the known duration.
/// let car = estimate_transport_minutes(Some(TransportMode::Car), Some(30), ModeChoice::Car);
/// assert_eq!(car, Some(30));
/// ```
pub fn estimate_transport_minutes(
    base_mode: Option<TransportMode>,
    base_minutes: Option<u32>,
    target: ModeChoice,
) -> Option<u32> {
    let base_mode = base_mode?;
    let base_minutes = base_minutes?;

    if ModeChoice::from(base_mode) == target {
        return Some(base_minutes);
    }

    let distance_km = base_mode.speed_kmh() * f64::from(base_minutes) / 60.0;
    let travel = (distance_km / target.speed_kmh() * 60.0).round() as u32;

    let estimate = (travel + target.overhead_minutes()).max(target.floor_minutes());
    Some(estimate.min(*TRANSPORT_MINUTES_RANGE.end()))
}
