//! Spot categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown spot category: {0}")]
pub struct InvalidCategory(pub String);

/// The category of a spot.
///
/// The order of [`SpotCategory::ALL`] is the display order used across
/// listings and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotCategory {
    History,
    Nature,
    Food,
    Culture,
    Shopping,
    Art,
    Relax,
    Tourism,
    Experience,
    Event,
    HotSpring,
    ScenicView,
    Cafe,
    Hotel,
    Drink,
    Fashion,
    Date,
    Drive,
}

impl SpotCategory {
    /// All categories in display order.
    pub const ALL: [SpotCategory; 18] = [
        SpotCategory::History,
        SpotCategory::Nature,
        SpotCategory::Food,
        SpotCategory::Culture,
        SpotCategory::Shopping,
        SpotCategory::Art,
        SpotCategory::Relax,
        SpotCategory::Tourism,
        SpotCategory::Experience,
        SpotCategory::Event,
        SpotCategory::HotSpring,
        SpotCategory::ScenicView,
        SpotCategory::Cafe,
        SpotCategory::Hotel,
        SpotCategory::Drink,
        SpotCategory::Fashion,
        SpotCategory::Date,
        SpotCategory::Drive,
    ];

    /// Category assumed when the backend omits one.
    pub const FALLBACK: SpotCategory = SpotCategory::Culture;

    /// The wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotCategory::History => "History",
            SpotCategory::Nature => "Nature",
            SpotCategory::Food => "Food",
            SpotCategory::Culture => "Culture",
            SpotCategory::Shopping => "Shopping",
            SpotCategory::Art => "Art",
            SpotCategory::Relax => "Relax",
            SpotCategory::Tourism => "Tourism",
            SpotCategory::Experience => "Experience",
            SpotCategory::Event => "Event",
            SpotCategory::HotSpring => "HotSpring",
            SpotCategory::ScenicView => "ScenicView",
            SpotCategory::Cafe => "Cafe",
            SpotCategory::Hotel => "Hotel",
            SpotCategory::Drink => "Drink",
            SpotCategory::Fashion => "Fashion",
            SpotCategory::Date => "Date",
            SpotCategory::Drive => "Drive",
        }
    }

    /// Whether a visit to this category lasts overnight.
    ///
    /// Lodging ends "the next day" rather than at a clock time.
    pub fn is_lodging(&self) -> bool {
        matches!(self, SpotCategory::Hotel)
    }
}

impl FromStr for SpotCategory {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpotCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
