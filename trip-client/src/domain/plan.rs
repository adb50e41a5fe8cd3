//! Plans and the spots scheduled within them.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{
    ClockTime, DomainError, FolderId, ModeChoice, PlanId, PlanSpotId, Spot, SpotId, TransportMode,
};

/// Accepted stay durations, in minutes.
pub const STAY_MINUTES_RANGE: RangeInclusive<u32> = 5..=480;

/// Accepted transport durations, in minutes.
pub const TRANSPORT_MINUTES_RANGE: RangeInclusive<u32> = 0..=300;

/// Reject stay durations the backend would refuse.
pub fn validate_stay(minutes: u32) -> Result<u32, DomainError> {
    if STAY_MINUTES_RANGE.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(DomainError::StayOutOfRange(minutes))
    }
}

/// Reject transport durations the backend would refuse.
pub fn validate_transport(minutes: u32) -> Result<u32, DomainError> {
    if TRANSPORT_MINUTES_RANGE.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(DomainError::TransportOutOfRange(minutes))
    }
}

/// Reject a check-out that is not after check-in. Either date may be unset.
pub fn validate_stay_dates(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
) -> Result<(), DomainError> {
    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) if check_out <= check_in => {
            Err(DomainError::InvalidStayDates)
        }
        _ => Ok(()),
    }
}

/// One scheduled visit to a spot within a plan.
///
/// `transport_duration` describes travel from this spot to the next spot
/// of the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpot {
    pub id: PlanSpotId,
    #[serde(alias = "spot_id")]
    pub spot_id: SpotId,
    pub spot: Spot,
    pub day: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "start_time",
        deserialize_with = "lenient_time"
    )]
    pub start_time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "transport_mode")]
    pub transport_mode: Option<TransportMode>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "transport_duration"
    )]
    pub transport_duration: Option<u32>,
    #[serde(default, alias = "is_must_visit", deserialize_with = "null_as_false")]
    pub is_must_visit: bool,
}

impl PlanSpot {
    /// Schedule `spot` on `day` with no time or transport set.
    pub fn new(id: impl Into<String>, spot: Spot, day: u32) -> Self {
        Self {
            id: PlanSpotId::new(id),
            spot_id: spot.id.clone(),
            spot,
            day,
            start_time: None,
            note: None,
            transport_mode: None,
            transport_duration: None,
            is_must_visit: false,
        }
    }

    pub fn with_start(mut self, start: ClockTime) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn with_transport(mut self, mode: TransportMode, minutes: u32) -> Self {
        self.transport_mode = Some(mode);
        self.transport_duration = Some(minutes);
        self
    }

    /// How long the visit lasts, in minutes.
    pub fn stay_minutes(&self) -> u32 {
        self.spot.duration_minutes
    }

    pub fn is_lodging(&self) -> bool {
        self.spot.is_lodging()
    }

    /// Mode selector value for the segment leaving this spot.
    pub fn mode_choice(&self) -> ModeChoice {
        ModeChoice::for_stored(self.transport_mode)
    }
}

/// Start times the backend left blank or malformed decode as unset.
fn lenient_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ClockTime>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match ClockTime::parse_hhmm(&s) {
        Ok(time) => Some(time),
        Err(e) => {
            if !s.is_empty() {
                warn!(start_time = %s, error = %e, "ignoring unreadable start time");
            }
            None
        }
    }))
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A multi-day itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: PlanId,
    pub title: String,
    pub area: String,
    pub days: u32,
    pub people: u32,
    pub budget: f64,
    pub created_at: Option<NaiveDateTime>,
    pub thumbnail: String,
    pub spots: Vec<PlanSpot>,
    pub grounding_urls: Vec<String>,
    pub is_favorite: bool,
    pub folder_id: Option<FolderId>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
}

impl Plan {
    /// Create an empty plan.
    pub fn new(id: impl Into<String>, title: impl Into<String>, days: u32) -> Self {
        Self {
            id: PlanId::new(id),
            title: title.into(),
            area: String::new(),
            days,
            people: 2,
            budget: 0.0,
            created_at: None,
            thumbnail: String::new(),
            spots: Vec::new(),
            grounding_urls: Vec::new(),
            is_favorite: false,
            folder_id: None,
            check_in_date: None,
            check_out_date: None,
        }
    }

    /// Spots of one day, in stored order.
    pub fn spots_for_day(&self, day: u32) -> impl Iterator<Item = &PlanSpot> {
        self.spots.iter().filter(move |s| s.day == day)
    }

    /// Day numbers that have at least one spot, ascending.
    pub fn scheduled_days(&self) -> Vec<u32> {
        self.spots
            .iter()
            .map(|s| s.day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Check that `day` is within the plan.
    pub fn check_day(&self, day: u32) -> Result<(), DomainError> {
        if day >= 1 && day <= self.days {
            Ok(())
        } else {
            Err(DomainError::InvalidDay {
                day,
                days: self.days,
            })
        }
    }

    /// Check the lodging dates, if both are set.
    pub fn validate_stay_dates(&self) -> Result<(), DomainError> {
        validate_stay_dates(self.check_in_date, self.check_out_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpotCategory;

    fn spot(id: &str) -> Spot {
        Spot::new(id, id.to_uppercase(), SpotCategory::Food)
    }

    #[test]
    fn validation_limits() {
        assert_eq!(validate_stay(5), Ok(5));
        assert_eq!(validate_stay(480), Ok(480));
        assert_eq!(validate_stay(4), Err(DomainError::StayOutOfRange(4)));
        assert_eq!(validate_stay(481), Err(DomainError::StayOutOfRange(481)));

        assert_eq!(validate_transport(0), Ok(0));
        assert_eq!(validate_transport(300), Ok(300));
        assert_eq!(
            validate_transport(301),
            Err(DomainError::TransportOutOfRange(301))
        );
    }

    #[test]
    fn plan_spot_json_roundtrip_fields() {
        let json = r#"{
            "id": "ps1", "spotId": "s1", "day": 2, "startTime": "10:20",
            "transportMode": "car", "transportDuration": 15, "isMustVisit": true,
            "spot": {"id": "s1", "name": "Tower", "durationMinutes": 90}
        }"#;
        let ps: PlanSpot = serde_json::from_str(json).unwrap();

        assert_eq!(ps.day, 2);
        assert_eq!(ps.start_time, Some(ClockTime::parse_hhmm("10:20").unwrap()));
        assert_eq!(ps.transport_mode, Some(TransportMode::Car));
        assert_eq!(ps.transport_duration, Some(15));
        assert!(ps.is_must_visit);
        assert_eq!(ps.stay_minutes(), 90);

        let out = serde_json::to_value(&ps).unwrap();
        assert_eq!(out["spotId"], "s1");
        assert_eq!(out["startTime"], "10:20");
        assert_eq!(out["transportDuration"], 15);
    }

    #[test]
    fn plan_spot_accepts_snake_case() {
        let json = r#"{
            "id": "ps1", "spot_id": "s1", "day": 1, "start_time": "09:00",
            "spot": {"id": "s1", "name": "Tower"}
        }"#;
        let ps: PlanSpot = serde_json::from_str(json).unwrap();
        assert_eq!(ps.spot_id.as_str(), "s1");
        assert!(!ps.is_must_visit);
        assert_eq!(ps.mode_choice(), ModeChoice::Public);
    }

    #[test]
    fn blank_start_time_is_unset() {
        let json = r#"{"id": "ps1", "spotId": "s1", "day": 1, "startTime": "",
            "spot": {"id": "s1", "name": "Tower"}}"#;
        let ps: PlanSpot = serde_json::from_str(json).unwrap();
        assert_eq!(ps.start_time, None);
    }

    #[test]
    fn spots_grouped_by_day() {
        let mut plan = Plan::new("p1", "Kyoto", 3);
        plan.spots = vec![
            PlanSpot::new("a", spot("a"), 1),
            PlanSpot::new("b", spot("b"), 3),
            PlanSpot::new("c", spot("c"), 1),
        ];

        let day1: Vec<_> = plan.spots_for_day(1).map(|s| s.id.as_str()).collect();
        assert_eq!(day1, vec!["a", "c"]);
        assert_eq!(plan.scheduled_days(), vec![1, 3]);
    }

    #[test]
    fn day_bounds() {
        let plan = Plan::new("p1", "Kyoto", 2);
        assert!(plan.check_day(1).is_ok());
        assert!(plan.check_day(2).is_ok());
        assert_eq!(
            plan.check_day(0),
            Err(DomainError::InvalidDay { day: 0, days: 2 })
        );
        assert!(plan.check_day(3).is_err());
    }

    #[test]
    fn stay_dates_must_be_ordered() {
        let mut plan = Plan::new("p1", "Kyoto", 2);
        plan.check_in_date = NaiveDate::from_ymd_opt(2026, 5, 2);
        plan.check_out_date = NaiveDate::from_ymd_opt(2026, 5, 2);
        assert_eq!(plan.validate_stay_dates(), Err(DomainError::InvalidStayDates));

        plan.check_out_date = NaiveDate::from_ymd_opt(2026, 5, 4);
        assert!(plan.validate_stay_dates().is_ok());
    }
}
