//! Conversion from backend DTOs to domain types.
//!
//! The backend leaves many fields empty; missing values are filled with the
//! same defaults everywhere so rendering never has to check again.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::domain::{
    DEFAULT_STAY_MINUTES, FolderId, GeoPoint, Plan, PlanFolder, PlanId, Spot, SpotCategory, SpotId,
};

use super::types::{FolderDto, PlanDto, SpotDto};

/// Convert a plan response.
pub fn convert_plan(dto: PlanDto) -> Plan {
    let days = dto
        .days
        .filter(|d| *d > 0)
        .or_else(|| dto.spots.iter().map(|s| s.day).max())
        .unwrap_or(1);

    Plan {
        id: PlanId::new(dto.id),
        title: dto.title,
        area: dto.area.unwrap_or_default(),
        days,
        people: dto.people.filter(|p| *p > 0).unwrap_or(2),
        budget: dto.budget.unwrap_or(0.0),
        created_at: dto.created_at.as_deref().and_then(parse_timestamp),
        thumbnail: dto.thumbnail.unwrap_or_default(),
        spots: dto.spots,
        grounding_urls: dto.grounding_urls.unwrap_or_default(),
        is_favorite: dto.is_favorite.unwrap_or(false),
        folder_id: dto.folder_id.filter(|id| !id.is_empty()).map(FolderId::new),
        check_in_date: dto.check_in_date.as_deref().and_then(parse_date),
        check_out_date: dto.check_out_date.as_deref().and_then(parse_date),
    }
}

/// Convert a catalogue spot response.
pub fn convert_spot(dto: SpotDto) -> Spot {
    let category = match dto.category.as_deref() {
        None | Some("") => SpotCategory::FALLBACK,
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(spot = %dto.id, category = name, "unknown spot category, using fallback");
            SpotCategory::FALLBACK
        }),
    };

    let location = match (dto.latitude, dto.longitude) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };

    Spot {
        id: SpotId::new(dto.id),
        name: dto.name,
        description: dto.description.unwrap_or_default(),
        area: dto.area.unwrap_or_default(),
        category,
        duration_minutes: dto
            .duration_minutes
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_STAY_MINUTES),
        rating: dto.rating.unwrap_or(0.0),
        image: dto.image.unwrap_or_default(),
        price: dto.price,
        location,
        tags: dto.tags.unwrap_or_default(),
    }
}

/// Convert a folder response.
pub fn convert_folder(dto: FolderDto) -> PlanFolder {
    PlanFolder {
        id: FolderId::new(dto.id),
        name: dto.name,
        parent_id: dto.parent_id.filter(|id| !id.is_empty()).map(FolderId::new),
        created_at: dto.created_at.as_deref().and_then(parse_timestamp),
    }
}

/// Parse a backend timestamp, with or without offset and fractional seconds.
///
/// Timestamps with an offset are converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    warn!(timestamp = s, "ignoring unreadable timestamp");
    None
}

/// Parse a `YYYY-MM-DD` date; blank or malformed dates are unset.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .inspect_err(|e| warn!(date = s, error = %e, "ignoring unreadable date"))
        .ok()
}
