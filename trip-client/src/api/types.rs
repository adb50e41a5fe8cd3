//! Backend request and response DTOs.
//!
//! These types map directly to the backend's JSON. Plans, spots and folders
//! use snake_case fields; spots embedded in a plan are already in the
//! camelCase shape of [`PlanSpot`] and decode straight into it. Most fields
//! are optional because the backend omits what it has not computed.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{PlanSpot, Tag};

/// Ids arrive as strings, or as numbers from older endpoints.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "id_string")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A plan as returned by `/api/plans`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub area: Option<String>,
    pub days: Option<u32>,
    pub people: Option<u32>,
    pub budget: Option<f64>,
    pub created_at: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub spots: Vec<PlanSpot>,
    pub grounding_urls: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub folder_id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
}

/// A spot as returned by `/api/spots`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub area: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: Option<u32>,
    pub rating: Option<f64>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub tags: Option<Vec<Tag>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A folder as returned by `/api/folders`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub parent_id: Option<String>,
    pub created_at: Option<String>,
}

/// Route geometry and totals computed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteInfo {
    /// Path as `[lat, lng]` pairs.
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
    #[serde(default)]
    pub distance_meters: f64,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub source: String,
}

/// Response from `GET /api/plans/{id}/route`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRouteResponse {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub plan_id: Option<String>,
    pub day: Option<u32>,
    pub route: RouteInfo,
}

/// State of a background bulk import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the job will not change any more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Succeeded | JobStatus::Failed
        )
    }
}

/// Progress report of a bulk spot import.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkAddResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub errors: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub total_keywords: u32,
    #[serde(default)]
    pub quota_exceeded: bool,
    #[serde(default)]
    pub processed_keywords: u32,
    #[serde(default)]
    pub failed_keywords: u32,
    #[serde(default)]
    pub total_videos: u32,
    pub location_updated: Option<u32>,
    pub location_errors: Option<u32>,
    pub error: Option<String>,
    pub job_id: Option<String>,
    pub job_status: Option<JobStatus>,
}

impl BulkAddResponse {
    /// Whether polling can stop.
    ///
    /// A report with neither job id nor status comes from a synchronous
    /// import and is final. A job report without a status is still running.
    pub fn is_finished(&self) -> bool {
        match self.job_status {
            Some(status) => status.is_terminal(),
            None => self.job_id.is_none(),
        }
    }
}

/// Body of `PUT /api/plans/{id}` replacing the spot list.
#[derive(Debug, Serialize)]
pub struct UpdateSpotsRequest<'a> {
    pub spots: &'a [PlanSpot],
}

/// Body of `PUT /api/plans/{id}` moving a plan between folders.
///
/// `None` serializes as `null`, which removes the plan from its folder.
#[derive(Debug, Serialize)]
pub struct MoveToFolderRequest<'a> {
    pub folder_id: Option<&'a str>,
}

/// Body of `PUT /api/plans/{id}` changing the lodging dates.
///
/// Unset dates are left out of the body.
#[derive(Debug, Serialize)]
pub struct UpdateDatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<NaiveDate>,
}

/// Body of `POST /api/folders`.
#[derive(Debug, Serialize)]
pub struct CreateFolderRequest<'a> {
    pub name: &'a str,
    pub parent_id: Option<&'a str>,
}
