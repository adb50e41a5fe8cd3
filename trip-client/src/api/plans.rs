//! Plan endpoints.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{FolderId, Plan, PlanId, PlanSpot, validate_stay_dates};
use crate::timeline::PlanStore;

use super::client::ApiClient;
use super::convert::convert_plan;
use super::error::ApiError;
use super::types::{
    MoveToFolderRequest, PlanDto, PlanRouteResponse, UpdateDatesRequest, UpdateSpotsRequest,
};

fn plan_path(id: &PlanId) -> String {
    format!("/api/plans/{}", urlencoding::encode(id.as_str()))
}

impl ApiClient {
    /// List the user's plans.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, ApiError> {
        let plans: Vec<PlanDto> = self.get("/api/plans", &[]).await?;
        Ok(plans.into_iter().map(convert_plan).collect())
    }

    pub async fn get_plan(&self, id: &PlanId) -> Result<Plan, ApiError> {
        let plan: PlanDto = self.get(&plan_path(id), &[]).await?;
        Ok(convert_plan(plan))
    }

    /// Replace all spots of a plan in one call.
    pub async fn update_plan_spots(
        &self,
        id: &PlanId,
        spots: &[PlanSpot],
    ) -> Result<Plan, ApiError> {
        let plan: PlanDto = self
            .put(&plan_path(id), &UpdateSpotsRequest { spots })
            .await?;
        info!(plan = %id, spots = spots.len(), "updated plan spots");
        Ok(convert_plan(plan))
    }

    /// Move a plan into a folder, or out of any folder with `None`.
    pub async fn move_plan_to_folder(
        &self,
        id: &PlanId,
        folder: Option<&FolderId>,
    ) -> Result<Plan, ApiError> {
        let body = MoveToFolderRequest {
            folder_id: folder.map(FolderId::as_str),
        };
        let plan: PlanDto = self.put(&plan_path(id), &body).await?;
        Ok(convert_plan(plan))
    }

    /// Set or clear the lodging dates of a plan.
    ///
    /// A check-out that is not after check-in is rejected without
    /// contacting the backend. Unset dates are not sent.
    pub async fn update_plan_dates(
        &self,
        id: &PlanId,
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
    ) -> Result<Plan, ApiError> {
        validate_stay_dates(check_in, check_out)?;
        let body = UpdateDatesRequest {
            check_in_date: check_in,
            check_out_date: check_out,
        };
        let plan: PlanDto = self.put(&plan_path(id), &body).await?;
        info!(plan = %id, ?check_in, ?check_out, "updated stay dates");
        Ok(convert_plan(plan))
    }

    /// Route computed by the backend for one day of a plan.
    pub async fn plan_route(&self, id: &PlanId, day: u32) -> Result<PlanRouteResponse, ApiError> {
        self.get(
            &format!("{}/route", plan_path(id)),
            &[("day", day.to_string())],
        )
        .await
    }
}

impl PlanStore for ApiClient {
    async fn save_spots(&self, plan_id: &PlanId, spots: &[PlanSpot]) -> Result<Plan, ApiError> {
        self.update_plan_spots(plan_id, spots).await
    }
}
