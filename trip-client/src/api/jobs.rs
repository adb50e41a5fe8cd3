//! Bulk import job status.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use crate::tasks::{PollStep, TaskHandle, poll_until};

use super::client::ApiClient;
use super::error::ApiError;
use super::types::BulkAddResponse;

impl ApiClient {
    /// Current progress of a bulk spot import.
    pub async fn bulk_job_status(&self, job_id: &str) -> Result<BulkAddResponse, ApiError> {
        let path = format!("/api/spots/bulk-add-jobs/{}", urlencoding::encode(job_id));
        self.get(&path, &[]).await
    }

    /// Poll a bulk import job until it finishes.
    ///
    /// `on_progress` sees every report, including the final one. Network
    /// and backend errors are logged and polling continues; an expired
    /// session or an unknown job ends polling with the error. Dropping the
    /// handle stops polling.
    pub fn watch_bulk_job<F>(
        &self,
        job_id: impl Into<String>,
        interval: Duration,
        on_progress: F,
    ) -> TaskHandle<Result<BulkAddResponse, ApiError>>
    where
        F: FnMut(&BulkAddResponse) + Send + 'static,
    {
        let client = self.clone();
        let job_id: Arc<str> = job_id.into().into();
        let on_progress = Arc::new(Mutex::new(on_progress));

        poll_until(interval, move || {
            let client = client.clone();
            let job_id = job_id.clone();
            let on_progress = on_progress.clone();

            async move {
                let report = match client.bulk_job_status(&job_id).await {
                    Ok(report) => report,
                    Err(e @ (ApiError::Unauthorized | ApiError::Backend { status: 404, .. })) => {
                        warn!(job = %job_id, error = %e, "stopped watching job");
                        return PollStep::Done(Err(e));
                    }
                    Err(e) => {
                        warn!(job = %job_id, error = %e, "job status check failed, will retry");
                        return PollStep::Pending;
                    }
                };

                if let Ok(mut callback) = on_progress.lock() {
                    callback(&report);
                }

                if report.is_finished() {
                    info!(
                        job = %job_id,
                        status = ?report.job_status,
                        imported = report.imported,
                        errors = report.errors,
                        "bulk import finished"
                    );
                    PollStep::Done(Ok(report))
                } else {
                    PollStep::Pending
                }
            }
        })
    }
}
