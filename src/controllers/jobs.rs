use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::job::{JobService, JobServiceApi, JobStatus, SubmitJobRequest, SubmitJobResponse},
    error::{AppError, AppResult},
};

pub struct JobsController {
    job_service: Arc<JobService>,
}

impl JobsController {
    pub fn new(job_service: Arc<JobService>) -> Self {
        Self { job_service }
    }

    /// POST /api/jobs - Submit a dialogue batch for synthesis
    ///
    /// Returns 202 with the job id; progress is visible through polling.
    pub async fn submit(
        State(controller): State<Arc<JobsController>>,
        Json(request): Json<SubmitJobRequest>,
    ) -> AppResult<(StatusCode, Json<SubmitJobResponse>)> {
        if request.script.trim().is_empty() {
            return Err(AppError::BadRequest("Script cannot be empty".to_string()));
        }
        if request.voices.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Voice mapping cannot be empty".to_string(),
            ));
        }

        let job_id = controller
            .job_service
            .submit(request)
            .await
            .map_err(AppError::from)?;

        Ok((StatusCode::ACCEPTED, Json(SubmitJobResponse { job_id })))
    }

    /// GET /api/jobs/:jobId - Poll job status
    pub async fn get_status(
        State(controller): State<Arc<JobsController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<Json<crate::domain::job::Job>> {
        match controller.job_service.get_status(job_id).await {
            Some(job) => Ok(Json(job)),
            None => Err(AppError::NotFound(format!("job {}", job_id))),
        }
    }

    /// GET /api/jobs/:jobId/download - Fetch the output archive
    pub async fn download(
        State(controller): State<Arc<JobsController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let job = controller
            .job_service
            .get_status(job_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("job {}", job_id)))?;

        match job.status {
            JobStatus::Processing => {
                return Err(AppError::Conflict("job is still processing".to_string()));
            }
            JobStatus::Failed => {
                return Err(AppError::Conflict(format!(
                    "job failed: {}",
                    job.error.as_deref().unwrap_or("unknown error")
                )));
            }
            JobStatus::Completed => {}
        }

        let output_path = job
            .output_path
            .ok_or_else(|| AppError::Internal("completed job has no output path".to_string()))?;

        let archive = tokio::fs::read(&output_path)
            .await
            .map_err(|e| AppError::Internal(format!("failed to read archive: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/zip".parse().unwrap());
        headers.insert(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.zip\"", job_id)
                .parse()
                .unwrap(),
        );

        Ok((StatusCode::OK, headers, Body::from(archive)))
    }
}
