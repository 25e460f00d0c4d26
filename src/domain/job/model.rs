use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// One submitted batch of synthesis work with a pollable lifecycle.
///
/// A job transitions at most once from `Processing` to a terminal state, and
/// only the dispatcher performs that transition. The succeeded/failed entry
/// counters make partial failure visible on the terminal record; per-entry
/// provider errors do not fail the job.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries_succeeded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries_failed: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn processing(id: Uuid) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            output_path: None,
            error: None,
            entries_succeeded: None,
            entries_failed: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobStatus::Processing
    }
}

/// Request for POST /api/jobs
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobRequest {
    /// Dialogue-script CSV export, as text
    pub script: String,
    /// Character-to-voice mapping CSV, as text
    pub voices: String,
    /// Synthesis provider credential, held only for the lifetime of the job
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
}
