use crate::domain::job::{Job, JobStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory job registry shared between the dispatcher (writer) and the
/// status handlers (readers).
///
/// Terminal transitions happen at most once: `complete` and `fail` are
/// no-ops on a job that already left `Processing`, so a terminal record is
/// stable forever. Records live for the process lifetime; there is no
/// eviction.
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a freshly accepted job with status `Processing`.
    pub async fn create(&self) -> Job {
        let job = Job::processing(Uuid::new_v4());
        self.jobs.write().await.insert(job.id, job.clone());
        job
    }

    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn complete(&self, id: Uuid, output_path: String, succeeded: usize, failed: usize) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Processing => {
                job.status = JobStatus::Completed;
                job.output_path = Some(output_path);
                job.entries_succeeded = Some(succeeded);
                job.entries_failed = Some(failed);
                tracing::info!(job_id = %id, succeeded, failed, "job completed");
            }
            Some(job) => {
                tracing::warn!(job_id = %id, status = ?job.status, "ignoring complete on terminal job");
            }
            None => {
                tracing::warn!(job_id = %id, "complete called for unknown job");
            }
        }
    }

    pub async fn fail(&self, id: Uuid, error: String) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Processing => {
                job.status = JobStatus::Failed;
                job.error = Some(error);
                tracing::warn!(job_id = %id, error = %job.error.as_deref().unwrap_or(""), "job failed");
            }
            Some(job) => {
                tracing::warn!(job_id = %id, status = ?job.status, "ignoring fail on terminal job");
            }
            None => {
                tracing::warn!(job_id = %id, "fail called for unknown job");
            }
        }
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
