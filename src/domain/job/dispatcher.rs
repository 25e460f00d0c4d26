use crate::domain::dialogue::VoiceBoundEntry;
use crate::infrastructure::archive::archive_directory;
use crate::infrastructure::repositories::{JobStore, SynthesisRepository};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Fans out synthesis calls for one job and owns its terminal transition.
///
/// The credential is verified before any dispatch; that is the only failure
/// that fails the whole job. Per-entry provider errors are logged, counted
/// on the job record and otherwise swallowed; sibling tasks keep running.
pub struct SynthesisDispatcher {
    store: Arc<JobStore>,
    synthesis: Arc<dyn SynthesisRepository>,
    max_concurrent: usize,
    output_format: String,
}

impl SynthesisDispatcher {
    pub fn new(
        store: Arc<JobStore>,
        synthesis: Arc<dyn SynthesisRepository>,
        max_concurrent: usize,
        output_format: String,
    ) -> Self {
        Self {
            store,
            synthesis,
            max_concurrent: max_concurrent.max(1),
            output_format,
        }
    }

    /// Run one job to its terminal state. Spawned by the job service; the
    /// submitter never waits on this.
    pub async fn run(
        self: Arc<Self>,
        job_id: Uuid,
        entries: Vec<VoiceBoundEntry>,
        api_key: String,
        job_root: PathBuf,
    ) {
        if let Err(err) = self.synthesis.verify_credentials(&api_key).await {
            self.store.fail(job_id, err).await;
            return;
        }

        tracing::info!(
            job_id = %job_id,
            entries = entries.len(),
            max_concurrent = self.max_concurrent,
            "dispatching synthesis tasks"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<bool> = JoinSet::new();

        for entry in entries {
            let semaphore = semaphore.clone();
            let dispatcher = self.clone();
            let api_key = api_key.clone();
            let job_root = job_root.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return false;
                };
                dispatcher.synthesize_entry(&entry, &api_key, &job_root).await
            });
        }

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(true) => succeeded += 1,
                Ok(false) => failed += 1,
                Err(err) => {
                    tracing::error!(job_id = %job_id, error = %err, "synthesis task panicked");
                    failed += 1;
                }
            }
        }

        // All tasks have finished; package the tree and finalize the job
        let archive_path = job_root.with_extension("zip");
        if let Err(err) = tokio::fs::create_dir_all(&job_root).await {
            self.store
                .fail(job_id, format!("failed to create output root: {}", err))
                .await;
            return;
        }

        let root = job_root.clone();
        let destination = archive_path.clone();
        let archived =
            tokio::task::spawn_blocking(move || archive_directory(&root, &destination)).await;

        match archived {
            Ok(Ok(())) => {
                self.store
                    .complete(
                        job_id,
                        archive_path.to_string_lossy().into_owned(),
                        succeeded,
                        failed,
                    )
                    .await;
            }
            Ok(Err(err)) => {
                self.store
                    .fail(job_id, format!("failed to write archive: {}", err))
                    .await;
            }
            Err(err) => {
                self.store
                    .fail(job_id, format!("archive task failed: {}", err))
                    .await;
            }
        }
    }

    /// Synthesize one entry and write its audio file. Side effects are
    /// isolated to the entry's own output path; returns whether the file was
    /// written.
    async fn synthesize_entry(
        &self,
        entry: &VoiceBoundEntry,
        api_key: &str,
        job_root: &Path,
    ) -> bool {
        let Some(text) = entry.entity.clean_text() else {
            tracing::warn!(tag = %entry.entity.tag, "entry dispatched without clean text");
            return false;
        };

        let audio = match self
            .synthesis
            .synthesize(text, &entry.voice_id, api_key)
            .await
        {
            Ok(audio) => audio,
            Err(err) => {
                tracing::warn!(
                    tag = %entry.entity.tag,
                    voice_id = %entry.voice_id,
                    error = %err,
                    "entry synthesis failed"
                );
                return false;
            }
        };

        let folder = job_root.join(&entry.folder_key);
        if let Err(err) = tokio::fs::create_dir_all(&folder).await {
            tracing::error!(folder = %folder.display(), error = %err, "failed to create output folder");
            return false;
        }

        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let file_name = format!("{}_{}.{}", entry.entity.tag, timestamp, self.output_format);
        let path = folder.join(file_name);

        match tokio::fs::write(&path, &audio).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = audio.len(), "audio file written");
                true
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to write audio file");
                false
            }
        }
    }
}
