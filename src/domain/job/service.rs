use super::dispatcher::SynthesisDispatcher;
use super::error::JobServiceError;
use super::model::{Job, SubmitJobRequest};
use crate::domain::dialogue::{bind_voices, load_bindings, parse_script, Normalizer};
use crate::infrastructure::config::ScriptConfig;
use crate::infrastructure::repositories::JobStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct JobService {
    store: Arc<JobStore>,
    dispatcher: Arc<SynthesisDispatcher>,
    normalizer: Arc<Normalizer>,
    script_config: ScriptConfig,
    fan_out_role: String,
    shared_folder: String,
    output_dir: PathBuf,
}

impl JobService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<JobStore>,
        dispatcher: Arc<SynthesisDispatcher>,
        normalizer: Arc<Normalizer>,
        script_config: ScriptConfig,
        fan_out_role: String,
        shared_folder: String,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            dispatcher,
            normalizer,
            script_config,
            fan_out_role,
            shared_folder,
            output_dir,
        }
    }
}

#[async_trait]
pub trait JobServiceApi: Send + Sync {
    /// Accept a batch of dialogue for synthesis.
    ///
    /// This operation:
    /// - Parses the script and voice mapping (fatal errors surface here,
    ///   synchronously, before any job exists)
    /// - Normalizes dialogue text and binds entities to voices
    /// - Registers the job and spawns the dispatcher
    ///
    /// Returns the job id immediately; everything after parsing is visible
    /// only through status polling.
    async fn submit(&self, request: SubmitJobRequest) -> Result<Uuid, JobServiceError>;

    /// Look up the current job record, if the id is known.
    async fn get_status(&self, job_id: Uuid) -> Option<Job>;
}

#[async_trait]
impl JobServiceApi for JobService {
    async fn submit(&self, request: SubmitJobRequest) -> Result<Uuid, JobServiceError> {
        if request.api_key.trim().is_empty() {
            return Err(JobServiceError::Invalid(
                "API key cannot be empty".to_string(),
            ));
        }

        // 1. Parse the script; fatal parse errors propagate to the submitter
        let mut entities = parse_script(&request.script, &self.script_config)?;

        // 2. Load the character-to-voice mapping snapshot
        let bindings = load_bindings(&request.voices, &self.fan_out_role)?;
        if bindings.is_empty() {
            return Err(JobServiceError::Invalid(
                "voice mapping contains no usable bindings".to_string(),
            ));
        }

        // 3. Normalize each entity's text, exactly once
        for entity in &mut entities {
            let clean = self.normalizer.normalize(&entity.raw_text);
            entity.set_clean_text(clean);
        }

        // 4. Bind voices; unresolved entities are inspectable, not dropped
        let total_entities = entities.len();
        let outcome = bind_voices(
            entities,
            &bindings,
            &self.fan_out_role,
            &self.shared_folder,
        );
        if !outcome.unresolved.is_empty() {
            tracing::warn!(
                unresolved = outcome.unresolved.len(),
                roles = ?outcome
                    .unresolved
                    .iter()
                    .map(|e| e.role_name.as_str())
                    .collect::<Vec<_>>(),
                "entities without voice bindings will not be synthesized"
            );
        }

        // 5. Exclude entries with nothing to synthesize
        let dispatchable: Vec<_> = outcome
            .bound
            .into_iter()
            .filter(|entry| {
                if !entry.entity.has_synthesizable_text() {
                    tracing::warn!(tag = %entry.entity.tag, "entry empty after normalization, excluded");
                    return false;
                }
                if entry.voice_id.is_empty() {
                    tracing::warn!(tag = %entry.entity.tag, "entry has no voice id, excluded");
                    return false;
                }
                true
            })
            .collect();

        // 6. Register the job and hand off to the dispatcher
        let job = self.store.create().await;
        let job_root = self.output_dir.join(job.id.to_string());

        tracing::info!(
            job_id = %job.id,
            entities = total_entities,
            dispatchable = dispatchable.len(),
            unresolved = outcome.unresolved.len(),
            "job accepted"
        );

        tokio::spawn(self.dispatcher.clone().run(
            job.id,
            dispatchable,
            request.api_key,
            job_root,
        ));

        Ok(job.id)
    }

    async fn get_status(&self, job_id: Uuid) -> Option<Job> {
        self.store.get(job_id).await
    }
}
