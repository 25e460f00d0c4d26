use super::synthesis_repository::SynthesisRepository;
use async_trait::async_trait;
use serde_json::json;

/// ElevenLabs implementation of the synthesis repository.
///
/// One request per dialogue line; the provider returns the full audio body
/// on success or a machine-readable error status on failure.
pub struct ElevenLabsRepository {
    client: reqwest::Client,
    base_url: String,
    model_id: String,
    output_format: String,
}

impl ElevenLabsRepository {
    pub fn new(base_url: String, model_id: String, output_format: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model_id,
            output_format,
        }
    }

    /// Map the configured container format to the provider's format token.
    fn provider_output_format(&self) -> &str {
        match self.output_format.as_str() {
            "mp3" => "mp3_44100_128",
            "pcm" => "pcm_44100",
            other => other,
        }
    }
}

/// Truncate to at most `max_bytes` without splitting a UTF-8 sequence.
/// Dialogue text is not ASCII-only, so a plain byte slice can land inside a
/// multibyte character and panic.
fn truncate_for_log(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[async_trait]
impl SynthesisRepository for ElevenLabsRepository {
    async fn verify_credentials(&self, api_key: &str) -> Result<(), String> {
        let url = format!("{}/v1/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("xi-api-key", api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "credential verification request failed");
                format!("Credential verification failed: {}", e)
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("synthesis credential verified");
            Ok(())
        } else if status.as_u16() == 401 {
            Err("Invalid synthesis API key".to_string())
        } else {
            Err(format!(
                "Credential verification returned status {}",
                status.as_u16()
            ))
        }
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        api_key: &str,
    ) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);

        tracing::info!(
            voice_id = voice_id,
            model = %self.model_id,
            output_format = self.provider_output_format(),
            text_length = text.len(),
            text_preview = truncate_for_log(text, 200),
            "Calling synthesis provider"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .query(&[("output_format", self.provider_output_format())])
            .json(&json!({
                "text": text,
                "model_id": self.model_id,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice_id = voice_id,
                    text_length = text.len(),
                    "synthesis request failed"
                );
                format!("Synthesis request failed: {}", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                voice_id = voice_id,
                body = truncate_for_log(&body, 500),
                "synthesis provider returned error"
            );
            return Err(format!(
                "Synthesis provider returned status {}",
                status.as_u16()
            ));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read audio body: {}", e))?
            .to_vec();

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "elevenlabs",
            voice_id = voice_id,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Synthesis completed"
        );

        Ok(audio_bytes)
    }
}
