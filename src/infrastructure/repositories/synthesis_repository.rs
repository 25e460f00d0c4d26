use async_trait::async_trait;

/// Repository for speech-synthesis operations.
/// Abstracts the underlying provider (ElevenLabs, or a mock in tests).
///
/// Implementations are responsible for provider-specific request shape,
/// credential headers and error decoding. The pipeline only depends on the
/// success/failure signal and the binary payload.
#[async_trait]
pub trait SynthesisRepository: Send + Sync {
    /// Check the credential against the provider before any dispatch.
    ///
    /// # Errors
    /// Returns a descriptive error if the credential is invalid or the
    /// provider is unreachable.
    async fn verify_credentials(&self, api_key: &str) -> Result<(), String>;

    /// Synthesize one cleaned dialogue line with the given voice.
    ///
    /// Returns binary audio ready to be written to disk.
    async fn synthesize(&self, text: &str, voice_id: &str, api_key: &str)
        -> Result<Vec<u8>, String>;
}
