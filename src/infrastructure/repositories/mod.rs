pub mod elevenlabs_repository;
pub mod job_store;
pub mod synthesis_repository;

pub use elevenlabs_repository::ElevenLabsRepository;
pub use job_store::JobStore;
pub use synthesis_repository::SynthesisRepository;
