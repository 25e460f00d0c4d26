pub mod entity;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod voices;

pub use entity::{resolve_role, DialogueEntity};
pub use error::DialogueError;
pub use normalizer::{CleaningRules, Normalizer};
pub use parser::parse_script;
pub use voices::{bind_voices, load_bindings, BindOutcome, VoiceBinding, VoiceBoundEntry, VoiceMap};
