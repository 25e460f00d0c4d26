pub mod dialogue;
pub mod job;
