pub mod dispatcher;
pub mod error;
pub mod model;
pub mod service;

pub use dispatcher::SynthesisDispatcher;
pub use error::JobServiceError;
pub use model::{Job, JobStatus, SubmitJobRequest, SubmitJobResponse};
pub use service::{JobService, JobServiceApi};
