//! Image generation jobs
//!
//! A generation is a credit check, one draft submission and a status poll
//! loop. `JimengClient::generate_images` composes them; the pieces are also
//! public for callers that want to drive a job themselves.

pub mod draft;
pub mod models;
pub mod operations;
pub mod poll;
pub mod submit;
pub mod types;

pub use models::{DEFAULT_MODEL, MODEL_MAP, ModelInfo, list_models, resolve_model};
pub use operations::{extract_image_url, extract_image_urls, validate_request};
pub use types::{GenerationJob, GenerationRequest, JobStatus};
