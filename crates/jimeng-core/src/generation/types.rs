//! Generation request and job types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::DEFAULT_MODEL;

/// Status code of a job still being rendered
pub const STATUS_IN_PROGRESS: i64 = 20;

/// Status code of a job that failed
pub const STATUS_FAILED: i64 = 30;

/// Fail code of a job rejected by the content-policy filter
pub const FAIL_CODE_CONTENT_FILTERED: &str = "2038";

/// Default output edge length
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Default sample strength
pub const DEFAULT_SAMPLE_STRENGTH: f64 = 0.5;

/// Parameters for one image generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Public model name (see `list_models`)
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    /// Refinement strength, 0.0 to 1.0
    pub sample_strength: f64,
    #[serde(default)]
    pub negative_prompt: String,
}

impl GenerationRequest {
    /// Create a request with default model, size and strength
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            sample_strength: DEFAULT_SAMPLE_STRENGTH,
            negative_prompt: String::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_sample_strength(mut self, strength: f64) -> Self {
        self.sample_strength = strength;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }
}

/// Lifecycle state of a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    InProgress,
    Failed,
    /// Any other terminal code
    Succeeded(i64),
}

impl JobStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            STATUS_IN_PROGRESS => Self::InProgress,
            STATUS_FAILED => Self::Failed,
            other => Self::Succeeded(other),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Handle and latest observed state of an upstream job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub history_id: String,
    /// `None` until the first status lookup
    pub status: Option<JobStatus>,
    pub fail_code: Option<String>,
    /// Raw result items as returned upstream
    pub items: Vec<Value>,
}

impl GenerationJob {
    /// A freshly submitted job
    pub fn submitted(history_id: impl Into<String>) -> Self {
        Self {
            history_id: history_id.into(),
            status: None,
            fail_code: None,
            items: Vec::new(),
        }
    }

    pub fn is_content_filtered(&self) -> bool {
        self.status == Some(JobStatus::Failed)
            && self.fail_code.as_deref() == Some(FAIL_CODE_CONTENT_FILTERED)
    }
}
