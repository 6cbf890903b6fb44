//! Jimeng Core Library
//!
//! Client for the Jimeng image-generation web API, including:
//! - Identity helpers (device ids, digests, encodings)
//! - Signed, cookie-authenticated transport with body decoding
//! - Credit balance and free-credit claims
//! - Job submission, status polling and URL extraction
//! - Chat-completion adapter with streaming and bounded retry
//! - File-backed configuration

pub mod chat;
pub mod config;
pub mod credit;
pub mod error;
pub mod generation;
pub mod identity;
pub mod retry;
pub mod transport;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chat::{ChatAdapter, ChatCompletion, ChatCompletionChunk, ChatMessage};
    pub use crate::config::Config;
    pub use crate::credit::Credit;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::generation::{GenerationJob, GenerationRequest, JobStatus};
    pub use crate::identity::DeviceIdentity;
    pub use crate::retry::RetryPolicy;
    pub use crate::transport::JimengClient;
}
