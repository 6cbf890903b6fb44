//! Chat-completion adapter
//!
//! Exposes image generation behind OpenAI-compatible completion and
//! streaming-chunk shapes.

pub mod completion;
pub mod model_spec;
pub mod types;

pub use completion::{COMPLETE_MESSAGE, ChatAdapter, EMPTY_MESSAGE, STARTED_MESSAGE, image_markdown};
pub use model_spec::{ModelSpec, parse_model};
pub use types::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, Choice, ChunkChoice, Delta, FinishReason,
    MessageRole, Usage,
};
