//! Chat completion types
//!
//! These match the OpenAI-compatible completion and streaming-chunk shapes,
//! so chat front-ends can consume generated images as Markdown.

use serde::{Deserialize, Serialize};

use crate::identity::{generate_uuid, unix_timestamp};

/// Object tag of a single-shot completion
pub const COMPLETION_OBJECT: &str = "chat.completion";

/// Object tag of a streaming chunk
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Reason a completion or chunk finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Anything we do not produce ourselves
    #[serde(other)]
    Unknown,
}

/// Token usage; image generation reports a fixed nominal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn nominal() -> Self {
        Self {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
}

/// Single-shot completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub model: String,
    pub object: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
    pub created: i64,
}

impl ChatCompletion {
    /// A completion with one finished assistant message
    pub fn assistant(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: generate_uuid(true),
            model: model.into(),
            object: COMPLETION_OBJECT.to_string(),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant(content),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Usage::nominal(),
            created: unix_timestamp(),
        }
    }

    /// Content of the first choice
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Incremental content of a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: usize,
    pub delta: Delta,
    pub finish_reason: Option<FinishReason>,
}

/// One element of a streamed completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub model: String,
    pub object: String,
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// A chunk carrying one assistant delta
    pub fn assistant(
        model: impl Into<String>,
        index: usize,
        content: impl Into<String>,
        finish_reason: Option<FinishReason>,
    ) -> Self {
        Self {
            id: generate_uuid(true),
            model: model.into(),
            object: CHUNK_OBJECT.to_string(),
            choices: vec![ChunkChoice {
                index,
                delta: Delta {
                    role: MessageRole::Assistant,
                    content: content.into(),
                },
                finish_reason,
            }],
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.delta.content.as_str())
    }

    /// Whether this chunk ends the stream
    pub fn is_done(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completion_serializes_openai_shape() {
        let completion = ChatCompletion::assistant("jimeng-2.1", "![image_0](u)\n");
        let value = serde_json::to_value(&completion).unwrap();
        assert_eq!(value["object"], "chat.completion");
        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
        assert_eq!(value["usage"], json!({"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}));
    }

    #[test]
    fn test_chunk_terminal_flag() {
        let open = ChatCompletionChunk::assistant("m", 0, "working", None);
        assert!(!open.is_done());
        let value = serde_json::to_value(&open).unwrap();
        assert_eq!(value["object"], "chat.completion.chunk");
        assert!(value["choices"][0]["finish_reason"].is_null());

        let done = ChatCompletionChunk::assistant("m", 2, "done", Some(FinishReason::Stop));
        assert!(done.is_done());
        assert_eq!(done.content(), Some("done"));
    }

    #[test]
    fn test_message_deserializes() {
        let message: ChatMessage =
            serde_json::from_value(json!({"role": "user", "content": "a cat"})).unwrap();
        assert_eq!(message, ChatMessage::user("a cat"));
    }

    #[test]
    fn test_unknown_finish_reason() {
        let reason: FinishReason = serde_json::from_value(json!("length")).unwrap();
        assert_eq!(reason, FinishReason::Unknown);
    }
}
