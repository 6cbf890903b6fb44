//! Chat-completion surfaces over image generation
//!
//! The last message becomes the prompt; the model string may carry an output
//! size (`jimeng-2.1:1280x720`). Results come back as Markdown image embeds,
//! either in one completion or as a stream of chunks.

use futures_core::Stream;
use tracing::{debug, warn};

use crate::error::Result;
use crate::generation::{GenerationRequest, validate_request};
use crate::retry::{RetryPolicy, with_retry};
use crate::transport::JimengClient;

use super::model_spec::parse_model;
use super::types::{ChatCompletion, ChatCompletionChunk, ChatMessage, FinishReason};

/// Reply to a request without messages
pub const EMPTY_MESSAGE: &str = "message is empty";

/// First chunk of every non-empty stream
pub const STARTED_MESSAGE: &str = "🎨 Generating images, please wait...";

/// Last chunk of a successful stream
pub const COMPLETE_MESSAGE: &str = "Image generation complete!";

/// Markdown embed for the `index`-th image
pub fn image_markdown(index: usize, url: &str) -> String {
    format!("![image_{}]({})\n", index, url)
}

/// Chat adapter with a bounded retry around each generation
#[derive(Debug, Clone)]
pub struct ChatAdapter {
    client: JimengClient,
    retry: RetryPolicy,
}

impl ChatAdapter {
    /// Create an adapter with the default policy (3 retries, 5 s apart)
    pub fn new(client: JimengClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn client(&self) -> &JimengClient {
        &self.client
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Generate images for the last message and return one completion.
    ///
    /// No messages yields a fixed reply without touching the network. After
    /// the retries are spent the last error is returned.
    pub async fn create_completion(
        &self,
        messages: &[ChatMessage],
        model: &str,
        token: &str,
    ) -> Result<ChatCompletion> {
        let Some(request) = build_request(&self.client, messages, model) else {
            return Ok(ChatCompletion::assistant(model, EMPTY_MESSAGE));
        };
        validate_request(&request, token)?;

        let urls = with_retry(self.retry, "chat completion", || {
            self.client.generate_images(&request, token)
        })
        .await?;

        let content: String = urls
            .iter()
            .enumerate()
            .map(|(i, url)| image_markdown(i, url))
            .collect();
        Ok(ChatCompletion::assistant(model, content))
    }

    /// Generate images for the last message as a stream of chunks.
    ///
    /// Order: a started notice, one chunk per image, a complete notice. The
    /// job is submitted once; if it fails, a single terminal chunk carrying
    /// the error replaces the image chunks. Only the steps before the started
    /// notice are retried, and their last error surfaces as an `Err` item.
    ///
    /// Nothing runs until the stream is polled; dropping it cancels the
    /// request in flight.
    pub fn create_completion_stream(
        &self,
        messages: Vec<ChatMessage>,
        model: impl Into<String>,
        token: impl Into<String>,
    ) -> impl Stream<Item = Result<ChatCompletionChunk>> + Send + 'static {
        let client = self.client.clone();
        let retry = self.retry;
        let model = model.into();
        let token = token.into();

        async_stream::stream! {
            match build_request(&client, &messages, &model) {
                None => {
                    yield Ok(ChatCompletionChunk::assistant(
                        model.as_str(),
                        0,
                        EMPTY_MESSAGE,
                        Some(FinishReason::Stop),
                    ));
                }
                Some(request) => {
                    let prepared = with_retry(retry, "chat completion stream", || {
                        std::future::ready(validate_request(&request, &token))
                    })
                    .await;

                    match prepared {
                        Err(e) => {
                            yield Err(e);
                        }
                        Ok(()) => {
                            yield Ok(ChatCompletionChunk::assistant(model.as_str(), 0, STARTED_MESSAGE, None));

                            match client.generate_images(&request, &token).await {
                                Ok(urls) => {
                                    let last = urls.len().saturating_sub(1);
                                    for (i, url) in urls.iter().enumerate() {
                                        let finish = (i == last).then_some(FinishReason::Stop);
                                        yield Ok(ChatCompletionChunk::assistant(
                                            model.as_str(),
                                            i + 1,
                                            image_markdown(i, url),
                                            finish,
                                        ));
                                    }
                                    debug!(count = urls.len(), "Streamed image chunks");
                                    yield Ok(ChatCompletionChunk::assistant(
                                        model.as_str(),
                                        urls.len() + 1,
                                        COMPLETE_MESSAGE,
                                        Some(FinishReason::Stop),
                                    ));
                                }
                                Err(e) => {
                                    warn!(error = %e, "Streamed generation failed");
                                    yield Ok(ChatCompletionChunk::assistant(
                                        model.as_str(),
                                        1,
                                        format!("Image generation failed: {}", e),
                                        Some(FinishReason::Stop),
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Generation request for the last message, or `None` without messages
fn build_request(
    client: &JimengClient,
    messages: &[ChatMessage],
    model: &str,
) -> Option<GenerationRequest> {
    let prompt = messages.last()?.content.clone();
    let spec = parse_model(model);
    Some(
        GenerationRequest::new(prompt)
            .with_model(spec.model)
            .with_size(spec.width, spec.height)
            .with_sample_strength(client.generation_config().sample_strength),
    )
}
