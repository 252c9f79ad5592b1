//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the generative text service.
//! It implements the `TextGenerationService` port from the `core` crate,
//! adding bounded retries with backoff for the retryable error kinds.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::warn;

use classflow_core::ports::{Generation, GenerationError, GenerationRequest, TextGenerationService};

/// Rate-limit and transport failures get this many attempts in total.
const MAX_ATTEMPTS: u32 = 3;
/// Backoff between attempts scales linearly: base × attempt number.
const RETRY_BASE_DELAY_MS: u64 = 800;

const JSON_OUTPUT_INSTRUCTION: &str =
    "Respond with a single valid JSON object and nothing else: no prose, no Markdown fences.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTextAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTextAdapter {
    /// Creates a new `OpenAiTextAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        let mut system = request.system.clone();
        if request.json_output {
            system.push_str("\n\n");
            system.push_str(JSON_OUTPUT_INSTRUCTION);
        }

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| GenerationError::BadRequest(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.clone())
                .build()
                .map_err(|e| GenerationError::BadRequest(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_output_tokens)
            .n(1)
            .build()
            .map_err(|e| GenerationError::BadRequest(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(classify_error)?;

        let model = response.model.clone();
        let (prompt_tokens, completion_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::BadRequest(
                    "generation response contained no text content".to_string(),
                )
            })?;

        Ok(Generation {
            text,
            model,
            prompt_tokens,
            completion_tokens,
        })
    }
}

/// Maps the OpenAI client error onto the port's taxonomy. The API reports the
/// interesting cases through the error object's `type`/message text rather
/// than a stable discriminant, so classification matches on those.
fn classify_error(err: OpenAIError) -> GenerationError {
    match err {
        OpenAIError::Reqwest(e) => GenerationError::Transport(e.to_string()),
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.clone().unwrap_or_default();
            let haystack = format!("{} {}", kind, api.message).to_lowercase();
            if haystack.contains("insufficient_quota") || haystack.contains("exceeded your current quota")
            {
                GenerationError::InsufficientQuota
            } else if haystack.contains("rate_limit") || haystack.contains("rate limit") {
                GenerationError::RateLimited
            } else if haystack.contains("invalid_api_key")
                || haystack.contains("authentication")
                || haystack.contains("invalid api key")
            {
                GenerationError::Unauthorized
            } else {
                GenerationError::BadRequest(api.message)
            }
        }
        other => GenerationError::Transport(other.to_string()),
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiTextAdapter {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(request).await {
                Ok(generation) => return Ok(generation),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    let delay_ms = RETRY_BASE_DELAY_MS * u64::from(attempt);
                    warn!(
                        attempt,
                        delay_ms,
                        error = %err,
                        "generation request failed, will retry after backoff"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
