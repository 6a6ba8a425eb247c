//! OpenAI chat completions backend.

use super::ChatBackend;
use crate::error::{LectioError, Result};
use crate::openai::create_client_with;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;

/// Chat completions against the OpenAI API.
pub struct OpenAIBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIBackend {
    /// Create a backend for the given model. The key defaults to `OPENAI_API_KEY`.
    pub fn new(model: &str, temperature: f32, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with(timeout, api_key)?,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| LectioError::Provider(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| LectioError::Provider(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| LectioError::Provider(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LectioError::OpenAI(format!("Chat completion failed: {}", e))
        })?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| LectioError::Provider("Empty response from OpenAI".to_string()))
    }
}
