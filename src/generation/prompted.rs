//! Prompt-driven content provider over any chat-style backend.

use super::{parse_items, ContentProvider, Flashcard, QuizItem};
use crate::config::{Prompts, ProviderSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A backend that answers a single system + user prompt pair.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Run one completion and return the model's text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Implements the four generation capabilities by rendering prompt templates
/// and sending them to a [`ChatBackend`].
pub struct PromptedProvider<B> {
    backend: B,
    prompts: Prompts,
    quiz_count: usize,
    flashcard_count: usize,
}

impl<B: ChatBackend> PromptedProvider<B> {
    pub fn new(backend: B, prompts: Prompts, settings: &ProviderSettings) -> Self {
        Self {
            backend,
            prompts,
            quiz_count: settings.quiz_count,
            flashcard_count: settings.flashcard_count,
        }
    }

    fn render(&self, template: &str, text: &str, extra: &[(&str, String)]) -> String {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        for (key, value) in extra {
            vars.insert(key.to_string(), value.clone());
        }
        self.prompts.render_with_custom(template, &vars)
    }

    async fn ask(&self, user: String) -> Result<String> {
        let answer = self.backend.complete(&self.prompts.generation.system, &user).await?;
        debug!("{} response: {}", self.backend.name(), preview(&answer));
        Ok(answer.trim().to_string())
    }
}

#[async_trait]
impl<B: ChatBackend> ContentProvider for PromptedProvider<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip_all, fields(chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let prompt = self.render(&self.prompts.generation.summarize, text, &[]);
        self.ask(prompt).await
    }

    #[instrument(skip_all, fields(chars = text.len()))]
    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizItem>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let prompt = self.render(
            &self.prompts.generation.quiz,
            text,
            &[("quiz_count", self.quiz_count.to_string())],
        );
        let answer = self.ask(prompt).await?;

        Ok(parse_items(&answer).unwrap_or_else(|| vec![QuizItem::Raw { raw: answer }]))
    }

    #[instrument(skip_all, fields(chars = text.len()))]
    async fn generate_flashcards(&self, text: &str) -> Result<Vec<Flashcard>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let prompt = self.render(
            &self.prompts.generation.flashcards,
            text,
            &[("flashcard_count", self.flashcard_count.to_string())],
        );
        let answer = self.ask(prompt).await?;

        Ok(parse_items(&answer).unwrap_or_else(|| vec![Flashcard::Raw { raw: answer }]))
    }

    #[instrument(skip_all, fields(locale = %locale))]
    async fn localize(&self, text: &str, locale: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let prompt = self.render(
            &self.prompts.generation.localize,
            text,
            &[("locale", locale.to_string())],
        );
        self.ask(prompt).await
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
