//! Scripted provider for tests.
//!
//! Echoes `"SUMMARY:" + first 10 chars` for summaries and can be told to fail,
//! stall or panic when the input contains a marker.

use super::{ContentProvider, Flashcard, QuizItem};
use crate::error::{LectioError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedProvider {
    fail_summary_on: Vec<String>,
    fail_quiz_on: Vec<String>,
    fail_flashcards_on: Vec<String>,
    fail_locales: Vec<String>,
    panic_on: Vec<String>,
    panic_locales: Vec<String>,
    delays: Vec<(String, Duration)>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_summary_on(mut self, marker: &str) -> Self {
        self.fail_summary_on.push(marker.to_string());
        self
    }

    pub fn fail_quiz_on(mut self, marker: &str) -> Self {
        self.fail_quiz_on.push(marker.to_string());
        self
    }

    pub fn fail_flashcards_on(mut self, marker: &str) -> Self {
        self.fail_flashcards_on.push(marker.to_string());
        self
    }

    pub fn fail_locale(mut self, locale: &str) -> Self {
        self.fail_locales.push(locale.to_string());
        self
    }

    pub fn panic_on(mut self, marker: &str) -> Self {
        self.panic_on.push(marker.to_string());
        self
    }

    pub fn panic_on_locale(mut self, locale: &str) -> Self {
        self.panic_locales.push(locale.to_string());
        self
    }

    /// Sleep for `delay` whenever the input contains `marker`.
    pub fn delay_on(mut self, marker: &str, delay: Duration) -> Self {
        self.delays.push((marker.to_string(), delay));
        self
    }

    /// Total number of capability calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls in the order they finished, as `"<capability>:<first 10 chars>"`.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    async fn enter(&self, capability: &str, text: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = self.panic_on.iter().find(|m| text.contains(m.as_str())) {
            panic!("scripted panic on {}", marker);
        }
        for (marker, delay) in &self.delays {
            if text.contains(marker.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", capability, head(text)));
    }

    fn check(markers: &[String], text: &str, capability: &str) -> Result<()> {
        match markers.iter().find(|m| text.contains(m.as_str())) {
            Some(marker) => Err(LectioError::Provider(format!(
                "scripted {} failure on {}",
                capability, marker
            ))),
            None => Ok(()),
        }
    }
}

fn head(text: &str) -> String {
    text.chars().take(10).collect()
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        self.enter("summarize", text).await;
        Self::check(&self.fail_summary_on, text, "summarize")?;
        Ok(format!("SUMMARY:{}", head(text)))
    }

    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizItem>> {
        self.enter("quiz", text).await;
        Self::check(&self.fail_quiz_on, text, "quiz")?;
        Ok(vec![QuizItem::Raw {
            raw: format!("QUIZ:{}", head(text)),
        }])
    }

    async fn generate_flashcards(&self, text: &str) -> Result<Vec<Flashcard>> {
        self.enter("flashcards", text).await;
        Self::check(&self.fail_flashcards_on, text, "flashcards")?;
        Ok(vec![Flashcard::Structured {
            question: format!("Q:{}", head(text)),
            answer: format!("A:{}", head(text)),
        }])
    }

    async fn localize(&self, text: &str, locale: &str) -> Result<String> {
        self.enter("localize", text).await;
        if self.panic_locales.iter().any(|l| l == locale) {
            panic!("scripted panic localizing {}", locale);
        }
        if self.fail_locales.iter().any(|l| l == locale) {
            return Err(LectioError::Provider(format!("scripted localize failure for {}", locale)));
        }
        Ok(format!("{}:{}", locale, text))
    }
}
