//! Prompt templates for Lectio.
//!
//! Prompts can be customized by placing a `generation.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub generation: GenerationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the four content generation capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPrompts {
    pub system: String,
    pub summarize: String,
    pub quiz: String,
    pub flashcards: String,
    pub localize: String,
}

impl Default for GenerationPrompts {
    fn default() -> Self {
        Self {
            system: "You are a teaching assistant who turns lecture material into study aids. \
                     Stay faithful to the source and never invent facts that are not in it."
                .to_string(),

            summarize: r#"Summarize the following educational content concisely for learners.

{{text}}"#
                .to_string(),

            quiz: r#"Create {{quiz_count}} multiple-choice questions from the following text.
For each question, provide: "question", "options" (4 strings), and "answer" (the index of the correct option).
Return only a JSON array of objects.

{{text}}"#
                .to_string(),

            flashcards: r#"Create {{flashcard_count}} flashcards from the following text.
Each flashcard should have a "question" and an "answer".
Return only a JSON array of objects.

{{text}}"#
                .to_string(),

            localize: r#"Localize the following content to {{locale}}. Adapt tone for learners.
Return only the localized text.

{{text}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let generation_path = custom_path.join("generation.toml");
            if generation_path.exists() {
                let content = std::fs::read_to_string(&generation_path)?;
                prompts.generation = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
